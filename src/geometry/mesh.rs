use super::{consecutive_orientation, Point3};

/// Triangulated 2.5D surface
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Mesh {
        Mesh {
            vertices,
            triangles,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// twice the signed area of a triangle projected to the xy-plane
    pub fn projected_area(&self, triangle: &[usize; 3]) -> f64 {
        consecutive_orientation(
            self.vertices[triangle[0]].flatten(),
            self.vertices[triangle[1]].flatten(),
            self.vertices[triangle[2]].flatten(),
        ) / 2.
    }

    /// reverse the winding of every triangle
    pub fn flip_faces(&mut self) {
        for t in self.triangles.iter_mut() {
            t.swap(0, 2);
        }
    }

    /// scale each axis and then translate
    pub fn transform(&mut self, scale: [f64; 3], translation: [f64; 3]) {
        for v in self.vertices.iter_mut() {
            v.x = v.x * scale[0] + translation[0];
            v.y = v.y * scale[1] + translation[1];
            v.z = v.z * scale[2] + translation[2];
        }
    }

    /// index and winding sanity, used to guard the mesh before handing it to a writer
    pub fn is_valid(&self) -> bool {
        let n = self.vertices.len();
        self.triangles.iter().all(|t| {
            t.iter().all(|&i| i < n)
                && t[0] != t[1]
                && t[1] != t[2]
                && t[0] != t[2]
                && self.projected_area(t).abs() > 0.
        })
    }
}
