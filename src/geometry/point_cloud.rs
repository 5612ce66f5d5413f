use super::{Bounds2, Point3};

use std::ops::Index;

#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    pub points: Vec<Point3>,
    /// per point normals, if the source carried them
    pub normals: Option<Vec<[f64; 3]>>,
    /// reverse the winding of every produced triangle
    pub flip_faces: bool,
}

impl PointCloud {
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            normals: None,
            flip_faces: false,
        }
    }

    pub fn with_normals(points: Vec<Point3>, normals: Vec<[f64; 3]>) -> Self {
        debug_assert_eq!(points.len(), normals.len());
        Self {
            points,
            normals: Some(normals),
            flip_faces: false,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_3d_slice(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.to_array()).collect()
    }

    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_points(&self.points)
    }

    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.z, p.z)),
            Some((lo, hi)) => Some((lo.min(p.z), hi.max(p.z))),
        })
    }

    /// keeps the points with a true mask entry, preserving their order
    pub fn retain_mask(&self, keep: &[bool]) -> PointCloud {
        debug_assert_eq!(keep.len(), self.points.len());

        let points = self
            .points
            .iter()
            .zip(keep)
            .filter_map(|(p, &k)| k.then_some(*p))
            .collect();

        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .zip(keep)
                .filter_map(|(n, &k)| k.then_some(*n))
                .collect()
        });

        PointCloud {
            points,
            normals,
            flip_faces: self.flip_faces,
        }
    }
}

impl Index<usize> for PointCloud {
    type Output = Point3;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_keeps_order_and_normals() {
        let mut pc = PointCloud::with_normals(
            vec![
                Point3::new(0., 0., 0.),
                Point3::new(1., 0., 1.),
                Point3::new(2., 0., 2.),
            ],
            vec![[0., 0., 1.], [0., 1., 0.], [1., 0., 0.]],
        );
        pc.flip_faces = true;

        let kept = pc.retain_mask(&[true, false, true]);

        assert_eq!(kept.points, vec![pc[0], pc[2]]);
        assert_eq!(kept.normals, Some(vec![[0., 0., 1.], [1., 0., 0.]]));
        assert!(kept.flip_faces);
    }

    #[test]
    fn z_range() {
        let pc = PointCloud::new(vec![
            Point3::new(0., 0., 3.),
            Point3::new(1., 0., -1.),
            Point3::new(2., 0., 2.),
        ]);
        assert_eq!(pc.z_range(), Some((-1., 3.)));
        assert_eq!(PointCloud::default().z_range(), None);
    }
}
