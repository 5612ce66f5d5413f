use crate::geometry::{Mesh, PointCloud, ProjectedPoint};
use crate::statistics::lower_median;
use crate::{Error, Result};

use log::info;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Triangulation};

pub type Triangulation2d = DelaunayTriangulation<ProjectedPoint>;

/// Delaunay triangulation of the projected cloud, each vertex remembering its point index
pub fn triangulate(cloud: &PointCloud) -> Result<Triangulation2d> {
    let points = cloud
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| ProjectedPoint::from_point(p, i))
        .collect();

    let dt = Triangulation2d::bulk_load_stable(points)?;
    if dt.num_inner_faces() == 0 {
        return Err(Error::InsufficientData(
            "No triangles in resulting mesh".to_string(),
        ));
    }
    info!(
        "Triangulated {} vertices into {} triangles",
        dt.num_vertices(),
        dt.num_inner_faces()
    );
    Ok(dt)
}

/// A vertex differing by more than `threshold` from every one of its neighbors is
/// moved to the median neighbor elevation, the lower middle one for even counts.
/// All vertices are judged on the elevations from before the pass.
pub fn remove_spikes(dt: &mut Triangulation2d, threshold: f64) -> usize {
    let corrections: Vec<(FixedVertexHandle, f64)> = dt
        .vertices()
        .filter_map(|v| {
            let z = v.data().elevation;
            let mut neighbors: Vec<f64> =
                v.out_edges().map(|e| e.to().data().elevation).collect();

            if !neighbors.iter().all(|n| (n - z).abs() > threshold) {
                return None;
            }
            lower_median(&mut neighbors).map(|median| (v.fix(), median))
        })
        .collect();

    for &(handle, median) in corrections.iter() {
        dt.vertex_data_mut(handle).elevation = median;
    }
    info!("Removed {} spikes", corrections.len());

    corrections.len()
}

pub fn triangulation_to_mesh(dt: &Triangulation2d) -> Mesh {
    let vertices = dt.vertices().map(|v| v.data().to_point3()).collect();

    let mut mesh = Mesh::new(vertices, vec![]);
    mesh.triangles = dt
        .inner_faces()
        .map(|f| f.vertices().map(|v| v.fix().index()))
        .filter(|t| mesh.projected_area(t) != 0.)
        .collect();
    mesh
}
