use super::{
    decimate_terrain, diffuse, filter_normals, interpolate_grid, project_points,
    remove_outliers, remove_spikes, simplify_points, to_world, triangulate,
    triangulation_to_mesh, DecimationParams, IdwParams,
};
use crate::geometry::{Mesh, PointCloud};
use crate::params::{MeshParams, MeshingMethod};
use crate::raster::ElevationGrid;
use crate::{Error, Result};

use log::info;

pub struct MeshOutput {
    pub mesh: Mesh,
    /// the smoothed elevation grid, before its holes were filled
    pub dsm: Option<ElevationGrid>,
}

/// Turns a point cloud into a 2.5D mesh
pub trait MeshBuilder {
    fn build(&self, cloud: &PointCloud, params: &MeshParams) -> Result<MeshOutput>;
}

/// interpolate, smooth and decimate an elevation grid
pub struct GridMeshBuilder;

/// triangulate the thinned points directly and remove spikes
pub struct TriangulationMeshBuilder;

pub fn build_mesh(cloud: &PointCloud, params: &MeshParams) -> Result<MeshOutput> {
    match params.method {
        MeshingMethod::Grid => GridMeshBuilder.build(cloud, params),
        MeshingMethod::Triangulation => TriangulationMeshBuilder.build(cloud, params),
    }
}

impl MeshBuilder for GridMeshBuilder {
    fn build(&self, cloud: &PointCloud, params: &MeshParams) -> Result<MeshOutput> {
        let (cloud, _) = remove_outliers(
            cloud,
            params.outlier_neighbors,
            params.outlier_criterion(),
            params.threads,
        );
        check_point_count(&cloud)?;

        let projection = project_points(&cloud)?;
        let grid = interpolate_grid(
            &projection,
            &IdwParams {
                resolution: params.resolution,
                num_neighbors: params.shepard_neighbors,
                power: params.shepard_power,
                search_radius: params.search_radius,
                max_cells: params.max_grid_cells,
                num_threads: params.threads,
            },
        )?;
        drop(projection);

        let dsm = diffuse(
            &grid,
            params.diffusion_threshold,
            params.diffusion_iterations(),
            params.threads,
        );
        drop(grid);

        let mut filled = dsm.clone();
        let num_filled = filled.fill_nodata()?;
        if num_filled > 0 {
            info!("Filled {} empty grid cells", num_filled);
        }

        let mut mesh = decimate_terrain(
            &filled,
            &DecimationParams {
                max_vertices: params.max_vertex_count,
                max_triangles: params.max_triangle_count(),
                tolerance: params.decimation_tolerance,
                boundary_vertex_deletion: params.boundary_vertex_deletion,
            },
        )?;
        to_world(&mut mesh, &filled);

        Ok(MeshOutput {
            mesh: finish(mesh, cloud.flip_faces)?,
            dsm: Some(dsm),
        })
    }
}

impl MeshBuilder for TriangulationMeshBuilder {
    fn build(&self, cloud: &PointCloud, params: &MeshParams) -> Result<MeshOutput> {
        let (cloud, _) = remove_outliers(
            cloud,
            params.outlier_neighbors,
            params.outlier_criterion(),
            params.threads,
        );
        let cloud = filter_normals(&cloud);
        check_point_count(&cloud)?;

        let cloud = simplify_points(&cloud, params.max_vertex_count, params.threads);

        let mut dt = triangulate(&cloud)?;
        remove_spikes(&mut dt, params.spike_threshold);

        Ok(MeshOutput {
            mesh: finish(triangulation_to_mesh(&dt), cloud.flip_faces)?,
            dsm: None,
        })
    }
}

fn check_point_count(cloud: &PointCloud) -> Result<()> {
    if cloud.len() < 3 {
        return Err(Error::InsufficientData(format!(
            "Not enough points ({}) to build a mesh",
            cloud.len()
        )));
    }
    Ok(())
}

fn finish(mut mesh: Mesh, flip_faces: bool) -> Result<Mesh> {
    if mesh.triangles.is_empty() {
        return Err(Error::InsufficientData(
            "No triangles in resulting mesh".to_string(),
        ));
    }
    if flip_faces {
        mesh.flip_faces();
    }
    info!(
        "Mesh has {} vertices and {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn hill(n: usize) -> PointCloud {
        let mut points = vec![];
        for y in 0..n {
            for x in 0..n {
                let (dx, dy) = (x as f64 - n as f64 / 2., y as f64 - n as f64 / 2.);
                points.push(Point3::new(x as f64, y as f64, 10. - 0.05 * (dx * dx + dy * dy)));
            }
        }
        PointCloud::new(points)
    }

    fn params(method: MeshingMethod) -> MeshParams {
        MeshParams {
            method,
            max_vertex_count: 50,
            threads: 2,
            ..Default::default()
        }
    }

    #[test]
    fn both_methods_respect_the_vertex_cap() {
        let cloud = hill(20);

        for method in [MeshingMethod::Grid, MeshingMethod::Triangulation] {
            let output = build_mesh(&cloud, &params(method)).unwrap();

            assert!(output.mesh.num_vertices() <= 50);
            assert!(output.mesh.num_vertices() >= 3);
            assert!(output.mesh.is_valid());
            assert_eq!(output.dsm.is_some(), method == MeshingMethod::Grid);
        }
    }

    #[test]
    fn grid_mesh_lies_inside_the_cloud_bounds() {
        let cloud = hill(15);

        let mesh = build_mesh(&cloud, &params(MeshingMethod::Grid))
            .unwrap()
            .mesh;

        let bounds = cloud.bounds().unwrap();
        assert!(mesh.vertices.iter().all(|v| bounds.contains(v.flatten())));
    }

    #[test]
    fn flipped_clouds_get_clockwise_triangles() {
        let mut cloud = hill(10);
        let upright = build_mesh(&cloud, &params(MeshingMethod::Grid)).unwrap().mesh;

        cloud.flip_faces = true;
        let flipped = build_mesh(&cloud, &params(MeshingMethod::Grid)).unwrap().mesh;

        assert!(upright.triangles.iter().all(|t| upright.projected_area(t) > 0.));
        assert!(flipped.triangles.iter().all(|t| flipped.projected_area(t) < 0.));
    }

    #[test]
    fn too_few_points() {
        let cloud = PointCloud::new(vec![Point3::new(0., 0., 0.), Point3::new(1., 1., 1.)]);

        for method in [MeshingMethod::Grid, MeshingMethod::Triangulation] {
            assert!(matches!(
                build_mesh(&cloud, &params(method)),
                Err(Error::InsufficientData(_))
            ));
        }
    }
}
