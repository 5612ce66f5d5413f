pub mod las;
pub mod ply;

pub use self::ply::write_mesh;

use crate::geometry::PointCloud;
use crate::steps::MeshOutput;
use crate::{Error, Result};

use log::{info, warn};
use std::path::Path;

/// Reads a .ply, .las or .laz point cloud, chosen by file extension.
/// Points with non finite coordinates are dropped.
pub fn read_point_cloud(path: &Path) -> Result<PointCloud> {
    let cloud = read_any(path)?;

    let keep: Vec<bool> = cloud.points.iter().map(|p| p.is_finite()).collect();
    let num_invalid = keep.iter().filter(|&&k| !k).count();
    if num_invalid == 0 {
        return Ok(cloud);
    }
    warn!("Dropping {} points with non finite coordinates", num_invalid);
    Ok(cloud.retain_mask(&keep))
}

fn read_any(path: &Path) -> Result<PointCloud> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("ply") => ply::read_ply(path),
        Some("las") | Some("laz") => las::read_las(path),
        _ => Err(Error::Configuration(format!(
            "Unsupported point cloud format: {}",
            path.to_string_lossy()
        ))),
    }
}

/// Writes the mesh and then, if asked for and available, the elevation grid.
/// Nothing is left behind for the grid when the mesh cannot be written.
pub fn write_outputs(output: &MeshOutput, mesh_path: &Path, dsm_path: Option<&Path>) -> Result<()> {
    write_mesh(&output.mesh, mesh_path)?;
    info!("Wrote the mesh to {}", mesh_path.to_string_lossy());

    match (dsm_path, &output.dsm) {
        (Some(path), Some(dsm)) => {
            dsm.write_to_tiff(path)?;
            info!("Wrote the elevation grid to {}", path.to_string_lossy());
        }
        (Some(path), None) => warn!(
            "The triangulation method builds no elevation grid, {} is not written",
            path.to_string_lossy()
        ),
        (None, _) => (),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds2, Mesh, Point3};
    use crate::raster::ElevationGrid;

    use geo::Coord;

    fn output() -> MeshOutput {
        let bounds = Bounds2::new(Coord { x: 0., y: 0. }, Coord { x: 2., y: 2. });
        let mut dsm = ElevationGrid::new(bounds, 1., usize::MAX).unwrap();
        dsm.field.fill(1.);

        MeshOutput {
            mesh: Mesh::new(
                vec![
                    Point3::new(0., 0., 1.),
                    Point3::new(2., 0., 1.),
                    Point3::new(0., 2., 1.),
                ],
                vec![[0, 1, 2]],
            ),
            dsm: Some(dsm),
        }
    }

    #[test]
    fn outputs_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("mesh.ply");
        let dsm_path = dir.path().join("dsm.tif");

        write_outputs(&output(), &mesh_path, Some(&dsm_path)).unwrap();

        assert!(mesh_path.exists());
        assert!(dsm_path.exists());
    }

    #[test]
    fn failed_mesh_write_leaves_no_elevation_grid() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("missing").join("mesh.ply");
        let dsm_path = dir.path().join("dsm.tif");

        assert!(write_outputs(&output(), &mesh_path, Some(&dsm_path)).is_err());
        assert!(!dsm_path.exists());
        assert!(!dsm_path.with_extension("tfw").exists());
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\nnan 1 1\n2 2 2\n",
        )
        .unwrap();

        let cloud = read_point_cloud(&path).unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[1].x, 2.);
    }

    #[test]
    fn unknown_extension_is_a_configuration_error() {
        assert!(matches!(
            read_point_cloud(Path::new("cloud.xyz")),
            Err(Error::Configuration(_))
        ));
    }
}
