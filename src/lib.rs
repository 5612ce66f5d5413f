pub mod error;
pub mod geometry;
pub mod io;
pub mod parallel;
pub mod params;
pub mod raster;
pub mod spatial;
pub mod statistics;
pub mod steps;

/// elevation of grid cells no point supports
pub const NODATA: f64 = f64::NAN;

const KD_TREE_BUCKET_SIZE: usize = 32;

pub use error::{Error, Result};
pub use geometry::{Mesh, Point3, PointCloud};
pub use params::{MeshParams, MeshingMethod};
pub use raster::ElevationGrid;
pub use steps::{build_mesh, MeshBuilder, MeshOutput};
