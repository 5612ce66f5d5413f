pub mod build_mesh;
pub mod decimate_terrain;
pub mod diffuse;
pub mod filter_normals;
pub mod interpolate_grid;
pub mod project_points;
pub mod remove_outliers;
pub mod remove_spikes;
pub mod simplify_points;

pub use self::build_mesh::{
    build_mesh, GridMeshBuilder, MeshBuilder, MeshOutput, TriangulationMeshBuilder,
};
pub use self::decimate_terrain::{decimate_terrain, to_world, DecimationParams};
pub use self::diffuse::{diffuse, diffuse_until_stable};
pub use self::filter_normals::filter_normals;
pub use self::interpolate_grid::{interpolate_grid, shepard, IdwParams};
pub use self::project_points::{project_points, Projection};
pub use self::remove_outliers::{
    mean_neighbor_distances, remove_outliers, OutlierCriterion, OutlierReport,
};
pub use self::remove_spikes::{remove_spikes, triangulate, triangulation_to_mesh, Triangulation2d};
pub use self::simplify_points::{average_spacing, simplify_points};
