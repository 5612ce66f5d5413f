pub mod elevation_grid;

pub use self::elevation_grid::ElevationGrid;
