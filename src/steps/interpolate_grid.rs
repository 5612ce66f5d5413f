use super::Projection;
use crate::parallel::for_each_row;
use crate::raster::ElevationGrid;
use crate::spatial::{Neighbor, SpatialIndex};
use crate::{Result, NODATA};

use log::info;

#[derive(Debug, Clone)]
pub struct IdwParams {
    /// cells per unit length
    pub resolution: f64,
    pub num_neighbors: usize,
    pub power: f64,
    /// only points this close to a cell center contribute
    pub search_radius: Option<f64>,
    pub max_cells: usize,
    pub num_threads: usize,
}

/// Shepard interpolation of the projected elevations onto a regular grid
pub fn interpolate_grid(projection: &Projection, params: &IdwParams) -> Result<ElevationGrid> {
    let mut grid = ElevationGrid::new(projection.bounds, params.resolution, params.max_cells)?;
    info!(
        "Interpolating a {}x{} elevation grid",
        grid.width, grid.height
    );

    let index = SpatialIndex::new(&projection.to_2d_slice());

    // the field is filled row by row while the rest of the grid is read
    let mut field = std::mem::take(&mut grid.field);
    let width = grid.width;
    let layout = &grid;

    for_each_row(&mut field, width, params.num_threads, |row, cells| {
        for (col, cell) in cells.iter_mut().enumerate() {
            let c = layout.index2coord(row, col);
            let query = [c.x, c.y];

            let neighbors = match params.search_radius {
                Some(radius) => index.nearest_n_within(&query, params.num_neighbors, radius),
                None => index.nearest_n(&query, params.num_neighbors),
            };

            *cell = shepard(&neighbors, |i| projection.points[i].elevation, params.power);
        }
    });
    grid.field = field;

    let nodata = grid.count_nodata();
    if nodata > 0 {
        info!("{} cells without supporting points", nodata);
    }
    Ok(grid)
}

/// Inverse distance weighted mean of the neighbors' values.
/// A neighbor at zero distance is returned as is, no neighbors give NODATA.
pub fn shepard(neighbors: &[Neighbor], value: impl Fn(usize) -> f64, power: f64) -> f64 {
    let Some(closest) = neighbors.first() else {
        return NODATA;
    };
    if closest.distance == 0. {
        return value(closest.index);
    }

    let (weighted, total_weight) = neighbors.iter().fold((0., 0.), |(wz, tw), n| {
        let w = 1. / n.distance.powf(power);
        (wz + w * value(n.index), tw + w)
    });
    weighted / total_weight
}
