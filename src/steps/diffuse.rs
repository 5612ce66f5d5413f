use crate::parallel::for_each_row;
use crate::raster::ElevationGrid;

use log::info;

/// Edge preserving smoothing. Every pass replaces a cell by the mean of itself and
/// the neighbors within `threshold` of it, reading only the previous pass.
pub fn diffuse(
    grid: &ElevationGrid,
    threshold: f64,
    iterations: usize,
    num_threads: usize,
) -> ElevationGrid {
    let mut current = grid.clone();
    let mut next = grid.clone();

    for _ in 0..iterations {
        diffusion_pass(&current, &mut next.field, threshold, num_threads);
        std::mem::swap(&mut current, &mut next);
    }
    info!("Smoothed the elevation grid in {} iterations", iterations);

    current
}

/// Runs passes until no cell moves more than `epsilon` or `max_iterations` is reached.
/// Returns the grid and the number of passes run.
pub fn diffuse_until_stable(
    grid: &ElevationGrid,
    threshold: f64,
    epsilon: f64,
    max_iterations: usize,
    num_threads: usize,
) -> (ElevationGrid, usize) {
    let mut current = grid.clone();
    let mut next = grid.clone();

    for i in 1..=max_iterations {
        diffusion_pass(&current, &mut next.field, threshold, num_threads);
        std::mem::swap(&mut current, &mut next);

        let max_change = current
            .field
            .iter()
            .zip(next.field.iter())
            .filter(|(a, _)| !a.is_nan())
            .fold(0f64, |m, (a, b)| m.max((a - b).abs()));

        if max_change <= epsilon {
            return (current, i);
        }
    }
    (current, max_iterations)
}

fn diffusion_pass(source: &ElevationGrid, target: &mut [f64], threshold: f64, num_threads: usize) {
    for_each_row(target, source.width, num_threads, |row, cells| {
        for (col, cell) in cells.iter_mut().enumerate() {
            let z = source[(row, col)];
            if z.is_nan() {
                *cell = z;
                continue;
            }

            let (sum, n) = source
                .neighbors(row, col)
                .filter_map(|(r, c)| source.get(r, c))
                .filter(|v| (v - z).abs() <= threshold)
                .fold((z, 1), |(s, n), v| (s + v, n + 1));

            *cell = sum / n as f64;
        }
    });
}
