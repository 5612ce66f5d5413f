use super::mean_neighbor_distances;
use crate::geometry::{Point3, PointCloud};
use crate::spatial::SpatialIndex;

use log::info;
use std::collections::HashMap;

const MIN_CELL_SIZE: f64 = 1e-9;
const CELL_GROWTH: f64 = 1.25;

/// Mean distance from a point to its `k` nearest neighbors, averaged over the cloud
pub fn average_spacing(cloud: &PointCloud, k: usize, num_threads: usize) -> f64 {
    let k = k.min(cloud.len().saturating_sub(1));
    if k == 0 {
        return 0.;
    }

    let index = SpatialIndex::new(&cloud.to_3d_slice());
    let distances = mean_neighbor_distances(&index, cloud, k, num_threads);
    distances.iter().sum::<f64>() / distances.len() as f64
}

/// Thins the cloud to at most `max_points` (never below 3) by keeping one point per
/// square xy cell, growing the cells until the count fits. Survivors keep their order.
pub fn simplify_points(cloud: &PointCloud, max_points: usize, num_threads: usize) -> PointCloud {
    let max_points = max_points.max(3);
    if cloud.len() <= max_points {
        return cloud.clone();
    }

    let mut cell_size = average_spacing(cloud, 6, num_threads).max(MIN_CELL_SIZE);
    let mut finer = vec![true; cloud.len()];
    loop {
        let keep = bin_points(&cloud.points, cell_size);
        let count = keep.iter().filter(|&&k| k).count();

        if count <= max_points {
            // growing cells can skip past the three points a triangle needs
            let keep = if count < 3 {
                thin_evenly(&finer, max_points)
            } else {
                keep
            };
            let simplified = cloud.retain_mask(&keep);
            info!(
                "Simplified {} points to {} with a cell size of {:.4}",
                cloud.len(),
                simplified.len(),
                cell_size
            );
            return simplified;
        }
        finer = keep;
        cell_size *= CELL_GROWTH;
    }
}

/// `count` of the kept points, evenly spread over the input order
fn thin_evenly(keep: &[bool], count: usize) -> Vec<bool> {
    let kept: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect();

    let mut thinned = vec![false; keep.len()];
    for j in 0..count.min(kept.len()) {
        thinned[kept[j * kept.len() / count]] = true;
    }
    thinned
}

/// one point per occupied cell, the one closest to the centroid of the cell
fn bin_points(points: &[Point3], cell_size: f64) -> Vec<bool> {
    let Some(origin) = points.first() else {
        return vec![];
    };
    let (min_x, min_y) = points
        .iter()
        .fold((origin.x, origin.y), |(x, y), p| (x.min(p.x), y.min(p.y)));

    let cell_of = |p: &Point3| {
        (
            ((p.x - min_x) / cell_size).floor() as i64,
            ((p.y - min_y) / cell_size).floor() as i64,
        )
    };

    let mut centroids: HashMap<(i64, i64), (Point3, usize)> = HashMap::new();
    for p in points {
        let (sum, n) = centroids
            .entry(cell_of(p))
            .or_insert((Point3::new(0., 0., 0.), 0));
        sum.x += p.x;
        sum.y += p.y;
        sum.z += p.z;
        *n += 1;
    }

    // closest point per cell, the lower index on ties
    let mut closest: HashMap<(i64, i64), (usize, f64)> = HashMap::with_capacity(centroids.len());
    for (i, p) in points.iter().enumerate() {
        let cell = cell_of(p);
        let (sum, n) = centroids[&cell];
        let n = n as f64;
        let centroid = Point3::new(sum.x / n, sum.y / n, sum.z / n);
        let distance = p.squared_euclidean_distance(&centroid);

        closest
            .entry(cell)
            .and_modify(|best| {
                if distance < best.1 {
                    *best = (i, distance);
                }
            })
            .or_insert((i, distance));
    }

    let mut keep = vec![false; points.len()];
    for (i, _) in closest.into_values() {
        keep[i] = true;
    }
    keep
}
