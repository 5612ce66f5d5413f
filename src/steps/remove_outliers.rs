use crate::geometry::PointCloud;
use crate::parallel::map_indexed;
use crate::spatial::SpatialIndex;
use crate::statistics::Stat;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierCriterion {
    /// remove points whose mean neighbor distance exceeds mean + factor * std-dev
    StdDev(f64),
    /// remove this percentage of the points, the most isolated first
    Percentage(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlierReport {
    pub removed: usize,
    pub kept: usize,
}

/// Mean distance from every point to its `k` nearest neighbors, the point itself excluded
pub fn mean_neighbor_distances(
    index: &SpatialIndex<3>,
    cloud: &PointCloud,
    k: usize,
    num_threads: usize,
) -> Vec<f64> {
    map_indexed(cloud.len(), num_threads, |i| {
        let query = cloud[i].to_array();

        // duplicates may push the point itself out of the k+1 closest
        let (sum, n) = index
            .nearest_n(&query, k + 1)
            .into_iter()
            .filter(|n| n.index != i)
            .take(k)
            .fold((0., 0), |(sum, n), nn| (sum + nn.distance, n + 1));

        if n == 0 {
            0.
        } else {
            sum / n as f64
        }
    })
}

/// Statistical removal of spatially isolated points. Survivors keep their order.
pub fn remove_outliers(
    cloud: &PointCloud,
    k: usize,
    criterion: OutlierCriterion,
    num_threads: usize,
) -> (PointCloud, OutlierReport) {
    let num_points = cloud.len();
    let k = k.min(num_points.saturating_sub(1));

    if k == 0 || num_points < k + 1 {
        warn!(
            "Too few points ({}) for outlier removal, skipping it",
            num_points
        );
        return (
            cloud.clone(),
            OutlierReport {
                removed: 0,
                kept: num_points,
            },
        );
    }

    let index = SpatialIndex::new(&cloud.to_3d_slice());
    let distances = mean_neighbor_distances(&index, cloud, k, num_threads);

    let keep = match criterion {
        OutlierCriterion::StdDev(factor) => {
            let stat = Stat::from_values(&distances);
            let limit = stat.mean + factor * stat.std_dev;

            distances.iter().map(|&d| d <= limit).collect::<Vec<_>>()
        }
        OutlierCriterion::Percentage(percent) => {
            let num_remove = ((num_points as f64 * percent.clamp(0., 99.99)) / 100.) as usize;

            let mut order: Vec<usize> = (0..num_points).collect();
            order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]).then(a.cmp(&b)));

            let mut keep = vec![true; num_points];
            for &i in order.iter().take(num_remove) {
                keep[i] = false;
            }
            keep
        }
    };

    let filtered = cloud.retain_mask(&keep);
    let report = OutlierReport {
        removed: num_points - filtered.len(),
        kept: filtered.len(),
    };
    info!("Removed {} outlier points", report.removed);

    (filtered, report)
}
