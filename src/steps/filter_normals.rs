use crate::geometry::PointCloud;

use log::info;
use std::f64::consts::FRAC_PI_4;

/// Drops points whose normal leans 45 degrees or more away from up.
/// Up points down for clouds with flipped faces. Clouds without normals pass through.
pub fn filter_normals(cloud: &PointCloud) -> PointCloud {
    let Some(normals) = &cloud.normals else {
        return cloud.clone();
    };

    let cosine_limit = FRAC_PI_4.cos();
    let up = if cloud.flip_faces { -1. } else { 1. };

    let keep: Vec<bool> = normals
        .iter()
        .map(|n| {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let cosine = n[2] * up / length;
            // degenerate normals say nothing about the orientation
            !(cosine <= cosine_limit)
        })
        .collect();

    let filtered = cloud.retain_mask(&keep);
    info!(
        "Removed {} points by normal orientation",
        cloud.len() - filtered.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn cloud() -> PointCloud {
        PointCloud::with_normals(
            vec![
                Point3::new(0., 0., 0.),
                Point3::new(1., 0., 0.),
                Point3::new(2., 0., 0.),
                Point3::new(3., 0., 0.),
                Point3::new(4., 0., 0.),
            ],
            vec![
                [0., 0., 2.],
                [1., 0., 0.9],
                [0., 0.2, 1.],
                [0., 0., -1.],
                [0., 0., 0.],
            ],
        )
    }

    #[test]
    fn keeps_upward_normals() {
        let filtered = filter_normals(&cloud());

        let xs: Vec<f64> = filtered.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0., 2., 4.]);
    }

    #[test]
    fn flipped_faces_flip_up() {
        let mut cloud = cloud();
        cloud.flip_faces = true;

        let filtered = filter_normals(&cloud);

        let xs: Vec<f64> = filtered.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3., 4.]);
    }

    #[test]
    fn no_normals_no_filtering() {
        let cloud = PointCloud::new(vec![Point3::new(0., 0., 0.)]);
        assert_eq!(filter_normals(&cloud).points, cloud.points);
    }
}
