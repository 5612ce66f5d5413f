use crate::geometry::{Bounds2, Point3, PointCloud, ProjectedPoint};
use crate::{Error, Result};

/// A cloud split into planar positions and elevations
#[derive(Debug, Clone)]
pub struct Projection {
    pub points: Vec<ProjectedPoint>,
    pub bounds: Bounds2,
    /// center of the bounding box, z at the middle of the elevation range
    pub center: Point3,
}

impl Projection {
    pub fn to_2d_slice(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.pos.x, p.pos.y]).collect()
    }
}

pub fn project_points(cloud: &PointCloud) -> Result<Projection> {
    let (Some(bounds), Some((min_z, max_z))) = (cloud.bounds(), cloud.z_range()) else {
        return Err(Error::InsufficientPoints);
    };

    let points = cloud
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| ProjectedPoint::from_point(p, i))
        .collect();

    let center = bounds.center();
    Ok(Projection {
        points,
        bounds,
        center: Point3::new(center.x, center.y, (min_z + max_z) / 2.),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_positions_and_elevations() {
        let cloud = PointCloud::new(vec![
            Point3::new(1., 2., 3.),
            Point3::new(-1., 4., 7.),
            Point3::new(3., 0., -1.),
        ]);

        let projection = project_points(&cloud).unwrap();

        for (i, (pp, p)) in projection.points.iter().zip(&cloud.points).enumerate() {
            assert_eq!(pp.to_point3(), *p);
            assert_eq!(pp.index, i);
        }
        assert_eq!(projection.bounds.min.x, -1.);
        assert_eq!(projection.bounds.max.y, 4.);
        assert_eq!(projection.center, Point3::new(1., 2., 3.));
    }

    #[test]
    fn empty_cloud_is_an_error() {
        assert!(matches!(
            project_points(&PointCloud::default()),
            Err(Error::InsufficientPoints)
        ));
    }
}
