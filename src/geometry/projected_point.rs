use super::Point3;

use geo::Coord;
use spade::{HasPosition, Point2};

/// A point split into its planar position and the elevation carried as an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub pos: Coord,
    pub elevation: f64,
    /// index of the point in the cloud it was projected from
    pub index: usize,
}

impl ProjectedPoint {
    pub fn from_point(point: &Point3, index: usize) -> ProjectedPoint {
        ProjectedPoint {
            pos: point.flatten(),
            elevation: point.z,
            index,
        }
    }

    pub fn to_point3(&self) -> Point3 {
        Point3::new(self.pos.x, self.pos.y, self.elevation)
    }
}

impl HasPosition for ProjectedPoint {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        Point2::new(self.pos.x, self.pos.y)
    }
}
