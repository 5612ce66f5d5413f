use super::Point3;

use geo::Coord;

/// Axis aligned bounding box in the xy-plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds2 {
    pub fn new(min: Coord, max: Coord) -> Bounds2 {
        Bounds2 { min, max }
    }

    /// None for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Bounds2> {
        let mut iter = points.into_iter();
        let first = iter.next()?.flatten();

        let mut bounds = Bounds2::new(first, first);
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Coord {
        Coord {
            x: (self.min.x + self.max.x) / 2.,
            y: (self.min.y + self.max.y) / 2.,
        }
    }

    pub fn contains(&self, point: Coord) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.x <= self.max.x
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_points() {
        let points = [
            Point3::new(1., -2., 0.),
            Point3::new(-3., 4., 10.),
            Point3::new(0.5, 0.5, -1.),
        ];
        let bounds = Bounds2::from_points(&points).unwrap();

        assert_eq!(bounds.min, Coord { x: -3., y: -2. });
        assert_eq!(bounds.max, Coord { x: 1., y: 4. });
        assert_eq!(bounds.width(), 4.);
        assert_eq!(bounds.height(), 6.);
        assert_eq!(bounds.center(), Coord { x: -1., y: 1. });
        assert!(bounds.contains(Coord { x: 0., y: 0. }));
        assert!(!bounds.contains(Coord { x: 2., y: 0. }));
    }

    #[test]
    fn no_bounds_for_no_points() {
        assert!(Bounds2::from_points(&Vec::<Point3>::new()).is_none());
    }
}
