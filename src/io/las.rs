use crate::geometry::{Point3, PointCloud};
use crate::Result;

use las::Reader;
use log::info;
use std::path::Path;

/// every point of a las/laz file that is not flagged as withheld
pub fn read_las(path: &Path) -> Result<PointCloud> {
    let mut reader = Reader::from_path(path)?;
    info!(
        "Reading {} points from {}",
        reader.header().number_of_points(),
        path.to_string_lossy()
    );

    let mut points = Vec::new();
    for point in reader.points() {
        let point = point?;
        if !point.is_withheld {
            points.push(Point3::new(point.x, point.y, point.z));
        }
    }
    Ok(PointCloud::new(points))
}
