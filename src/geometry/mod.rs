pub mod bounds;
pub mod mesh;
pub mod point3;
pub mod point_cloud;
pub mod projected_point;

pub use self::bounds::Bounds2;
pub use self::mesh::Mesh;
pub use self::point3::{consecutive_orientation, Point3};
pub use self::point_cloud::PointCloud;
pub use self::projected_point::ProjectedPoint;
