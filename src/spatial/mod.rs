pub mod spatial_index;

pub use self::spatial_index::{Neighbor, SpatialIndex};
