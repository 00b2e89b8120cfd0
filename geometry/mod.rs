pub mod bounds;
pub mod distance;

pub use bounds::{contains, Bounds};
pub use distance::{distance, from_e7, to_e7, COORD_FACTOR, EARTH_RADIUS_METERS};
