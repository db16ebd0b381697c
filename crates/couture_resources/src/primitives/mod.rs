pub mod box_shape;
pub mod circle;
pub mod sphere;
pub mod tube;

pub use box_shape::create_box;
pub use circle::create_circle;
pub use sphere::{SphereOptions, create_sphere};
pub use tube::{TubeOptions, create_tube};
