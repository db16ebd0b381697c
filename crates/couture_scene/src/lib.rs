//! Scene graph for the Couture viewer: the node hierarchy holding the
//! loaded model, lights and sample shapes, the camera with its orbit
//! controls, and the measurement guide overlay.

pub mod background;
pub mod camera;
pub mod guide;
pub mod light;
pub mod measurement;
pub mod mesh;
pub mod node;
pub mod orbit;
pub mod scene;
pub mod transform;

pub use background::BackgroundMode;
pub use camera::Camera;
pub use guide::GuideLine;
pub use light::{KEY_LIGHT_POSITION, Light, LightKind, LightRig, PointLight, studio_lights};
pub use measurement::{MEASUREMENT_NAMES, MeasurementPath, MeasurementTable};
pub use mesh::{Mesh, MeshRole};
pub use node::Node;
pub use orbit::OrbitControls;
pub use scene::Scene;
pub use transform::Transform;
