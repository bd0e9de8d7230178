pub mod camera;
pub mod clock;
pub mod config;
pub mod input;
pub mod light;
pub mod orbit;
pub mod state;


pub use camera::{CameraConfig, CameraMode, CameraRig, MoveKeys};
pub use clock::{ClockConfig, SimClock};
pub use config::{ConfigError, SimConfig, SpinConfig};
pub use input::{InputEvent, KeyAction, MoveKey};
pub use light::LightSpace;
pub use orbit::{orbital_transform, spin, Body, BodyTransform, BodyTransforms, OrbitParams, OrbitTable, Wave};
pub use state::SimulationState;
