//! Tunable scene parameters
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraConfig;
use crate::clock::ClockConfig;
use crate::orbit::{Body, OrbitTable};

/// Self-rotation rates applied at draw time, in radians per sim second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub earth: f32,
    /// Moon and any other moon-like body.
    pub moon: f32,
    pub clouds: f32,
    /// Cloud shell scale relative to the Earth, kept above 1 to avoid z-fighting.
    pub cloud_scale: f32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            earth: 0.5,
            moon: 1.5,
            clouds: 0.8,
            cloud_scale: 1.02,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub camera: CameraConfig,
    pub clock: ClockConfig,
    pub orbits: OrbitTable,
    pub spin: SpinConfig,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("camera distance range is empty: min {min} > max {max}")]
    DistanceRange { min: f32, max: f32 },

    #[error("camera field of view {0} degrees is outside (0, 180)")]
    FieldOfView(f32),

    #[error("camera clip planes must satisfy 0 < near < far (near {near}, far {far})")]
    ClipPlanes { near: f32, far: f32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("clock.initial_speed {speed} is not a multiple of clock.speed_step {step}")]
    OffGridSpeed { speed: f32, step: f32 },

    #[error("{child} cannot orbit {parent}: parents must update before their children")]
    ParentOrder { child: &'static str, parent: &'static str },
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if camera.min_distance > camera.max_distance {
            return Err(ConfigError::DistanceRange {
                min: camera.min_distance,
                max: camera.max_distance,
            });
        }
        if !(camera.fov_deg > 0.0 && camera.fov_deg < 180.0) {
            return Err(ConfigError::FieldOfView(camera.fov_deg));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::ClipPlanes { near: camera.near, far: camera.far });
        }

        let positive = [
            ("clock.speed_step", self.clock.speed_step),
            ("clock.max_speed", self.clock.max_speed),
            ("spin.cloud_scale", self.spin.cloud_scale),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        // Speed changes snap to the step grid, so an off-grid start would
        // jump on the first key press.
        let steps = self.clock.initial_speed / self.clock.speed_step;
        if (steps - steps.round()).abs() > 1e-3 {
            return Err(ConfigError::OffGridSpeed {
                speed: self.clock.initial_speed,
                step: self.clock.speed_step,
            });
        }

        for (index, body) in Body::UPDATE_ORDER.iter().enumerate() {
            let Some(parent) = self.orbits.get(*body).parent else {
                continue;
            };
            let updated_before = Body::UPDATE_ORDER[..index].contains(&parent);
            if !updated_before {
                return Err(ConfigError::ParentOrder {
                    child: body.name(),
                    parent: parent.name(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "camera": { "fov_deg": 60.0 }, "clock": { "max_speed": 5.0 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.camera.fov_deg, 60.0);
        assert_eq!(config.camera.max_distance, 150.0);
        assert_eq!(config.clock.max_speed, 5.0);
        assert_eq!(config.clock.speed_step, 0.2);
        assert_eq!(config.orbits, OrbitTable::default());
    }

    #[test]
    fn test_orbit_override_from_json() {
        let json = r#"{
            "orbits": {
                "moon": {
                    "radius": 20.0,
                    "angular_speed": 0.4,
                    "scale": 1.5,
                    "bob": [{ "amplitude": 2.0, "frequency": 0.1, "shape": "cos" }]
                }
            }
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.orbits.moon.radius, 20.0);
        assert_eq!(config.orbits.moon.parent, None);
        assert_eq!(config.orbits.jupiter.parent, Some(Body::Moon));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_inverted_distance_range() {
        let mut config = SimConfig::default();
        config.camera.min_distance = 200.0;
        assert!(matches!(config.validate(), Err(ConfigError::DistanceRange { .. })));
    }

    #[test]
    fn test_rejects_zero_speed_step() {
        let mut config = SimConfig::default();
        config.clock.speed_step = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "clock.speed_step", value: 0.0 })
        );
    }

    #[test]
    fn test_initial_speed_must_sit_on_step_grid() {
        let mut config = SimConfig::default();
        config.clock.initial_speed = 0.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::OffGridSpeed { speed: 0.5, step: 0.2 })
        );

        config.clock.initial_speed = 0.4;
        assert_eq!(config.validate(), Ok(()));
        config.clock.initial_speed = -1.2;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_parent_updated_later() {
        let mut config = SimConfig::default();
        config.orbits.moon.parent = Some(Body::Jupiter);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ParentOrder { child: "Moon", parent: "Jupiter" })
        );
    }
}
