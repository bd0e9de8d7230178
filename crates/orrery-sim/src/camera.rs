//! Orbit and free-fly camera
//!
//! Yaw and pitch are in degrees. In the orbit modes the camera position is
//! derived every frame from the target body; in free mode it is integrated
//! from the held movement keys.

use glam::{DVec2, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::orbit::{Body, BodyTransforms};

/// Pitch limit that keeps `look_at` away from the up vector.
pub const PITCH_LIMIT_DEG: f32 = 89.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CameraMode {
    #[default]
    Earth,
    Moon,
    Jupiter,
    Free,
}

impl CameraMode {
    pub const ALL: [CameraMode; 4] = [
        CameraMode::Earth,
        CameraMode::Moon,
        CameraMode::Jupiter,
        CameraMode::Free,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Body the camera orbits, `None` in free mode.
    pub fn target(self) -> Option<Body> {
        match self {
            CameraMode::Earth => Some(Body::Earth),
            CameraMode::Moon => Some(Body::Moon),
            CameraMode::Jupiter => Some(Body::Jupiter),
            CameraMode::Free => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Degrees of yaw/pitch per pixel of drag.
    pub drag_sensitivity: f32,
    /// Distance (orbit) or travel (free) per scroll line.
    pub zoom_speed: f32,
    pub initial_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Free-mode travel in units per second.
    pub fly_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 1000.0,
            drag_sensitivity: 0.2,
            zoom_speed: 5.0,
            initial_distance: 18.0,
            min_distance: 5.0,
            max_distance: 150.0,
            fly_speed: 15.0,
        }
    }
}

/// Held free-fly keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Unit vector from yaw/pitch (degrees).
pub fn direction(yaw_deg: f32, pitch_deg: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw_deg.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch_deg.to_radians().sin_cos();
    Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize()
}

pub struct CameraRig {
    pub mode: CameraMode,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub position: Vec3,
    pub up: Vec3,
    dragging: bool,
    last_pointer: Option<DVec2>,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            mode: CameraMode::Earth,
            yaw: -90.0,
            pitch: 0.0,
            distance: config.initial_distance.clamp(config.min_distance, config.max_distance),
            position: Vec3::new(0.0, 2.0, 6.0),
            up: Vec3::Y,
            dragging: false,
            last_pointer: None,
        }
    }

    /// Orbit offset direction; the free-mode view looks the opposite way.
    pub fn direction(&self) -> Vec3 {
        direction(self.yaw, self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        -self.direction()
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Feed a pointer sample. Only rotates while dragging, but always
    /// records the sample so the next drag starts from where the pointer is.
    pub fn pointer_moved(&mut self, x: f64, y: f64, sensitivity: f32) {
        let sample = DVec2::new(x, y);
        let last = self.last_pointer.replace(sample);
        if !self.dragging {
            return;
        }
        let Some(last) = last else {
            return;
        };

        let dx = (sample.x - last.x) as f32 * sensitivity;
        // Screen y grows downward.
        let dy = (last.y - sample.y) as f32 * sensitivity;
        self.rotate(dx, dy);
    }

    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// Orbit modes zoom (clamped). Free mode moves along the orbit offset
    /// direction, so scrolling up backs away from what the camera faces.
    pub fn scroll(&mut self, lines: f32, config: &CameraConfig) {
        match self.mode {
            CameraMode::Free => {
                self.position += self.direction() * lines * config.zoom_speed;
            }
            _ => {
                self.distance = (self.distance - lines * config.zoom_speed)
                    .clamp(config.min_distance, config.max_distance);
            }
        }
    }

    /// Integrate free-fly movement. No-op in the orbit modes.
    pub fn fly(&mut self, keys: MoveKeys, dt: f32, speed: f32) {
        if self.mode != CameraMode::Free {
            return;
        }
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let step = speed * dt;

        if keys.forward {
            self.position += forward * step;
        }
        if keys.backward {
            self.position -= forward * step;
        }
        if keys.left {
            self.position -= right * step;
        }
        if keys.right {
            self.position += right * step;
        }
    }

    /// View matrix for the current mode. In the orbit modes this also
    /// re-derives the camera position from the target body.
    pub fn view(&mut self, bodies: &BodyTransforms) -> Mat4 {
        match self.mode.target() {
            Some(body) => {
                let target = bodies.get(body).position;
                self.position = target + self.direction() * self.distance;
                Mat4::look_at_rh(self.position, target, self.up)
            }
            None => Mat4::look_at_rh(self.position, self.position + self.forward(), self.up),
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
