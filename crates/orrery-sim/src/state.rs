//! The per-frame simulation state
//!
//! One `SimulationState` lives for the whole run. Input events mutate it
//! between frames; [`SimulationState::advance`] moves it forward by one frame.

use glam::{Mat4, UVec2};

use crate::camera::{CameraRig, MoveKeys};
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::input::{InputEvent, KeyAction, MoveKey};
use crate::light::LightSpace;
use crate::orbit::{Body, BodyTransform, BodyTransforms};

pub struct SimulationState {
    pub config: SimConfig,
    pub clock: SimClock,
    pub camera: CameraRig,
    pub bodies: BodyTransforms,
    pub light: LightSpace,
    /// Framebuffer size in physical pixels.
    pub viewport: UVec2,
    pub projection: Mat4,
    pub view: Mat4,
    pub move_keys: MoveKeys,
}

impl SimulationState {
    pub fn new(config: SimConfig, viewport: UVec2) -> Self {
        let clock = SimClock::new(&config.clock);
        let camera = CameraRig::new(&config.camera);
        let bodies = BodyTransforms::at(clock.time(), &config.orbits);
        let light = LightSpace::from_sun(bodies.get(Body::Sun).position);

        let mut state = Self {
            config,
            clock,
            camera,
            bodies,
            light,
            viewport,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            move_keys: MoveKeys::default(),
        };
        state.projection = state.camera_projection();
        state.view = state.camera.view(&state.bodies);
        state
    }

    pub fn sim_time(&self) -> f32 {
        self.clock.time()
    }

    pub fn body(&self, body: Body) -> &BodyTransform {
        self.bodies.get(body)
    }

    pub fn aspect_ratio(&self) -> f32 {
        // A minimised window reports 0x0.
        self.viewport.x.max(1) as f32 / self.viewport.y.max(1) as f32
    }

    fn camera_projection(&self) -> Mat4 {
        let camera = &self.config.camera;
        Mat4::perspective_rh(
            camera.fov_deg.to_radians(),
            self.aspect_ratio(),
            camera.near,
            camera.far,
        )
    }

    /// Advance one frame by `real_dt` seconds of wall time.
    pub fn advance(&mut self, real_dt: f32) {
        let sim_time = self.clock.tick(real_dt);
        self.bodies.update(sim_time, &self.config.orbits);

        self.projection = self.camera_projection();

        self.camera.fly(self.move_keys, real_dt, self.config.camera.fly_speed);
        self.view = self.camera.view(&self.bodies);

        self.light = LightSpace::from_sun(self.bodies.get(Body::Sun).position);
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => {
                self.camera.pointer_moved(x, y, self.config.camera.drag_sensitivity);
            }
            InputEvent::DragButton { pressed } => self.camera.set_dragging(pressed),
            InputEvent::Scroll { lines } => self.camera.scroll(lines, &self.config.camera),
            InputEvent::Key(action) => self.key_action(action),
            InputEvent::Move { key, pressed } => {
                let held = match key {
                    MoveKey::Forward => &mut self.move_keys.forward,
                    MoveKey::Backward => &mut self.move_keys.backward,
                    MoveKey::Left => &mut self.move_keys.left,
                    MoveKey::Right => &mut self.move_keys.right,
                };
                *held = pressed;
            }
            InputEvent::Resized { width, height } => {
                self.viewport = UVec2::new(width, height);
            }
        }
    }

    fn key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::NextCameraMode => {
                self.camera.mode = self.camera.mode.next();
                tracing::info!("Camera mode: {:?}", self.camera.mode);
            }
            KeyAction::PreviousCameraMode => {
                self.camera.mode = self.camera.mode.previous();
                tracing::info!("Camera mode: {:?}", self.camera.mode);
            }
            KeyAction::SpeedUp => {
                self.clock.speed_up();
                tracing::info!("Sim speed: {:.1}", self.clock.speed());
            }
            KeyAction::SlowDown => {
                self.clock.slow_down();
                tracing::info!("Sim speed: {:.1}", self.clock.speed());
            }
            KeyAction::TogglePause => {
                self.clock.toggle_pause();
                tracing::info!("Paused: {}", self.clock.is_paused());
            }
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(SimConfig::default(), UVec2::new(1280, 720))
    }
}
