//! Window management and input handling

use std::sync::Arc;
use std::time::Instant;

use glam::UVec2;
use orrery_sim::{InputEvent, KeyAction, MoveKey, SimConfig, SimulationState};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::renderer::{Renderer, RendererOptions};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    Action(KeyAction),
    Move(MoveKey),
    Quit,
}

pub fn key_binding(key: KeyCode) -> Option<Binding> {
    let binding = match key {
        KeyCode::KeyP => Binding::Action(KeyAction::NextCameraMode),
        KeyCode::KeyO => Binding::Action(KeyAction::PreviousCameraMode),
        KeyCode::KeyL => Binding::Action(KeyAction::SpeedUp),
        KeyCode::KeyK => Binding::Action(KeyAction::SlowDown),
        KeyCode::Space => Binding::Action(KeyAction::TogglePause),
        KeyCode::KeyW => Binding::Move(MoveKey::Forward),
        KeyCode::KeyS => Binding::Move(MoveKey::Backward),
        KeyCode::KeyA => Binding::Move(MoveKey::Left),
        KeyCode::KeyD => Binding::Move(MoveKey::Right),
        KeyCode::Escape => Binding::Quit,
        _ => return None,
    };
    Some(binding)
}

/// Wheel lines, positive away from the user.
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
    }
}

pub fn window_title(state: &SimulationState, frame_dt: f32) -> String {
    let fps = if frame_dt > 0.0 { 1.0 / frame_dt } else { 0.0 };
    let paused = if state.clock.is_paused() { " (paused)" } else { "" };
    format!(
        "Orrery | {:?} camera | speed {:.1}{paused} | {fps:.0} fps",
        state.camera.mode,
        state.clock.speed()
    )
}

pub struct App {
    options: RendererOptions,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    state: SimulationState,
    last_frame: Instant,
    /// Fatal startup error, returned from [`run`] after the loop exits.
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(options: RendererOptions, config: SimConfig, initial_size: PhysicalSize<u32>) -> Self {
        let viewport = UVec2::new(initial_size.width, initial_size.height);
        Self {
            options,
            initial_size,
            window: None,
            renderer: None,
            state: SimulationState::new(config, viewport),
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Orrery")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let renderer = pollster::block_on(Renderer::new(Arc::clone(&window), &self.options))?;

        let size = window.inner_size();
        self.state.apply(&InputEvent::Resized {
            width: size.width,
            height: size.height,
        });
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, state: ElementState, repeat: bool) {
        let pressed = state == ElementState::Pressed;
        match key_binding(key) {
            Some(Binding::Quit) if pressed => event_loop.exit(),
            Some(Binding::Action(action)) if pressed && !repeat => {
                self.state.apply(&InputEvent::Key(action));
            }
            Some(Binding::Move(direction)) => {
                self.state.apply(&InputEvent::Move {
                    key: direction,
                    pressed,
                });
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.state.advance(dt);

        if let Some(renderer) = &mut self.renderer {
            renderer.render(&self.state);
        }
        if let Some(window) = &self.window {
            window.set_title(&window_title(&self.state, dt));
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                self.state.apply(&InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(event_loop, key, event.state, event.repeat);
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.state.apply(&InputEvent::DragButton {
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.state.apply(&InputEvent::PointerMoved {
                    x: position.x,
                    y: position.y,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.state.apply(&InputEvent::Scroll {
                    lines: scroll_lines(delta),
                });
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }
}

/// Run the windowed renderer until the window is closed.
pub fn run(
    options: RendererOptions,
    config: SimConfig,
    initial_size: PhysicalSize<u32>,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options, config, initial_size);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_camera_and_clock_keys() {
        assert_eq!(
            key_binding(KeyCode::KeyP),
            Some(Binding::Action(KeyAction::NextCameraMode))
        );
        assert_eq!(
            key_binding(KeyCode::KeyO),
            Some(Binding::Action(KeyAction::PreviousCameraMode))
        );
        assert_eq!(key_binding(KeyCode::KeyL), Some(Binding::Action(KeyAction::SpeedUp)));
        assert_eq!(key_binding(KeyCode::KeyK), Some(Binding::Action(KeyAction::SlowDown)));
        assert_eq!(
            key_binding(KeyCode::Space),
            Some(Binding::Action(KeyAction::TogglePause))
        );
    }

    #[test]
    fn test_movement_and_quit_keys() {
        assert_eq!(key_binding(KeyCode::KeyW), Some(Binding::Move(MoveKey::Forward)));
        assert_eq!(key_binding(KeyCode::KeyS), Some(Binding::Move(MoveKey::Backward)));
        assert_eq!(key_binding(KeyCode::KeyA), Some(Binding::Move(MoveKey::Left)));
        assert_eq!(key_binding(KeyCode::KeyD), Some(Binding::Move(MoveKey::Right)));
        assert_eq!(key_binding(KeyCode::Escape), Some(Binding::Quit));
        assert_eq!(key_binding(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_pixel_scroll_converts_to_lines() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0));
        assert_eq!(scroll_lines(pixels), 2.0);
    }

    #[test]
    fn test_title_reports_mode_and_pause() {
        let mut state = SimulationState::default();
        state.apply(&InputEvent::Key(KeyAction::TogglePause));
        let title = window_title(&state, 0.02);
        assert!(title.contains("Earth camera"), "{title}");
        assert!(title.contains("(paused)"), "{title}");
        assert!(title.contains("50 fps"), "{title}");
    }
}
