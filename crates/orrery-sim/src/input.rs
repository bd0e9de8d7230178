//! Platform-neutral input events
//!
//! The windowing layer translates its own events into these and hands them
//! to [`SimulationState::apply`](crate::SimulationState::apply).

/// Discrete actions bound to key presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    NextCameraMode,
    PreviousCameraMode,
    SpeedUp,
    SlowDown,
    TogglePause,
}

/// Keys held down for free-fly movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer position in physical pixels.
    PointerMoved { x: f64, y: f64 },
    /// The drag button went down or up.
    DragButton { pressed: bool },
    /// Scroll in lines, positive away from the user.
    Scroll { lines: f32 },
    Key(KeyAction),
    Move { key: MoveKey, pressed: bool },
    /// Framebuffer size in physical pixels.
    Resized { width: u32, height: u32 },
}
