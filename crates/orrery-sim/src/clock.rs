//! Simulation clock with variable, reversible playback rate

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub initial_speed: f32,
    /// Amount one speed-up / slow-down press changes the rate by.
    pub speed_step: f32,
    /// Rate is clamped to `[-max_speed, max_speed]`.
    pub max_speed: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            speed_step: 0.2,
            max_speed: 3.0,
        }
    }
}

/// Sim time advanced by `real_dt * speed` each frame. Not wall-clock.
#[derive(Clone, Debug)]
pub struct SimClock {
    time: f32,
    speed: f32,
    paused: bool,
    step: f32,
    max_speed: f32,
}

impl SimClock {
    pub fn new(config: &ClockConfig) -> Self {
        let mut clock = Self {
            time: 0.0,
            speed: 0.0,
            paused: false,
            step: config.speed_step,
            max_speed: config.max_speed,
        };
        clock.set_speed(config.initial_speed);
        clock
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the rate, clamped to the configured range.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(-self.max_speed, self.max_speed);
    }

    pub fn speed_up(&mut self) {
        self.nudge(1.0);
    }

    pub fn slow_down(&mut self) {
        self.nudge(-1.0);
    }

    // Snap to the step grid so repeated presses land exactly on 0.0.
    fn nudge(&mut self, direction: f32) {
        let steps = (self.speed / self.step).round() + direction;
        self.set_speed(steps * self.step);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by a real-time delta in seconds and return the new sim time.
    pub fn tick(&mut self, real_dt: f32) -> f32 {
        if !self.paused {
            self.time += real_dt * self.speed;
        }
        self.time
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}
