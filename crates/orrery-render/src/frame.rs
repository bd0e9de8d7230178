//! Frame plan: the ordered draws of one frame
//!
//! A [`FramePlan`] is built from the simulation state without touching the
//! GPU, then replayed into a [`PassRecorder`]. The renderer records into a
//! command encoder; tests record into an [`EventLog`].

use orrery_sim::SimulationState;

use crate::draw::{draw_clouds, draw_moon_like, draw_planet, draw_sky, draw_sun, DrawCall, Satellite};
use crate::gpu_types::DrawUniforms;
use crate::pipelines::PipelineKind;
use crate::slots::RenderMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    Shadow,
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassEvent {
    Begin(PassKind),
    Draw {
        label: &'static str,
        mode: RenderMode,
        pipeline: PipelineKind,
    },
    End(PassKind),
}

/// Receives a plan pass by pass. `slot` indexes the frame's uniform blocks.
pub trait PassRecorder {
    fn begin(&mut self, pass: PassKind);
    fn draw(&mut self, slot: usize, call: &DrawCall);
    fn end(&mut self, pass: PassKind);
}

pub struct FramePlan {
    pub shadow: Vec<DrawCall>,
    pub color: Vec<DrawCall>,
}

impl FramePlan {
    pub fn build(state: &SimulationState) -> Self {
        let shadow = vec![
            draw_planet(state, RenderMode::Shadow),
            draw_moon_like(state, Satellite::Moon, RenderMode::Shadow),
            draw_moon_like(state, Satellite::Jupiter, RenderMode::Shadow),
        ];

        // Backdrops first, translucent clouds before the remaining opaque bodies.
        let color = vec![
            draw_sky(state),
            draw_sun(state),
            draw_planet(state, RenderMode::Lit),
            draw_clouds(state),
            draw_moon_like(state, Satellite::Moon, RenderMode::LitMoon),
            draw_moon_like(state, Satellite::Jupiter, RenderMode::LitMoon),
        ];

        Self { shadow, color }
    }

    /// Uniform blocks in slot order: shadow draws, then color draws.
    pub fn uniforms(&self) -> Vec<DrawUniforms> {
        self.shadow
            .iter()
            .chain(&self.color)
            .map(|call| call.uniforms)
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.shadow.len() + self.color.len()
    }

    pub fn record(&self, recorder: &mut impl PassRecorder) {
        recorder.begin(PassKind::Shadow);
        for (slot, call) in self.shadow.iter().enumerate() {
            recorder.draw(slot, call);
        }
        recorder.end(PassKind::Shadow);

        let base = self.shadow.len();
        recorder.begin(PassKind::Color);
        for (i, call) in self.color.iter().enumerate() {
            recorder.draw(base + i, call);
        }
        recorder.end(PassKind::Color);
    }
}

/// Records pass events instead of GPU commands.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<PassEvent>,
    pub slots: Vec<usize>,
}

impl PassRecorder for EventLog {
    fn begin(&mut self, pass: PassKind) {
        self.events.push(PassEvent::Begin(pass));
    }

    fn draw(&mut self, slot: usize, call: &DrawCall) {
        self.slots.push(slot);
        self.events.push(PassEvent::Draw {
            label: call.label,
            mode: call.mode,
            pipeline: call.pipeline,
        });
    }

    fn end(&mut self, pass: PassKind) {
        self.events.push(PassEvent::End(pass));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;
    use orrery_sim::SimConfig;

    fn recorded() -> EventLog {
        let mut state = SimulationState::new(SimConfig::default(), UVec2::new(1280, 720));
        state.advance(0.016);
        let mut log = EventLog::default();
        FramePlan::build(&state).record(&mut log);
        log
    }

    fn draws_between(events: &[PassEvent], pass: PassKind) -> Vec<(&'static str, RenderMode)> {
        let begin = events.iter().position(|e| *e == PassEvent::Begin(pass)).unwrap();
        let end = events.iter().position(|e| *e == PassEvent::End(pass)).unwrap();
        events[begin + 1..end]
            .iter()
            .filter_map(|e| match e {
                PassEvent::Draw { label, mode, .. } => Some((*label, *mode)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_shadow_pass_precedes_color_pass() {
        let log = recorded();
        assert_eq!(log.events.first(), Some(&PassEvent::Begin(PassKind::Shadow)));
        assert_eq!(log.events.last(), Some(&PassEvent::End(PassKind::Color)));

        let shadow_end = log.events.iter().position(|e| *e == PassEvent::End(PassKind::Shadow));
        let color_begin = log.events.iter().position(|e| *e == PassEvent::Begin(PassKind::Color));
        assert!(shadow_end < color_begin);
    }

    #[test]
    fn test_shadow_pass_draws_occluders_only() {
        let log = recorded();
        let draws = draws_between(&log.events, PassKind::Shadow);
        assert_eq!(
            draws,
            vec![
                ("Earth", RenderMode::Shadow),
                ("Moon", RenderMode::Shadow),
                ("Jupiter", RenderMode::Shadow),
            ]
        );
    }

    #[test]
    fn test_color_pass_mode_order() {
        let log = recorded();
        let modes: Vec<u32> = draws_between(&log.events, PassKind::Color)
            .iter()
            .map(|(_, mode)| mode.id())
            .collect();
        assert_eq!(modes, vec![1, 0, 2, 4, 5, 5]);
    }

    #[test]
    fn test_no_lit_draw_before_shadow_map_is_complete() {
        let log = recorded();
        let shadow_end = log
            .events
            .iter()
            .position(|e| *e == PassEvent::End(PassKind::Shadow))
            .unwrap();
        for event in &log.events[..shadow_end] {
            if let PassEvent::Draw { mode, .. } = event {
                assert!(!mode.is_lit(), "{event:?}");
            }
        }
    }

    #[test]
    fn test_every_draw_is_inside_an_open_pass() {
        let log = recorded();
        let mut open = None;
        for event in &log.events {
            match event {
                PassEvent::Begin(pass) => {
                    assert_eq!(open, None, "{pass:?} begun inside another pass");
                    open = Some(*pass);
                }
                PassEvent::Draw { label, .. } => assert!(open.is_some(), "{label} drawn outside a pass"),
                PassEvent::End(pass) => assert_eq!(open.take(), Some(*pass)),
            }
        }
        assert_eq!(open, None);
    }

    #[test]
    fn test_slots_match_uniform_order() {
        let state = SimulationState::default();
        let plan = FramePlan::build(&state);
        let mut log = EventLog::default();
        plan.record(&mut log);

        assert_eq!(log.slots, (0..plan.draw_count()).collect::<Vec<_>>());
        let uniforms = plan.uniforms();
        assert_eq!(uniforms.len(), 9);
        assert_eq!(uniforms[3], plan.color[0].uniforms);
    }
}
