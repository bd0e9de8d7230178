//! Per-body draw routines
//!
//! Each routine turns the simulation state into one [`DrawCall`]: which
//! pipeline, mesh and material to bind and the uniforms for that draw. The
//! render mode is a parameter, so the same routine serves the shadow and
//! color passes.

use glam::{Mat3, Mat4, Vec3};
use orrery_sim::{spin, Body, SimulationState};

use crate::assets::{MaterialId, MeshId};
use crate::gpu_types::DrawUniforms;
use crate::pipelines::PipelineKind;
use crate::slots::RenderMode;

pub const BACKGROUND_FOV_DEG: f32 = 45.0;
pub const BACKGROUND_NEAR: f32 = 0.1;
pub const BACKGROUND_FAR: f32 = 1000.0;
pub const SKY_SCALE: f32 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub label: &'static str,
    pub mode: RenderMode,
    pub pipeline: PipelineKind,
    pub mesh: MeshId,
    /// `None` in the shadow pass.
    pub material: Option<MaterialId>,
    pub uniforms: DrawUniforms,
}

impl DrawCall {
    /// Material bind group to set, or `None` when the pipeline has no
    /// material group.
    pub fn bound_material(&self) -> Option<MaterialId> {
        if self.pipeline.fixed_function().uses_materials {
            self.material
        } else {
            None
        }
    }
}

/// Bodies drawn with a single albedo texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Satellite {
    Moon,
    Jupiter,
}

impl Satellite {
    fn body(self) -> Body {
        match self {
            Satellite::Moon => Body::Moon,
            Satellite::Jupiter => Body::Jupiter,
        }
    }

    fn mesh(self) -> MeshId {
        match self {
            Satellite::Moon => MeshId::MediumDetail,
            Satellite::Jupiter => MeshId::LowDetail,
        }
    }

    fn material(self) -> MaterialId {
        match self {
            Satellite::Moon => MaterialId::Moon,
            Satellite::Jupiter => MaterialId::Jupiter,
        }
    }
}

/// View with its translation removed, so distant backdrops follow the eye.
pub fn stripped_view(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

pub fn background_projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(
        BACKGROUND_FOV_DEG.to_radians(),
        aspect,
        BACKGROUND_NEAR,
        BACKGROUND_FAR,
    )
}

fn view_projection(state: &SimulationState, mode: RenderMode) -> (Mat4, Mat4) {
    match mode {
        RenderMode::Shadow => (state.light.view, state.light.projection),
        _ => (state.view, state.projection),
    }
}

fn shaded_body(
    state: &SimulationState,
    label: &'static str,
    mode: RenderMode,
    model: Mat4,
    mesh: MeshId,
    material: MaterialId,
    is_earth: bool,
) -> DrawCall {
    let (view, projection) = view_projection(state, mode);
    let mut uniforms = DrawUniforms::new(mode, model, view, projection);
    if mode.is_lit() {
        uniforms = uniforms.with_lighting(&state.light, state.camera.position, is_earth);
    }

    let (pipeline, material) = match mode {
        RenderMode::Shadow => (PipelineKind::Shadow, None),
        _ => (PipelineKind::Opaque, Some(material)),
    };

    DrawCall {
        label,
        mode,
        pipeline,
        mesh,
        material,
        uniforms,
    }
}

/// Earth, spinning about its own axis.
pub fn draw_planet(state: &SimulationState, mode: RenderMode) -> DrawCall {
    let model = spin(state.body(Body::Earth).model, state.sim_time(), state.config.spin.earth);
    shaded_body(state, "Earth", mode, model, MeshId::HighDetail, MaterialId::Earth, true)
}

pub fn draw_moon_like(state: &SimulationState, satellite: Satellite, mode: RenderMode) -> DrawCall {
    let model = spin(
        state.body(satellite.body()).model,
        state.sim_time(),
        state.config.spin.moon,
    );
    let label = satellite.body().name();
    shaded_body(state, label, mode, model, satellite.mesh(), satellite.material(), false)
}

pub fn draw_sky(state: &SimulationState) -> DrawCall {
    let uniforms = DrawUniforms::new(
        RenderMode::Sky,
        Mat4::from_scale(Vec3::splat(SKY_SCALE)),
        stripped_view(state.view),
        background_projection(state.aspect_ratio()),
    );
    DrawCall {
        label: "Sky",
        mode: RenderMode::Sky,
        pipeline: PipelineKind::Sky,
        mesh: MeshId::SkyDome,
        material: Some(MaterialId::Sky),
        uniforms,
    }
}

pub fn draw_sun(state: &SimulationState) -> DrawCall {
    let uniforms = DrawUniforms::new(
        RenderMode::Unlit,
        state.body(Body::Sun).model,
        stripped_view(state.view),
        background_projection(state.aspect_ratio()),
    );
    DrawCall {
        label: "Sun",
        mode: RenderMode::Unlit,
        pipeline: PipelineKind::Opaque,
        mesh: MeshId::LowDetail,
        material: Some(MaterialId::Sun),
        uniforms,
    }
}

/// Cloud shell slightly above Earth's surface, drifting faster than the
/// planet turns.
pub fn draw_clouds(state: &SimulationState) -> DrawCall {
    let spin_rates = &state.config.spin;
    let model = state.body(Body::Earth).model
        * Mat4::from_scale(Vec3::splat(spin_rates.cloud_scale))
        * Mat4::from_rotation_y(state.sim_time() * spin_rates.clouds);
    let uniforms = DrawUniforms::new(RenderMode::Clouds, model, state.view, state.projection)
        .with_light_dir(state.light.direction);

    DrawCall {
        label: "Clouds",
        mode: RenderMode::Clouds,
        pipeline: PipelineKind::Translucent,
        mesh: MeshId::HighDetail,
        material: Some(MaterialId::Clouds),
        uniforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec2, Vec4};
    use orrery_sim::SimConfig;

    fn state_at(sim_time_steps: usize) -> SimulationState {
        let mut state = SimulationState::new(SimConfig::default(), UVec2::new(800, 600));
        for _ in 0..sim_time_steps {
            state.advance(0.1);
        }
        state
    }

    fn mat(cols: [[f32; 4]; 4]) -> Mat4 {
        Mat4::from_cols_array_2d(&cols)
    }

    #[test]
    fn test_stripped_view_keeps_rotation_only() {
        let view = Mat4::look_at_rh(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
        let stripped = stripped_view(view);
        assert_eq!(stripped.w_axis, Vec4::W);
        assert!(Mat3::from_mat4(stripped).abs_diff_eq(Mat3::from_mat4(view), 1e-6));
    }

    #[test]
    fn test_planet_spins_earth_model() {
        let state = state_at(20);
        let call = draw_planet(&state, RenderMode::Lit);
        let expected = state.body(Body::Earth).model
            * Mat4::from_rotation_y(state.sim_time() * state.config.spin.earth);

        assert!(mat(call.uniforms.model).abs_diff_eq(expected, 1e-5));
        assert_eq!(call.uniforms.is_earth, 1);
        assert_eq!(call.material, Some(MaterialId::Earth));
        assert_eq!(call.pipeline, PipelineKind::Opaque);
    }

    #[test]
    fn test_shadow_mode_uses_light_matrices_without_material() {
        let state = state_at(5);
        for call in [
            draw_planet(&state, RenderMode::Shadow),
            draw_moon_like(&state, Satellite::Moon, RenderMode::Shadow),
            draw_moon_like(&state, Satellite::Jupiter, RenderMode::Shadow),
        ] {
            assert_eq!(call.pipeline, PipelineKind::Shadow);
            assert_eq!(call.material, None);
            assert_eq!(mat(call.uniforms.view), state.light.view);
            assert_eq!(mat(call.uniforms.projection), state.light.projection);
            assert_eq!(call.uniforms.mode(), Some(RenderMode::Shadow));
        }
    }

    #[test]
    fn test_shadow_pipeline_never_binds_a_material() {
        let state = state_at(2);
        let mut call = draw_planet(&state, RenderMode::Shadow);
        call.material = Some(MaterialId::Earth);
        assert_eq!(call.bound_material(), None);

        let lit = draw_planet(&state, RenderMode::Lit);
        assert_eq!(lit.bound_material(), Some(MaterialId::Earth));
        assert_eq!(draw_clouds(&state).bound_material(), Some(MaterialId::Clouds));
        assert_eq!(draw_sky(&state).bound_material(), Some(MaterialId::Sky));
    }

    #[test]
    fn test_moon_like_bodies_are_lit_but_not_earth() {
        let state = state_at(3);
        let moon = draw_moon_like(&state, Satellite::Moon, RenderMode::LitMoon);
        assert_eq!(moon.uniforms.is_earth, 0);
        assert_eq!(moon.uniforms.light_space, state.light.matrix.to_cols_array_2d());
        assert_eq!(moon.mesh, MeshId::MediumDetail);

        let jupiter = draw_moon_like(&state, Satellite::Jupiter, RenderMode::LitMoon);
        assert_eq!(jupiter.mesh, MeshId::LowDetail);
        assert_eq!(jupiter.material, Some(MaterialId::Jupiter));
        assert_eq!(jupiter.label, "Jupiter");
    }

    #[test]
    fn test_sky_ignores_camera_fov_and_translation() {
        let mut config = SimConfig::default();
        config.camera.fov_deg = 70.0;
        let state = SimulationState::new(config, UVec2::new(1000, 500));
        let sky = draw_sky(&state);

        assert_eq!(mat(sky.uniforms.projection), background_projection(2.0));
        assert_eq!(mat(sky.uniforms.view).w_axis, Vec4::W);
        assert_eq!(mat(sky.uniforms.model), Mat4::from_scale(Vec3::splat(SKY_SCALE)));
        assert_eq!(sky.pipeline, PipelineKind::Sky);
    }

    #[test]
    fn test_sun_is_unlit_and_opaque() {
        let state = state_at(1);
        let sun = draw_sun(&state);
        assert_eq!(sun.mode, RenderMode::Unlit);
        assert_eq!(sun.pipeline, PipelineKind::Opaque);
        assert_eq!(mat(sun.uniforms.model), state.body(Body::Sun).model);
    }

    #[test]
    fn test_clouds_wrap_earth_and_blend() {
        let state = state_at(10);
        let clouds = draw_clouds(&state);
        let spin_rates = &state.config.spin;
        let expected = state.body(Body::Earth).model
            * Mat4::from_scale(Vec3::splat(spin_rates.cloud_scale))
            * Mat4::from_rotation_y(state.sim_time() * spin_rates.clouds);

        assert!(mat(clouds.uniforms.model).abs_diff_eq(expected, 1e-5));
        assert_eq!(clouds.pipeline, PipelineKind::Translucent);
        assert_eq!(clouds.uniforms.light_dir, state.light.direction.extend(0.0).to_array());
    }
}
