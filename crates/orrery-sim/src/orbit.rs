//! Parametric orbits for the scene bodies
//!
//! Orbits here are cosmetic: each body rotates about +Y, sits at a fixed
//! radius and bobs vertically. A body may orbit another body, in which case
//! its matrix is composed onto the parent's matrix for the same sim time.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Bodies that carry a model matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Earth,
    Moon,
    Jupiter,
    Sun,
}

impl Body {
    /// Update order. Every parent appears before its children.
    pub const UPDATE_ORDER: [Body; 4] = [Body::Earth, Body::Moon, Body::Jupiter, Body::Sun];

    pub fn name(self) -> &'static str {
        match self {
            Body::Earth => "Earth",
            Body::Moon => "Moon",
            Body::Jupiter => "Jupiter",
            Body::Sun => "Sun",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    Sin,
    Cos,
}

/// One term of a vertical bob: `amplitude * shape(frequency * t)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    pub shape: WaveShape,
}

impl Wave {
    pub const fn sin(amplitude: f32, frequency: f32) -> Self {
        Self { amplitude, frequency, shape: WaveShape::Sin }
    }

    pub const fn cos(amplitude: f32, frequency: f32) -> Self {
        Self { amplitude, frequency, shape: WaveShape::Cos }
    }

    pub fn sample(&self, t: f32) -> f32 {
        let phase = t * self.frequency;
        match self.shape {
            WaveShape::Sin => self.amplitude * phase.sin(),
            WaveShape::Cos => self.amplitude * phase.cos(),
        }
    }
}

/// Fixed orbit parameters of a body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitParams {
    /// Body whose matrix this orbit is composed onto. `None` orbits the origin.
    #[serde(default)]
    pub parent: Option<Body>,
    pub radius: f32,
    /// Radians of rotation about +Y per unit of sim time.
    pub angular_speed: f32,
    /// Uniform scale, relative to the parent's matrix when `parent` is set.
    pub scale: f32,
    #[serde(default)]
    pub bob: Vec<Wave>,
}

impl OrbitParams {
    pub fn bob_height(&self, t: f32) -> f32 {
        self.bob.iter().map(|w| w.sample(t)).sum()
    }

    pub fn earth() -> Self {
        Self { parent: None, radius: 0.0, angular_speed: 0.0, scale: 3.0, bob: Vec::new() }
    }

    pub fn moon() -> Self {
        Self {
            parent: None,
            radius: 12.0,
            angular_speed: 0.8,
            scale: 1.0,
            bob: vec![Wave::sin(1.0, 0.7)],
        }
    }

    pub fn jupiter() -> Self {
        Self {
            parent: Some(Body::Moon),
            radius: 3.0,
            angular_speed: 1.5,
            scale: 0.33,
            bob: vec![Wave::sin(0.5, 0.6), Wave::sin(0.25, 1.2)],
        }
    }

    pub fn sun() -> Self {
        Self {
            parent: None,
            radius: 300.0,
            angular_speed: 0.005,
            scale: 2.0,
            bob: vec![Wave::sin(5.0, 0.3), Wave::cos(3.0, 0.15)],
        }
    }
}

/// A body's model matrix and the world position cached from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTransform {
    pub model: Mat4,
    pub position: Vec3,
}

impl BodyTransform {
    pub fn from_model(model: Mat4) -> Self {
        Self { model, position: model.w_axis.truncate() }
    }
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self::from_model(Mat4::IDENTITY)
    }
}

/// `parent * Ry(t * speed) * T(radius, bob(t), 0) * S(scale)`.
pub fn orbital_transform(parent: Mat4, sim_time: f32, params: &OrbitParams) -> BodyTransform {
    let model = parent
        * Mat4::from_rotation_y(sim_time * params.angular_speed)
        * Mat4::from_translation(Vec3::new(params.radius, params.bob_height(sim_time), 0.0))
        * Mat4::from_scale(Vec3::splat(params.scale));
    BodyTransform::from_model(model)
}

/// Self-rotation about the body's local +Y, applied on top of its orbit.
pub fn spin(model: Mat4, sim_time: f32, rate: f32) -> Mat4 {
    model * Mat4::from_rotation_y(sim_time * rate)
}

/// Orbit parameters for every body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitTable {
    pub earth: OrbitParams,
    pub moon: OrbitParams,
    pub jupiter: OrbitParams,
    pub sun: OrbitParams,
}

impl OrbitTable {
    pub fn get(&self, body: Body) -> &OrbitParams {
        match body {
            Body::Earth => &self.earth,
            Body::Moon => &self.moon,
            Body::Jupiter => &self.jupiter,
            Body::Sun => &self.sun,
        }
    }
}

impl Default for OrbitTable {
    fn default() -> Self {
        Self {
            earth: OrbitParams::earth(),
            moon: OrbitParams::moon(),
            jupiter: OrbitParams::jupiter(),
            sun: OrbitParams::sun(),
        }
    }
}

/// Current transforms of all bodies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyTransforms {
    earth: BodyTransform,
    moon: BodyTransform,
    jupiter: BodyTransform,
    sun: BodyTransform,
}

impl BodyTransforms {
    pub fn at(sim_time: f32, orbits: &OrbitTable) -> Self {
        let mut transforms = Self::default();
        transforms.update(sim_time, orbits);
        transforms
    }

    pub fn get(&self, body: Body) -> &BodyTransform {
        match body {
            Body::Earth => &self.earth,
            Body::Moon => &self.moon,
            Body::Jupiter => &self.jupiter,
            Body::Sun => &self.sun,
        }
    }

    fn slot(&mut self, body: Body) -> &mut BodyTransform {
        match body {
            Body::Earth => &mut self.earth,
            Body::Moon => &mut self.moon,
            Body::Jupiter => &mut self.jupiter,
            Body::Sun => &mut self.sun,
        }
    }

    /// Recompute every body for `sim_time`. Parents are always updated
    /// before their children, so a child never composes a stale matrix.
    pub fn update(&mut self, sim_time: f32, orbits: &OrbitTable) {
        for body in Body::UPDATE_ORDER {
            let params = orbits.get(body);
            let parent = params
                .parent
                .map_or(Mat4::IDENTITY, |p| self.get(p).model);
            *self.slot(body) = orbital_transform(parent, sim_time, params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_is_translation_column() {
        let orbits = OrbitTable::default();
        for t in [-40.0, -1.5, 0.0, 0.25, 3.0, 1234.5] {
            let transforms = BodyTransforms::at(t, &orbits);
            for body in Body::UPDATE_ORDER {
                let tr = transforms.get(body);
                assert_eq!(tr.position, tr.model.w_axis.truncate(), "{} at t={t}", body.name());
            }
        }
    }

    #[test]
    fn test_orbit_is_pure() {
        let params = OrbitParams::sun();
        for t in [0.0, 0.7, 19.3, -8.0] {
            let a = orbital_transform(Mat4::IDENTITY, t, &params);
            let b = orbital_transform(Mat4::IDENTITY, t, &params);
            assert_eq!(a.model.to_cols_array(), b.model.to_cols_array());
        }
    }

    #[test]
    fn test_moon_at_time_zero() {
        // No rotation and sin(0) = 0: the Moon sits on +X at its orbit radius.
        let moon = orbital_transform(Mat4::IDENTITY, 0.0, &OrbitParams::moon());
        assert_relative_eq!(moon.position.x, 12.0, epsilon = 1e-6);
        assert_relative_eq!(moon.position.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(moon.position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_moon_orbit_radius_is_constant() {
        let params = OrbitParams::moon();
        for t in [0.3, 1.0, 2.5, 10.0] {
            let p = orbital_transform(Mat4::IDENTITY, t, &params).position;
            let planar = (p.x * p.x + p.z * p.z).sqrt();
            assert_relative_eq!(planar, 12.0, epsilon = 1e-4);
            assert_relative_eq!(p.y, (0.7 * t).sin(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_earth_is_scaled_identity() {
        let earth = orbital_transform(Mat4::IDENTITY, 17.0, &OrbitParams::earth());
        assert!(earth.model.abs_diff_eq(Mat4::from_scale(Vec3::splat(3.0)), 1e-6));
        assert_eq!(earth.position, Vec3::ZERO);
    }

    #[test]
    fn test_child_uses_updated_parent() {
        let orbits = OrbitTable::default();
        for t in [0.0, 0.9, 4.2, -3.3] {
            let transforms = BodyTransforms::at(t, &orbits);
            let moon_now = orbital_transform(Mat4::IDENTITY, t, &orbits.moon);
            let expected = orbital_transform(moon_now.model, t, &orbits.jupiter);
            assert_eq!(transforms.get(Body::Jupiter), &expected);
        }
    }

    #[test]
    fn test_child_never_sees_stale_parent() {
        let orbits = OrbitTable::default();
        let mut transforms = BodyTransforms::at(1.0, &orbits);
        transforms.update(2.0, &orbits);

        let stale_parent = orbital_transform(Mat4::IDENTITY, 1.0, &orbits.moon).model;
        let stale = orbital_transform(stale_parent, 2.0, &orbits.jupiter);
        assert_ne!(transforms.get(Body::Jupiter), &stale);
        assert_eq!(transforms.get(Body::Jupiter), &BodyTransforms::at(2.0, &orbits).jupiter);
    }

    #[test]
    fn test_child_scale_is_relative() {
        let mut orbits = OrbitTable::default();
        orbits.moon.scale = 2.0;
        let transforms = BodyTransforms::at(0.0, &orbits);
        let x_axis_len = transforms.get(Body::Jupiter).model.x_axis.truncate().length();
        assert_relative_eq!(x_axis_len, 2.0 * 0.33, epsilon = 1e-5);
    }

    #[test]
    fn test_sun_bob_mixes_sin_and_cos() {
        let sun = OrbitParams::sun();
        assert_relative_eq!(sun.bob_height(0.0), 3.0, epsilon = 1e-6);
        let t = 2.0_f32;
        let expected = 5.0 * (0.3 * t).sin() + 3.0 * (0.15 * t).cos();
        assert_relative_eq!(sun.bob_height(t), expected, epsilon = 1e-5);
    }
}
