//! Light-space transform for the directional Sun shadow

use glam::{Mat4, Vec3};

/// Half-width of the orthographic shadow box, in world units.
pub const SHADOW_HALF_EXTENT: f32 = 30.0;
pub const SHADOW_NEAR: f32 = 0.1;
pub const SHADOW_FAR: f32 = 1000.0;

/// View and projection of the Sun looking at the scene origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSpace {
    pub view: Mat4,
    pub projection: Mat4,
    /// `projection * view`
    pub matrix: Mat4,
    /// Unit vector from the origin toward the Sun.
    pub direction: Vec3,
}

impl LightSpace {
    /// The Sun is treated as a directional light for shadowing, hence the
    /// orthographic projection.
    pub fn from_sun(sun_position: Vec3) -> Self {
        let view = Mat4::look_at_rh(sun_position, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::orthographic_rh(
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        );
        Self {
            view,
            projection,
            matrix: projection * view,
            direction: sun_position.normalize_or_zero(),
        }
    }
}

impl Default for LightSpace {
    fn default() -> Self {
        Self::from_sun(Vec3::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_projects_to_map_center() {
        let light = LightSpace::from_sun(Vec3::new(300.0, 4.0, 0.0));
        let clip = light.matrix * Vec3::ZERO.extend(1.0);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-4);
        // Depth is in [0, 1] and the origin is ~300 units from the Sun.
        let expected = (300.0_f32.hypot(4.0) - SHADOW_NEAR) / (SHADOW_FAR - SHADOW_NEAR);
        assert_relative_eq!(clip.z, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_closer_to_sun_is_shallower() {
        let sun = Vec3::new(300.0, 0.0, 0.0);
        let light = LightSpace::from_sun(sun);
        let near = light.matrix * Vec3::new(5.0, 0.0, 0.0).extend(1.0);
        let far = light.matrix * Vec3::new(-5.0, 0.0, 0.0).extend(1.0);
        assert!(near.z < far.z);
    }

    #[test]
    fn test_direction_is_normalized_sun_position() {
        let light = LightSpace::from_sun(Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(light.direction, Vec3::Z);
    }
}
