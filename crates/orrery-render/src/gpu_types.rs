//! GPU-compatible data types

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use orrery_sim::LightSpace;

use crate::slots::RenderMode;

/// Interleaved mesh vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-draw uniform block. Field order and offsets must match
/// [`crate::slots::UNIFORM_FIELDS`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
    pub light_space: [[f32; 4]; 4],
    /// xyz: unit vector toward the Sun
    pub light_dir: [f32; 4],
    /// xyz: world-space eye position
    pub camera_pos: [f32; 4],
    pub render_mode: u32,
    pub is_earth: u32,
    pub _pad: [u32; 2],
}

/// `inverse(mat3(model))^T`, or identity for a singular model.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(model);
    if linear.determinant().abs() <= f32::EPSILON {
        return Mat3::IDENTITY;
    }
    linear.inverse().transpose()
}

fn padded_columns(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

impl DrawUniforms {
    pub fn new(mode: RenderMode, model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: padded_columns(normal_matrix(model)),
            light_space: Mat4::IDENTITY.to_cols_array_2d(),
            light_dir: [0.0; 4],
            camera_pos: [0.0, 0.0, 0.0, 1.0],
            render_mode: mode.id(),
            is_earth: 0,
            _pad: [0; 2],
        }
    }

    pub fn with_light_dir(mut self, direction: Vec3) -> Self {
        self.light_dir = direction.extend(0.0).to_array();
        self
    }

    /// Everything a lit fragment needs: light direction, shadow transform and eye.
    pub fn with_lighting(mut self, light: &LightSpace, camera_pos: Vec3, is_earth: bool) -> Self {
        self = self.with_light_dir(light.direction);
        self.light_space = light.matrix.to_cols_array_2d();
        self.camera_pos = camera_pos.extend(1.0).to_array();
        self.is_earth = u32::from(is_earth);
        self
    }

    pub fn mode(&self) -> Option<RenderMode> {
        RenderMode::from_id(self.render_mode)
    }
}
