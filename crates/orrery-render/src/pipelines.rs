//! Render pipelines and bind group layouts
//!
//! Blend, depth and cull state is baked into one pipeline per
//! [`PipelineKind`], so no fixed-function state carries over between draws.

use std::mem::size_of;

use crate::assets::shader::{FS_ENTRY, FS_SHADOW_ENTRY, VS_ENTRY};
use crate::assets::{MaterialId, SceneAssets, StageModules};
use crate::gpu_types::{DrawUniforms, Vertex};
use crate::shadow::{ShadowTarget, SHADOW_COLOR_FORMAT, SHADOW_DEPTH_FORMAT};
use crate::slots::{
    TextureUnit, LINEAR_SAMPLER_BINDING, SHADOW_SAMPLER_BINDING, UNIFORM_BINDING,
};

pub const SCENE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Light-space depth into the shadow target.
    Shadow,
    Opaque,
    /// Background: no culling, no depth writes.
    Sky,
    /// Alpha blended over what is already drawn, no depth writes.
    Translucent,
}

/// Fixed-function state of a pipeline kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedFunction {
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
    pub blend: Option<wgpu::BlendState>,
    pub uses_materials: bool,
}

const SRC_ALPHA_OVER: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::SrcAlpha,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

impl PipelineKind {
    pub const ALL: [PipelineKind; 4] = [
        PipelineKind::Shadow,
        PipelineKind::Opaque,
        PipelineKind::Sky,
        PipelineKind::Translucent,
    ];

    pub fn fixed_function(self) -> FixedFunction {
        match self {
            PipelineKind::Shadow => FixedFunction {
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                blend: None,
                uses_materials: false,
            },
            PipelineKind::Opaque => FixedFunction {
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                blend: None,
                uses_materials: true,
            },
            PipelineKind::Sky => FixedFunction {
                cull_mode: None,
                depth_write: false,
                blend: None,
                uses_materials: true,
            },
            PipelineKind::Translucent => FixedFunction {
                cull_mode: Some(wgpu::Face::Back),
                depth_write: false,
                blend: Some(wgpu::BlendState {
                    color: SRC_ALPHA_OVER,
                    alpha: SRC_ALPHA_OVER,
                }),
                uses_materials: true,
            },
        }
    }

    fn label(self) -> &'static str {
        match self {
            PipelineKind::Shadow => "Shadow Pipeline",
            PipelineKind::Opaque => "Opaque Pipeline",
            PipelineKind::Sky => "Sky Pipeline",
            PipelineKind::Translucent => "Translucent Pipeline",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub struct Pipelines {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
    pipelines: Vec<wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        modules: &StageModules,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: UNIFORM_BINDING,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let mut material_entries = vec![
            wgpu::BindGroupLayoutEntry {
                binding: LINEAR_SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SHADOW_SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ];
        material_entries.extend(TextureUnit::ALL.iter().map(|unit| wgpu::BindGroupLayoutEntry {
            binding: unit.binding(),
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: unit.is_filterable(),
                },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &material_entries,
        });

        // The shadow pipeline has no material group, so the shadow target is
        // never bound while it is being written.
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipelines = PipelineKind::ALL
            .iter()
            .map(|kind| {
                let state = kind.fixed_function();
                let (layout, entry_point, format) = match kind {
                    PipelineKind::Shadow => (&shadow_layout, FS_SHADOW_ENTRY, SHADOW_COLOR_FORMAT),
                    _ => (&scene_layout, FS_ENTRY, surface_format),
                };
                let depth_format = match kind {
                    PipelineKind::Shadow => SHADOW_DEPTH_FORMAT,
                    _ => SCENE_DEPTH_FORMAT,
                };

                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(kind.label()),
                    layout: Some(layout),
                    vertex: wgpu::VertexState {
                        module: &modules.vertex,
                        entry_point: Some(VS_ENTRY),
                        buffers: &[Vertex::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &modules.fragment,
                        entry_point: Some(entry_point),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: state.blend,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: state.cull_mode,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: depth_format,
                        depth_write_enabled: state.depth_write,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            })
            .collect();

        Self {
            uniform_layout,
            material_layout,
            pipelines,
        }
    }

    pub fn get(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        &self.pipelines[kind.index()]
    }
}

/// One bind group per material: samplers, the shadow map and the
/// material's textures, with the blank texture in every unused unit.
pub struct Materials {
    _linear_sampler: wgpu::Sampler,
    _shadow_sampler: wgpu::Sampler,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl Materials {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        assets: &SceneAssets,
        shadow: &ShadowTarget,
    ) -> Self {
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_groups = MaterialId::ALL
            .iter()
            .map(|material| {
                let mut entries = vec![
                    wgpu::BindGroupEntry {
                        binding: LINEAR_SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(&linear_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: SHADOW_SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                    },
                ];
                entries.extend(TextureUnit::ALL.iter().map(|unit| {
                    let view = match (unit, material.texture_for(*unit)) {
                        (TextureUnit::Shadow, _) => &shadow.color_view,
                        (_, Some(id)) => &assets.texture(id).view,
                        (_, None) => &assets.blank.view,
                    };
                    wgpu::BindGroupEntry {
                        binding: unit.binding(),
                        resource: wgpu::BindingResource::TextureView(view),
                    }
                }));

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{material:?} Material")),
                    layout,
                    entries: &entries,
                })
            })
            .collect();

        Self {
            _linear_sampler: linear_sampler,
            _shadow_sampler: shadow_sampler,
            bind_groups,
        }
    }

    pub fn get(&self, material: MaterialId) -> &wgpu::BindGroup {
        &self.bind_groups[material as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sky_has_no_culling_or_depth_writes() {
        let sky = PipelineKind::Sky.fixed_function();
        assert_eq!(sky.cull_mode, None);
        assert!(!sky.depth_write);
        assert!(sky.blend.is_none());
    }

    #[test]
    fn test_translucent_blends_color_and_alpha_alike() {
        let clouds = PipelineKind::Translucent.fixed_function();
        let blend = clouds.blend.unwrap();
        assert_eq!(blend.color, blend.alpha);
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert!(!clouds.depth_write);
    }

    #[test]
    fn test_only_shadow_pipeline_skips_materials() {
        for kind in PipelineKind::ALL {
            assert_eq!(kind.fixed_function().uses_materials, kind != PipelineKind::Shadow);
        }
    }

    #[test]
    fn test_opaque_kinds_write_depth() {
        assert!(PipelineKind::Opaque.fixed_function().depth_write);
        assert!(PipelineKind::Shadow.fixed_function().depth_write);
    }
}
