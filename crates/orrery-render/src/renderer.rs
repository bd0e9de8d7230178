//! Main renderer: device bring-up and per-frame encoding

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use orrery_sim::SimulationState;
use winit::window::Window;

use crate::assets::{SceneAssets, StageModules};
use crate::diagnostics::{self, SurfaceAction};
use crate::draw::DrawCall;
use crate::frame::{FramePlan, PassKind, PassRecorder};
use crate::pipelines::{Materials, Pipelines, SCENE_DEPTH_FORMAT};
use crate::shadow::{ShadowTarget, DEFAULT_SHADOW_RESOLUTION};
use crate::slots::{MATERIAL_GROUP, UNIFORM_GROUP};
use crate::uniforms::UniformRing;

#[derive(Clone, Debug)]
pub struct RendererOptions {
    /// Directory holding `meshes/` and `textures/`.
    pub assets_dir: PathBuf,
    pub shadow_resolution: u32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("."),
            shadow_resolution: DEFAULT_SHADOW_RESOLUTION,
        }
    }
}

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SCENE_DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

pub struct Renderer {
    // WGPU state
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    // Scene resources
    assets: SceneAssets,
    shadow: ShadowTarget,
    pipelines: Pipelines,
    materials: Materials,
    uniforms: UniformRing,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, options: &RendererOptions) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("Failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter found"))?;

        let info = adapter.get_info();
        tracing::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Orrery Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("Failed to open GPU device")?;
        device.on_uncaptured_error(Box::new(diagnostics::log_uncaptured));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        tracing::info!("Configuring surface: {}x{}", config.width, config.height);
        surface.configure(&device, &config);

        let (depth_texture, depth_view) = create_depth_texture(&device, config.width, config.height);

        tracing::info!("Loading assets from {}", options.assets_dir.display());
        let assets = SceneAssets::load(&device, &queue, &options.assets_dir)?;
        let modules = StageModules::compile(&device).context("Failed to build scene shaders")?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        if options.shadow_resolution > max_dimension {
            tracing::warn!(
                "Shadow resolution {} exceeds device limit, using {max_dimension}",
                options.shadow_resolution
            );
        }
        let shadow = ShadowTarget::new(&device, options.shadow_resolution.clamp(1, max_dimension));

        let pipelines = Pipelines::new(&device, &modules, surface_format);
        let materials = Materials::new(&device, &pipelines.material_layout, &assets, &shadow);
        let uniforms = UniformRing::new(&device, &pipelines.uniform_layout);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            _depth_texture: depth_texture,
            depth_view,
            assets,
            shadow,
            pipelines,
            materials,
            uniforms,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            tracing::info!("Resizing to {}x{}", new_size.width, new_size.height);
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (depth_texture, depth_view) =
                create_depth_texture(&self.device, new_size.width, new_size.height);
            self._depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Encode and present one frame. Surface failures skip the frame.
    pub fn render(&mut self, state: &SimulationState) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                match diagnostics::surface_action(&err) {
                    SurfaceAction::Reconfigure => {
                        tracing::warn!("Surface {err}, reconfiguring");
                        self.surface.configure(&self.device, &self.config);
                    }
                    SurfaceAction::Skip => tracing::warn!("Skipping frame: {err}"),
                }
                return;
            }
        };
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let plan = FramePlan::build(state);
        self.uniforms.write(
            &self.device,
            &self.queue,
            &self.pipelines.uniform_layout,
            &plan.uniforms(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let mut recorder = GpuRecorder {
            encoder: &mut encoder,
            pass: None,
            target: &target,
            depth_view: &self.depth_view,
            shadow: &self.shadow,
            pipelines: &self.pipelines,
            materials: &self.materials,
            uniforms: &self.uniforms,
            assets: &self.assets,
        };
        plan.record(&mut recorder);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// Replays a [`FramePlan`] into a command encoder.
struct GpuRecorder<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
    target: &'a wgpu::TextureView,
    depth_view: &'a wgpu::TextureView,
    shadow: &'a ShadowTarget,
    pipelines: &'a Pipelines,
    materials: &'a Materials,
    uniforms: &'a UniformRing,
    assets: &'a SceneAssets,
}

impl GpuRecorder<'_> {
    fn begin_color_pass(&mut self) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Color Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

impl PassRecorder for GpuRecorder<'_> {
    fn begin(&mut self, pass: PassKind) {
        let render_pass = match pass {
            PassKind::Shadow => self.shadow.begin_pass(self.encoder).forget_lifetime(),
            PassKind::Color => self.begin_color_pass().forget_lifetime(),
        };
        self.pass = Some(render_pass);
    }

    fn draw(&mut self, slot: usize, call: &DrawCall) {
        let Some(pass) = self.pass.as_mut() else {
            debug_assert!(false, "draw '{}' recorded outside a pass", call.label);
            tracing::warn!("Dropping draw '{}' recorded outside a pass", call.label);
            return;
        };
        pass.set_pipeline(self.pipelines.get(call.pipeline));
        pass.set_bind_group(UNIFORM_GROUP, self.uniforms.bind_group(), &[self.uniforms.offset(slot)]);
        if let Some(material) = call.bound_material() {
            pass.set_bind_group(MATERIAL_GROUP, self.materials.get(material), &[]);
        }
        self.assets.mesh(call.mesh).draw(pass);
    }

    fn end(&mut self, _pass: PassKind) {
        // Dropping the pass ends it and releases the encoder.
        self.pass = None;
    }
}
