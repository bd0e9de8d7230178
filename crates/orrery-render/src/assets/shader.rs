//! Separately compiled vertex and fragment stages

use crate::error::{AssetError, AssetResult};
use crate::slots::{self, ShaderStage};

const SCENE_VS: &str = include_str!("../shaders/scene_vs.wgsl");
const SCENE_FS: &str = include_str!("../shaders/scene_fs.wgsl");

pub const VS_ENTRY: &str = "vs_main";
pub const FS_ENTRY: &str = "fs_main";
pub const FS_SHADOW_ENTRY: &str = "fs_shadow";

/// Full WGSL source of a stage: generated bindings followed by the body.
pub fn stage_source(stage: ShaderStage) -> String {
    let body = match stage {
        ShaderStage::Vertex => SCENE_VS,
        ShaderStage::Fragment => SCENE_FS,
    };
    let mut source = slots::wgsl_prelude(stage);
    source.push_str(body);
    source
}

/// Compile one stage, turning validation failures into an error instead of
/// letting them reach the uncaptured-error handler.
pub fn compile_stage(device: &wgpu::Device, stage: ShaderStage) -> AssetResult<wgpu::ShaderModule> {
    let source = stage_source(stage);

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "Scene Vertex Stage",
            ShaderStage::Fragment => "Scene Fragment Stage",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(AssetError::Shader {
            stage: stage.name(),
            message: err.to_string(),
        });
    }

    tracing::info!("Compiled {} stage", stage.name());
    Ok(module)
}

/// The two stage modules every pipeline is assembled from.
pub struct StageModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl StageModules {
    pub fn compile(device: &wgpu::Device) -> AssetResult<Self> {
        Ok(Self {
            vertex: compile_stage(device, ShaderStage::Vertex)?,
            fragment: compile_stage(device, ShaderStage::Fragment)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_define_entry_points() {
        let vs = stage_source(ShaderStage::Vertex);
        assert!(vs.contains(&format!("fn {VS_ENTRY}(")));

        let fs = stage_source(ShaderStage::Fragment);
        assert!(fs.contains(&format!("fn {FS_ENTRY}(")));
        assert!(fs.contains(&format!("fn {FS_SHADOW_ENTRY}(")));
    }

    #[test]
    fn test_prelude_comes_first() {
        let fs = stage_source(ShaderStage::Fragment);
        let decl = fs.find("struct DrawUniforms").unwrap();
        let first_use = fs.find("draw.render_mode").unwrap();
        assert!(decl < first_use);
    }
}
