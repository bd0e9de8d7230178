//! Binding contract between the WGSL stages and the draw routines
//!
//! Every slot number, uniform field and render-mode id lives here. The WGSL
//! declarations are generated from these tables and prepended to the stage
//! sources, so the shaders and the Rust side cannot disagree.

use std::fmt::Write;

pub const UNIFORM_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;

pub const MATERIAL_GROUP: u32 = 1;
pub const LINEAR_SAMPLER_BINDING: u32 = 0;
pub const SHADOW_SAMPLER_BINDING: u32 = 1;
const TEXTURE_BINDING_BASE: u32 = 2;

/// Selects the fragment behaviour for one draw.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Unlit = 0,
    Sky = 1,
    Lit = 2,
    Shadow = 3,
    Clouds = 4,
    LitMoon = 5,
}

impl RenderMode {
    pub const ALL: [RenderMode; 6] = [
        RenderMode::Unlit,
        RenderMode::Sky,
        RenderMode::Lit,
        RenderMode::Shadow,
        RenderMode::Clouds,
        RenderMode::LitMoon,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.id() == id)
    }

    /// Modes that sample the shadow map.
    pub fn is_lit(self) -> bool {
        matches!(self, RenderMode::Lit | RenderMode::LitMoon)
    }

    fn wgsl_name(self) -> &'static str {
        match self {
            RenderMode::Unlit => "MODE_UNLIT",
            RenderMode::Sky => "MODE_SKY",
            RenderMode::Lit => "MODE_LIT",
            RenderMode::Shadow => "MODE_SHADOW",
            RenderMode::Clouds => "MODE_CLOUDS",
            RenderMode::LitMoon => "MODE_LIT_MOON",
        }
    }
}

/// Texture units of the material bind group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureUnit {
    Albedo = 0,
    Shadow = 1,
    Night = 2,
    CloudAlpha = 3,
    Specular = 4,
}

impl TextureUnit {
    pub const ALL: [TextureUnit; 5] = [
        TextureUnit::Albedo,
        TextureUnit::Shadow,
        TextureUnit::Night,
        TextureUnit::CloudAlpha,
        TextureUnit::Specular,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn binding(self) -> u32 {
        TEXTURE_BINDING_BASE + self.index()
    }

    /// The shadow map holds raw R32Float depth and can't be filtered.
    pub fn is_filterable(self) -> bool {
        self != TextureUnit::Shadow
    }

    fn wgsl_name(self) -> &'static str {
        match self {
            TextureUnit::Albedo => "t_albedo",
            TextureUnit::Shadow => "t_shadow",
            TextureUnit::Night => "t_night",
            TextureUnit::CloudAlpha => "t_clouds",
            TextureUnit::Specular => "t_specular",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// One member of the per-draw uniform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub wgsl_type: &'static str,
    pub offset: usize,
    pub size: usize,
}

const fn field(
    name: &'static str,
    wgsl_type: &'static str,
    offset: usize,
    size: usize,
) -> UniformField {
    UniformField { name, wgsl_type, offset, size }
}

/// Layout of `DrawUniforms`, in declaration order.
pub const UNIFORM_FIELDS: [UniformField; 10] = [
    field("model", "mat4x4<f32>", 0, 64),
    field("view", "mat4x4<f32>", 64, 64),
    field("projection", "mat4x4<f32>", 128, 64),
    // Three vec3 columns, each padded to 16 bytes.
    field("normal_matrix", "mat3x3<f32>", 192, 48),
    field("light_space", "mat4x4<f32>", 240, 64),
    field("light_dir", "vec4<f32>", 304, 16),
    field("camera_pos", "vec4<f32>", 320, 16),
    field("render_mode", "u32", 336, 4),
    field("is_earth", "u32", 340, 4),
    field("_pad", "vec2<u32>", 344, 8),
];

pub const UNIFORM_BLOCK_SIZE: usize = 352;

/// WGSL declarations shared by both stages, plus the material bindings for
/// the fragment stage.
pub fn wgsl_prelude(stage: ShaderStage) -> String {
    let mut out = String::new();

    for mode in RenderMode::ALL {
        let _ = writeln!(out, "const {}: u32 = {}u;", mode.wgsl_name(), mode.id());
    }
    out.push('\n');

    out.push_str("struct DrawUniforms {\n");
    for f in UNIFORM_FIELDS {
        let _ = writeln!(out, "    {}: {},", f.name, f.wgsl_type);
    }
    out.push_str("};\n\n");
    let _ = writeln!(
        out,
        "@group({UNIFORM_GROUP}) @binding({UNIFORM_BINDING}) var<uniform> draw: DrawUniforms;"
    );

    if stage == ShaderStage::Fragment {
        let _ = writeln!(
            out,
            "@group({MATERIAL_GROUP}) @binding({LINEAR_SAMPLER_BINDING}) var s_linear: sampler;"
        );
        let _ = writeln!(
            out,
            "@group({MATERIAL_GROUP}) @binding({SHADOW_SAMPLER_BINDING}) var s_shadow: sampler;"
        );
        for unit in TextureUnit::ALL {
            let _ = writeln!(
                out,
                "@group({MATERIAL_GROUP}) @binding({}) var {}: texture_2d<f32>;",
                unit.binding(),
                unit.wgsl_name()
            );
        }
    }
    out.push('\n');
    out
}
