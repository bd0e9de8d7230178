//! Startup assets: meshes, textures and shader stages
//!
//! Everything is loaded once before the first frame and owned by
//! [`SceneAssets`]. Draw calls refer to assets by id.

pub mod mesh;
pub mod obj;
pub mod shader;
pub mod texture;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use mesh::GpuMesh;
pub use obj::{load_obj, parse_obj, MeshData};
pub use shader::StageModules;
pub use texture::{Texture, TextureKind};

use crate::slots::TextureUnit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshId {
    /// Earth and its cloud shell.
    HighDetail,
    /// Moon.
    MediumDetail,
    /// Jupiter and the Sun.
    LowDetail,
    /// Inside-out background sphere.
    SkyDome,
}

impl MeshId {
    pub const ALL: [MeshId; 4] = [
        MeshId::HighDetail,
        MeshId::MediumDetail,
        MeshId::LowDetail,
        MeshId::SkyDome,
    ];

    pub fn file(self) -> &'static str {
        match self {
            MeshId::HighDetail => "meshes/sphere_20k.obj",
            MeshId::MediumDetail => "meshes/sphere_5k.obj",
            MeshId::LowDetail => "meshes/sphere_2k.obj",
            MeshId::SkyDome => "meshes/sphere_80k.obj",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureId {
    EarthDay,
    EarthNight,
    EarthClouds,
    EarthSpecular,
    Moon,
    Jupiter,
    Stars,
}

impl TextureId {
    pub const ALL: [TextureId; 7] = [
        TextureId::EarthDay,
        TextureId::EarthNight,
        TextureId::EarthClouds,
        TextureId::EarthSpecular,
        TextureId::Moon,
        TextureId::Jupiter,
        TextureId::Stars,
    ];

    pub fn file(self) -> &'static str {
        match self {
            TextureId::EarthDay => "textures/2k_earth_daymap.jpg",
            TextureId::EarthNight => "textures/2k_earth_nightmap_alpha.png",
            TextureId::EarthClouds => "textures/2k_earth_clouds_alpha.png",
            TextureId::EarthSpecular => "textures/2k_earth_specular_map.png",
            TextureId::Moon => "textures/2k_moon.jpg",
            TextureId::Jupiter => "textures/2k_jupiter.jpg",
            TextureId::Stars => "textures/8k_stars_milky_way.jpg",
        }
    }

    pub fn kind(self) -> TextureKind {
        match self {
            TextureId::EarthNight | TextureId::EarthClouds | TextureId::EarthSpecular => {
                TextureKind::Mask
            }
            _ => TextureKind::Color,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A set of textures bound together for one kind of draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialId {
    Earth,
    Clouds,
    Moon,
    Jupiter,
    /// No sun texture ships with the assets; it is drawn unlit anyway.
    Sun,
    Sky,
}

impl MaterialId {
    pub const ALL: [MaterialId; 6] = [
        MaterialId::Earth,
        MaterialId::Clouds,
        MaterialId::Moon,
        MaterialId::Jupiter,
        MaterialId::Sun,
        MaterialId::Sky,
    ];

    /// Image textures per unit. The shadow unit is always the shadow
    /// target and unlisted units get a blank texture.
    pub fn textures(self) -> &'static [(TextureUnit, TextureId)] {
        match self {
            MaterialId::Earth => &[
                (TextureUnit::Albedo, TextureId::EarthDay),
                (TextureUnit::Night, TextureId::EarthNight),
                (TextureUnit::Specular, TextureId::EarthSpecular),
            ],
            MaterialId::Clouds => &[(TextureUnit::CloudAlpha, TextureId::EarthClouds)],
            MaterialId::Moon | MaterialId::Sun => &[(TextureUnit::Albedo, TextureId::Moon)],
            MaterialId::Jupiter => &[(TextureUnit::Albedo, TextureId::Jupiter)],
            MaterialId::Sky => &[(TextureUnit::Albedo, TextureId::Stars)],
        }
    }

    pub fn texture_for(self, unit: TextureUnit) -> Option<TextureId> {
        self.textures()
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, id)| *id)
    }
}

pub struct SceneAssets {
    meshes: Vec<GpuMesh>,
    textures: Vec<Texture>,
    /// Transparent black, bound to every unused unit.
    pub blank: Texture,
}

impl SceneAssets {
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, root: &Path) -> Result<Self> {
        let resolve = |file: &str| -> PathBuf { root.join(file) };

        let meshes = MeshId::ALL
            .iter()
            .map(|id| {
                let path = resolve(id.file());
                let data = load_obj(&path)?;
                Ok(GpuMesh::upload(device, id.file(), &data))
            })
            .collect::<Result<Vec<_>>>()
            .context("Failed to load scene meshes")?;

        let textures = TextureId::ALL
            .iter()
            .map(|id| {
                Texture::load(device, queue, &resolve(id.file()), id.kind())
                    .map_err(anyhow::Error::from)
            })
            .collect::<Result<Vec<_>>>()
            .context("Failed to load scene textures")?;

        let blank = Texture::solid(device, queue, "Blank Texture", [0, 0, 0, 0]);

        Ok(Self { meshes, textures, blank })
    }

    pub fn mesh(&self, id: MeshId) -> &GpuMesh {
        &self.meshes[id.index()]
    }

    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }
}
