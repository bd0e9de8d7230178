//! Image textures with CPU-built mip chains

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, RgbaImage};

use crate::error::{AssetError, AssetResult};

/// How a texture's texels are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    /// Albedo-like images, stored sRGB.
    Color,
    /// Masks and data (night lights, cloud alpha, specular), stored linear.
    Mask,
}

impl TextureKind {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Mask => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// `floor(log2(max(w, h))) + 1`
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Full mip chain down to 1x1, level 0 first.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height()) as usize;
    let mut chain = Vec::with_capacity(levels);
    chain.push(base);
    while chain.len() < levels {
        let prev = &chain[chain.len() - 1];
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, width, height, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

/// Convert to RGBA8 with the first row at the bottom, matching OBJ uv space.
pub fn to_texels(image: DynamicImage) -> RgbaImage {
    image.flipv().to_rgba8()
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        kind: TextureKind,
    ) -> AssetResult<Self> {
        let image = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let texels = to_texels(image);
        let (width, height) = texels.dimensions();
        let levels = mip_chain(texels);

        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("texture");
        tracing::info!(
            "Loaded {}: {}x{}, {} mip levels",
            path.display(),
            width,
            height,
            levels.len()
        );
        Ok(Self::from_levels(device, queue, label, &levels, kind.format()))
    }

    pub fn from_levels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        levels: &[RgbaImage],
        format: wgpu::TextureFormat,
    ) -> Self {
        let (width, height) = levels.first().map_or((1, 1), |l| l.dimensions());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len().max(1) as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            let (w, h) = level.dimensions();
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// 1x1 texture used to fill material slots a draw doesn't sample.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, rgba: [u8; 4]) -> Self {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_levels(device, queue, label, &[pixel], wgpu::TextureFormat::Rgba8Unorm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2048, 1024), 12);
        assert_eq!(mip_level_count(8192, 4096), 14);
        assert_eq!(mip_level_count(3, 5), 3);
    }

    #[test]
    fn test_mip_chain_halves_to_one() {
        let base = RgbaImage::from_pixel(8, 2, image::Rgba([10, 20, 30, 255]));
        let sizes: Vec<(u32, u32)> = mip_chain(base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, [(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn test_uniform_image_keeps_color_down_the_chain() {
        let base = RgbaImage::from_pixel(16, 16, image::Rgba([200, 100, 50, 255]));
        let last = mip_chain(base).pop().unwrap();
        assert_eq!(last.get_pixel(0, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_texels_are_flipped_vertically() {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let texels = to_texels(DynamicImage::ImageRgba8(img));
        assert_eq!(texels.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(texels.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_grayscale_expands_to_rgba() {
        let gray = image::GrayImage::from_pixel(2, 2, image::Luma([77]));
        let texels = to_texels(DynamicImage::ImageLuma8(gray));
        assert_eq!(texels.get_pixel(1, 1).0, [77, 77, 77, 255]);
    }
}
