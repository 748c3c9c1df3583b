use std::path::Path;

use anyhow::{Context, Result};

/// Decoded RGBA8 pixels, tightly packed, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TextureImage {
    /// Decodes any format the `image` crate recognizes and converts to RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self {
            width,
            height,
            rgba: decoded.into_raw(),
        })
    }

    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(4))
            .context("invalid texture size")? as usize;
        anyhow::ensure!(
            rgba.len() == expected,
            "invalid rgba length: got {}, expected {expected}",
            rgba.len()
        );
        Ok(Self { width, height, rgba })
    }

    /// Encodes to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.rgba,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("failed to write image {}", path.display()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba.get(i..i + 4)?.try_into().ok()
    }
}

/// Texture uploaded to the GPU, with its linear-filtered sampler.
pub struct GpuTexture {
    pub width: u32,
    pub height: u32,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> Result<Self> {
        check_texture_size(device, image.width, image.height)?;

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadeview inputTexture0"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadeview inputTexture0 sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            width: image.width,
            height: image.height,
            texture,
            view,
            sampler,
        })
    }
}

/// Rejects sizes the device cannot allocate as a 2D texture.
pub(crate) fn check_texture_size(device: &wgpu::Device, width: u32, height: u32) -> Result<()> {
    let max = device.limits().max_texture_dimension_2d;
    anyhow::ensure!(width > 0 && height > 0, "texture size {width}x{height} is empty");
    anyhow::ensure!(
        width <= max && height <= max,
        "texture size {width}x{height} exceeds the device limit of {max}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{headless_gpu, ScratchDir};

    fn checker() -> TextureImage {
        #[rustfmt::skip]
        let rgba = vec![
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   255, 255, 255, 128,
        ];
        TextureImage::from_rgba8(2, 2, rgba).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        assert!(TextureImage::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureImage::from_rgba8(u32::MAX, u32::MAX, vec![]).is_err());
    }

    #[test]
    fn png_save_then_load_keeps_pixels() {
        let dir = ScratchDir::new("texture_png");
        let path = dir.path().join("checker.png");

        let img = checker();
        img.save(&path).unwrap();
        let loaded = TextureImage::load(&path).unwrap();

        assert_eq!(loaded, img);
        assert_eq!(loaded.pixel(1, 1), Some([255, 255, 255, 128]));
        assert_eq!(loaded.pixel(0, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn pixel_outside_image_is_none() {
        let img = checker();
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(0, 2), None);
        assert_eq!(img.pixel(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn upload_rejects_sizes_over_device_limit() {
        let Some(gpu) = headless_gpu() else { return };
        let max = gpu.device().limits().max_texture_dimension_2d;
        let wide = TextureImage::from_rgba8(max + 1, 1, vec![0; (max as usize + 1) * 4]).unwrap();

        let err = GpuTexture::upload(gpu.device(), gpu.queue(), &wide).err().unwrap();
        assert!(err.to_string().contains("exceeds the device limit"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = ScratchDir::new("texture_missing");
        let err = TextureImage::load(dir.path().join("nope.jpg")).unwrap_err();
        assert!(err.to_string().contains("failed to decode image"));
    }
}
