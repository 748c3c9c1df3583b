use anyhow::{Context, Result};

use crate::device::Gpu;

use super::texture::check_texture_size;

/// Color format of offscreen targets (matches the texture upload format).
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Destination for one frame: a color view plus its size in pixels.
pub struct RenderTarget<'a> {
    pub color_view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

/// Texture-backed target that is never presented; its pixels are read back.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        check_texture_size(device, width, height)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadeview offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_target(&self) -> RenderTarget<'_> {
        RenderTarget {
            color_view: &self.view,
            format: OFFSCREEN_FORMAT,
            width: self.width,
            height: self.height,
        }
    }

    /// Copies the target into a mappable buffer and returns tightly packed RGBA8 rows.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_back(&self, gpu: &Gpu<'_>) -> Result<Vec<u8>> {
        let device = gpu.device();
        let unpadded = self.width * 4;
        let padded = padded_bytes_per_row(self.width);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadeview read-back buffer"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("shadeview read-back encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .context("failed to wait for the GPU")?;
        rx.recv()
            .context("read-back map callback was dropped")?
            .context("failed to map read-back buffer")?;

        let data = slice.get_mapped_range();
        let pixels = unpad_rows(&data, padded, unpadded, self.height);
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }
}

/// Row pitch rounded up to wgpu's copy alignment.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Drops the per-row padding a texture-to-buffer copy adds.
pub(crate) fn unpad_rows(data: &[u8], padded: u32, unpadded: u32, height: u32) -> Vec<u8> {
    if padded == unpadded {
        return data[..(unpadded * height) as usize].to_vec();
    }

    let mut out = Vec::with_capacity((unpadded * height) as usize);
    for row in data.chunks(padded as usize).take(height as usize) {
        out.extend_from_slice(&row[..unpadded as usize]);
    }
    out
}
