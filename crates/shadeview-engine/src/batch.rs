//! Batch mode: render one frame offscreen and write it to disk.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ViewerConfig;
use crate::device::{Gpu, GpuInit};
use crate::render::{OffscreenTarget, TextureImage};
use crate::viewer::ShaderViewer;

/// Applies the configured shader pair to `input` and saves the result to `output`.
///
/// The output has the input's dimensions. The encoding follows the extension
/// of `output`. No window is opened.
pub fn process_image(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ViewerConfig,
    gpu_init: GpuInit,
) -> Result<()> {
    let output = output.as_ref();

    let gpu = pollster::block_on(Gpu::headless(gpu_init))?;
    let mut viewer = ShaderViewer::new(gpu, config);

    let image = render_image(&mut viewer, input.as_ref())?;
    image.save(output)?;

    log::info!("processed image saved to {}", output.display());
    Ok(())
}

/// Loads shaders and `input`, renders once at the input's size and reads the frame back.
pub(crate) fn render_image(viewer: &mut ShaderViewer<'_>, input: &Path) -> Result<TextureImage> {
    // A failed load is logged by the manager; rendering then reports the missing program.
    viewer.load_shaders();
    viewer.load_texture(input)?;

    let (width, height) = viewer
        .renderer()
        .texture_size()
        .context("no texture is loaded")?;

    let target = OffscreenTarget::new(viewer.renderer().gpu().device(), width, height)?;
    viewer.render_offscreen(&target)?;
    let pixels = target.read_back(viewer.renderer().gpu())?;

    TextureImage::from_rgba8(width, height, pixels)
}
