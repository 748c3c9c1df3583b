use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::shader::{PipelineCompiler, ShaderProgram};

use super::{
    FrameBindings, FrameUniforms, GpuTexture, OffscreenTarget, QuadMesh, RenderTarget,
    TextureImage, OFFSCREEN_FORMAT,
};

/// Owns the GPU context, the quad, the current texture and the frame bindings.
///
/// The program is not owned here; callers pass the active one per frame.
pub struct Renderer<'w> {
    gpu: Gpu<'w>,

    /// Format programs are built for: the surface format, or
    /// [`OFFSCREEN_FORMAT`] for headless contexts.
    target_format: wgpu::TextureFormat,

    quad: QuadMesh,
    bindings: FrameBindings,
    texture: Option<BoundTexture>,
}

struct BoundTexture {
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

impl<'w> Renderer<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let target_format = gpu
            .surface()
            .map_or(OFFSCREEN_FORMAT, |surface| surface.format());
        let quad = QuadMesh::new(gpu.device());
        let bindings = FrameBindings::new(gpu.device());

        Self {
            gpu,
            target_format,
            quad,
            bindings,
            texture: None,
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu<'w> {
        &mut self.gpu
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Compiler that builds programs against this renderer's layout and format.
    pub fn compiler(&self) -> PipelineCompiler<'_> {
        PipelineCompiler {
            device: self.gpu.device(),
            layout: self.bindings.pipeline_layout(),
            format: self.target_format,
        }
    }

    /// Decodes `path` and makes it the active texture, replacing any previous one.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = TextureImage::load(path)?;
        self.set_texture(&image)
            .with_context(|| format!("failed to upload texture {}", path.display()))?;
        log::debug!("loaded texture {} ({}x{})", path.display(), image.width(), image.height());
        Ok(())
    }

    /// Uploads `image` as the active texture. On failure the previous texture stays bound.
    pub fn set_texture(&mut self, image: &TextureImage) -> Result<()> {
        let texture = GpuTexture::upload(self.gpu.device(), self.gpu.queue(), image)?;
        let bind_group = self.bindings.bind_group(self.gpu.device(), &texture);
        self.texture = Some(BoundTexture {
            texture,
            bind_group,
        });
        Ok(())
    }

    /// Size of the active texture.
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        self.texture
            .as_ref()
            .map(|t| (t.texture.width, t.texture.height))
    }

    /// Draws one frame into the window surface and presents it.
    ///
    /// Transient surface errors skip the frame; a fatal one is returned.
    pub fn render_to_window(&mut self, program: Option<&ShaderProgram>) -> Result<()> {
        let device = self.gpu.device();
        let surface = self
            .gpu
            .surface()
            .context("renderer has no window surface")?;
        let (width, height) = surface.configured_size();

        let mut frame = match surface.begin_frame(device) {
            Ok(f) => f,
            Err(err) => {
                let message = err.to_string();
                if self.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    bail!("surface error: {message}");
                }
                log::debug!("skipping frame after surface error: {message}");
                return Ok(());
            }
        };

        let target = RenderTarget {
            color_view: &frame.view,
            format: self.target_format,
            width,
            height,
        };
        self.encode_frame(program, &mut frame.encoder, &target)?;

        self.gpu.submit(frame);
        Ok(())
    }

    /// Draws one frame into `target` and submits it. Nothing is presented.
    pub fn render_offscreen(
        &self,
        program: Option<&ShaderProgram>,
        target: &OffscreenTarget,
    ) -> Result<()> {
        let mut encoder =
            self.gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("shadeview offscreen encoder"),
                });

        self.encode_frame(program, &mut encoder, &target.as_target())?;

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Clear to opaque black, bind texture + uniforms, draw the quad strip.
    fn encode_frame(
        &self,
        program: Option<&ShaderProgram>,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget<'_>,
    ) -> Result<()> {
        let program = program.context("no shader program is active")?;
        let texture = self.texture.as_ref().context("no texture is loaded")?;
        anyhow::ensure!(
            program.format() == target.format,
            "program was built for {:?} but the target is {:?}",
            program.format(),
            target.format
        );

        self.bindings.write_uniforms(
            self.gpu.queue(),
            &FrameUniforms::for_target(target.width, target.height),
        );

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadeview quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(program.pipeline());
        rpass.set_bind_group(0, &texture.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad.vertex_buffer().slice(..));
        rpass.draw(0..self.quad.vertex_count(), 0..1);

        Ok(())
    }
}
