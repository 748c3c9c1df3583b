use anyhow::{bail, Result};

use crate::render::QuadVertex;

use super::{ProgramCompiler, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// A linked vertex + fragment pair: a render pipeline bound to the quad layout.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    format: wgpu::TextureFormat,
}

impl ShaderProgram {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Color format the pipeline was built for.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Builds [`ShaderProgram`]s on a device for one target format.
pub struct PipelineCompiler<'a> {
    pub device: &'a wgpu::Device,
    pub layout: &'a wgpu::PipelineLayout,
    pub format: wgpu::TextureFormat,
}

impl ProgramCompiler for PipelineCompiler<'_> {
    type Program = ShaderProgram;

    /// Device validation errors are captured and returned rather than
    /// reaching the uncaptured-error handler.
    fn compile(&self, vertex: &str, fragment: &str) -> Result<ShaderProgram> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadeview vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex.into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadeview fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment.into()),
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadeview quad pipeline"),
            layout: Some(self.layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            bail!("pipeline creation failed: {err}");
        }

        Ok(ShaderProgram {
            pipeline,
            format: self.format,
        })
    }
}
