//! The viewer: a renderer plus the shader manager feeding it.

use std::path::Path;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::config::ViewerConfig;
use crate::device::Gpu;
use crate::render::{OffscreenTarget, Renderer};
use crate::shader::{ShaderManager, ShaderProgram};

/// Top-level object driven by both the interactive runtime and batch mode.
///
/// Construction loads nothing; callers decide when to load shaders and which
/// texture to show.
pub struct ShaderViewer<'w> {
    renderer: Renderer<'w>,
    shaders: ShaderManager<ShaderProgram>,
}

impl<'w> ShaderViewer<'w> {
    pub fn new(gpu: Gpu<'w>, config: &ViewerConfig) -> Self {
        Self {
            renderer: Renderer::new(gpu),
            shaders: ShaderManager::new(&config.vertex_shader, &config.fragment_shader),
        }
    }

    pub fn renderer(&self) -> &Renderer<'w> {
        &self.renderer
    }

    pub fn shaders(&self) -> &ShaderManager<ShaderProgram> {
        &self.shaders
    }

    /// Loads both shader files; on failure the previous program stays active.
    pub fn load_shaders(&mut self) -> bool {
        let compiler = self.renderer.compiler();
        self.shaders.load_shaders(&compiler)
    }

    /// Reloads the shaders if either file changed since the last good load.
    pub fn check_for_changes(&mut self) -> bool {
        let compiler = self.renderer.compiler();
        self.shaders.check_for_changes(&compiler)
    }

    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.renderer.load_texture(path)
    }

    /// Renders one frame to the window and presents it.
    ///
    /// Fails when no program has ever loaded successfully.
    pub fn render_frame(&mut self) -> Result<()> {
        self.renderer.render_to_window(self.shaders.program())
    }

    /// Renders one frame into `target`; the caller reads it back.
    pub fn render_offscreen(&self, target: &OffscreenTarget) -> Result<()> {
        self.renderer.render_offscreen(self.shaders.program(), target)
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.renderer.gpu_mut().resize(size);
    }
}
