//! Viewer configuration.
//!
//! All paths are resolved relative to the process working directory, which is
//! where shader authors are expected to keep their `shader.vert` / `shader.frag`.

use std::path::PathBuf;

/// Top-level viewer settings shared by the interactive and batch entry points.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,

    /// Logical window size in pixels.
    pub width: u32,
    pub height: u32,

    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,

    /// Texture loaded at startup in interactive mode.
    pub texture: PathBuf,

    /// Target frame rate of the interactive loop.
    pub frame_rate: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "shadeview".to_string(),
            width: 800,
            height: 600,
            vertex_shader: PathBuf::from("shader.vert"),
            fragment_shader: PathBuf::from("shader.frag"),
            texture: PathBuf::from("inputTexture0.jpg"),
            frame_rate: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_working_directory_layout() {
        let c = ViewerConfig::default();
        assert_eq!((c.width, c.height), (800, 600));
        assert_eq!(c.vertex_shader, PathBuf::from("shader.vert"));
        assert_eq!(c.fragment_shader, PathBuf::from("shader.frag"));
        assert_eq!(c.texture, PathBuf::from("inputTexture0.jpg"));
        assert_eq!(c.frame_rate, 60);
    }
}
