//! GPU rendering subsystem.
//!
//! One draw per frame: a full-target quad, shaded by the active program with
//! the loaded texture and the target resolution bound at `@group(0)`.
//!
//! Convention:
//! - Quad positions are clip space, texcoord v=0 is the top texture row.
//! - Textures and offscreen targets are `Rgba8Unorm`; bytes pass through untouched.

mod bindings;
mod quad;
mod renderer;
mod target;
mod texture;

pub use bindings::{FrameBindings, FrameUniforms};
pub use quad::{QuadMesh, QuadVertex, QUAD_VERTICES};
pub use renderer::Renderer;
pub use target::{OffscreenTarget, RenderTarget, OFFSCREEN_FORMAT};
pub use texture::{GpuTexture, TextureImage};
