//! Shader sources, validation and hot reload.
//!
//! The vertex and fragment stages live in two files on disk. They are always
//! validated, compiled and stamped together, so a running program never mixes
//! stage versions.
//!
//! Host contract (WGSL):
//! - vertex entry `vs_main`, inputs `@location(0)` in_vert and `@location(1)`
//!   in_texcoord, both `vec2<f32>`
//! - fragment entry `fs_main`, output `@location(0) vec4<f32>`
//! - `@group(0)`: `@binding(0)` inputTexture0 (`texture_2d<f32>`),
//!   `@binding(1)` its sampler, `@binding(2)` resolution (`var<uniform> vec2<f32>`)

#[cfg(test)]
pub(crate) mod fixtures;
mod manager;
mod program;
mod source;
mod validate;

pub use manager::{ProgramCompiler, ShaderManager};
pub use program::{PipelineCompiler, ShaderProgram};
pub use source::{ShaderRole, ShaderSource};
pub use validate::{
    validate_pair, validate_stage, FRAGMENT_ENTRY, RESOLUTION_BINDING, SAMPLER_BINDING,
    TEXTURE_BINDING, VERTEX_ENTRY,
};
