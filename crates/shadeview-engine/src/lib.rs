//! Shadeview engine crate.
//!
//! Shader hot-reload, the quad renderer, the interactive window loop and
//! batch image processing. The `shadeview` binary is a thin front end over it.

pub mod batch;
pub mod config;
pub mod device;
pub mod logging;
pub mod render;
pub mod shader;
pub mod time;
pub mod viewer;
pub mod window;

#[cfg(test)]
mod testing;
