//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the viewer.

mod runtime;

pub use runtime::Runtime;
