//! Time subsystem.
//!
//! Provides testable frame pacing without coupling to the runtime.
//! Intended usage:
//! - one `FramePacer` per render loop
//! - wait until `deadline()`, render, then call `tick()`

mod frame_pacer;

pub use frame_pacer::FramePacer;
