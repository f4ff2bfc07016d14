//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and maps their lifecycle onto the
//! quad renderer: every resume starts a new surface generation.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
