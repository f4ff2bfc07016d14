//! Full-viewport Display-P3 quad renderer.
//!
//! The vertex stage passes clip-space positions through; the fragment stage
//! samples the image and converts it to sRGB (see [`crate::color`] for the
//! CPU reference of the same math).
//!
//! Convention:
//! - positions are clip space, no transform.
//! - texcoords have their origin at the top-left of the image.

mod config;
pub mod geometry;
mod quad;

pub use config::{RendererConfig, DEFAULT_ASSET};
pub use quad::{QuadRenderer, RendererState, SetupError};

/// WGSL source of the pass-through vertex stage.
pub const VERTEX_SHADER: &str = include_str!("shaders/quad.vert.wgsl");

/// WGSL source of the Display-P3 → sRGB fragment stage.
pub const FRAGMENT_SHADER: &str = include_str!("shaders/p3_to_srgb.frag.wgsl");
