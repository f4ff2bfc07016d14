//! Gamut engine crate.
//!
//! Shows a Display-P3 encoded image on a full-viewport quad, converted to
//! sRGB on the GPU. The renderer is written against the [`driver::Driver`]
//! seam; [`driver::WgpuDriver`] runs it on wgpu and [`window::Runtime`] hosts
//! it in a winit window.

pub mod assets;
pub mod color;
pub mod device;
pub mod driver;
pub mod gpu_util;
pub mod logging;
pub mod render;
pub mod window;
