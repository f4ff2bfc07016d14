//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) with a non-sRGB view
//! - acquiring frames and providing encoders/views for rendering
//!
//! One `Gpu` lives for exactly one surface generation.

mod error;
mod frame;
mod gpu;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, GpuInit};
