//! Stateless helpers over a [`Driver`](crate::driver::Driver).
//!
//! Every call is independent; ownership of created objects passes to the
//! caller through the returned handle. Failures are logged here and surfaced
//! as `None` or `Err`, never as a panic.

mod buffer;
mod error;
mod program;
mod texture;

pub use buffer::{build_buffer, FloatBuffer};
pub use error::check_error;
pub use program::{compile_shader, link_program};
pub use texture::upload_texture;
