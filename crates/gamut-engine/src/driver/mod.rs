//! GPU driver seam.
//!
//! [`Driver`] is the set of pipeline primitives the utility layer and the quad
//! renderer are written against: shader/program objects, name → location
//! lookup, textures, vertex buffers, viewport, a per-frame quad pass and an
//! error queue. [`WgpuDriver`] is the production implementation; tests use a
//! recording mock.
//!
//! Handles are associated types. "No object" is `None`, never a reserved
//! integer.

mod error;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod reflect;
mod wgpu_backend;

pub use error::{DriverError, ErrorCode};
pub use wgpu_backend::{WgpuBuffer, WgpuDriver, WgpuProgram, WgpuShader, WgpuTexture};

use crate::assets::Bitmap;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Blend factor subset used by the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// `result = src * src_factor + dst * dst_factor`, applied to all four channels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Straight alpha over: `(srcAlpha, 1 - srcAlpha)`.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    TriangleStrip,
}

/// Texture bound to a unit and the sampler uniform that reads it.
pub struct SamplerBinding<'a, D: Driver> {
    pub location: u32,
    pub unit: u32,
    pub texture: &'a D::Texture,
}

/// Float vertex attribute sourced from a tightly packed buffer.
pub struct VertexAttrib<'a, D: Driver> {
    pub location: u32,
    /// Floats per vertex (1..=4).
    pub components: u32,
    pub buffer: &'a D::Buffer,
}

/// Everything one frame of the quad renderer asks of the GPU.
///
/// A pass is self-contained: clear, blend and texture state it names apply to
/// this draw only, so nothing leaks into the next frame.
pub struct QuadPass<'a, D: Driver> {
    pub clear_color: [f32; 4],
    pub blend: Option<BlendFunc>,
    pub program: &'a D::Program,
    pub sampler: SamplerBinding<'a, D>,
    pub attributes: [VertexAttrib<'a, D>; 2],
    pub topology: Topology,
    pub vertex_count: u32,
}

/// GPU primitives used by [`crate::gpu_util`] and [`crate::render`].
///
/// All calls happen on the rendering thread; implementations need no locking.
pub trait Driver: Sized {
    type Shader;
    type Program;
    type Texture;
    type Buffer;

    /// Creates an empty shader object for `stage`.
    fn create_shader(&mut self, stage: ShaderStage) -> Option<Self::Shader>;
    /// Sets the source and compiles. Returns the compile status.
    fn compile_shader(&mut self, shader: &mut Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    fn create_program(&mut self) -> Option<Self::Program>;
    /// Attaches `shader`; the program owns it from here on.
    fn attach_shader(&mut self, program: &mut Self::Program, shader: Self::Shader);
    /// Links the attached stages. Returns the link status.
    fn link_program(&mut self, program: &mut Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    /// Deletes the program together with its attached shaders.
    fn delete_program(&mut self, program: Self::Program);
    /// Makes `program` current; `None` unbinds.
    fn use_program(&mut self, program: Option<&Self::Program>);

    /// Location of a vertex input of a linked program.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    /// Location of a uniform (resource) of a linked program.
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn enable_vertex_attrib_array(&mut self, location: u32);

    fn create_texture(&mut self) -> Option<Self::Texture>;
    /// Uploads `bitmap` as the complete base level of `texture`.
    fn tex_image_2d(&mut self, texture: &mut Self::Texture, bitmap: &Bitmap);
    fn tex_filters(&mut self, texture: &mut Self::Texture, min: FilterMode, mag: FilterMode);

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Option<Self::Buffer>;

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// Clears, draws and presents one frame.
    fn draw_quad(&mut self, pass: &QuadPass<'_, Self>);

    /// Pops the oldest pending error, if any.
    fn take_error(&mut self) -> Option<DriverError>;
}
