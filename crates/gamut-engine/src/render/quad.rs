use std::fmt;

use crate::assets::{load_bitmap, AssetError, AssetStore};
use crate::driver::{
    BlendFunc, Driver, DriverError, QuadPass, SamplerBinding, Topology, VertexAttrib,
};
use crate::gpu_util::{self, FloatBuffer};

use super::geometry::{
    POSITION_COMPONENTS, TEXCOORDS, TEXCOORD_COMPONENTS, VERTEX_COUNT, VERTICES,
};
use super::{RendererConfig, FRAGMENT_SHADER, VERTEX_SHADER};

const POSITION_ATTRIB: &str = "position";
const TEXCOORD_ATTRIB: &str = "texcoord";
const TEXTURE_UNIFORM: &str = "texture";
const TEXTURE_UNIT: u32 = 0;

/// Fatal failure while building a surface generation's GPU objects.
#[derive(Debug)]
pub enum SetupError {
    /// Compile or link failed; the driver log was already reported.
    Link,
    /// The driver error queue was not empty after `label`.
    Driver { label: &'static str, source: DriverError },
    MissingAttribute(&'static str),
    MissingUniform(&'static str),
    Asset(AssetError),
    TextureCreation,
    BufferCreation(&'static str),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Link => f.write_str("could not create program"),
            SetupError::Driver { label, source } => write!(f, "{label}: {source}"),
            SetupError::MissingAttribute(name) => {
                write!(f, "could not get attrib location for {name}")
            }
            SetupError::MissingUniform(name) => {
                write!(f, "could not get uniform location for {name}")
            }
            SetupError::Asset(e) => write!(f, "could not load image: {e}"),
            SetupError::TextureCreation => f.write_str("could not create texture"),
            SetupError::BufferCreation(name) => write!(f, "could not create {name} buffer"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Driver { source, .. } => Some(source),
            SetupError::Asset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AssetError> for SetupError {
    fn from(e: AssetError) -> Self {
        SetupError::Asset(e)
    }
}

/// Observable lifecycle state of the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererState {
    /// No surface generation has been set up yet.
    Uninitialized,
    Ready,
    /// The last setup aborted; only a new surface generation recovers.
    Failed,
}

/// GPU objects of one surface generation, swapped in only once complete.
struct Resources<D: Driver> {
    program: D::Program,
    position: u32,
    texcoord: u32,
    texture_uniform: u32,
    texture: D::Texture,
    position_buffer: D::Buffer,
    texcoord_buffer: D::Buffer,
}

/// Program locations resolved while the program is bound.
struct Locations {
    position: u32,
    texcoord: u32,
    texture_uniform: u32,
}

enum Slot<D: Driver> {
    Uninitialized,
    Ready(Resources<D>),
    Failed,
}

/// Draws one full-viewport quad textured with a Display-P3 image, converted
/// to sRGB in the fragment stage.
///
/// The host drives it with `on_surface_created` for every new GPU context,
/// `on_surface_resized` whenever the drawable changes size and
/// `on_draw_frame` once per frame.
pub struct QuadRenderer<D: Driver, A: AssetStore> {
    config: RendererConfig,
    assets: A,
    vertices: FloatBuffer,
    texcoords: FloatBuffer,
    slot: Slot<D>,
    generation: u64,
    viewport: Option<(u32, u32)>,
}

impl<D: Driver, A: AssetStore> QuadRenderer<D, A> {
    pub fn new(config: RendererConfig, assets: A) -> Self {
        Self {
            config,
            assets,
            vertices: gpu_util::build_buffer(&VERTICES),
            texcoords: gpu_util::build_buffer(&TEXCOORDS),
            slot: Slot::Uninitialized,
            generation: 0,
            viewport: None,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn state(&self) -> RendererState {
        match self.slot {
            Slot::Uninitialized => RendererState::Uninitialized,
            Slot::Ready(_) => RendererState::Ready,
            Slot::Failed => RendererState::Failed,
        }
    }

    /// Number of surface generations started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last size passed to [`Self::on_surface_resized`].
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    /// Builds every GPU object for a new surface generation.
    ///
    /// Objects of the previous generation belong to a context that is gone;
    /// they are dropped without driver calls.
    pub fn on_surface_created(&mut self, driver: &mut D) -> Result<(), SetupError> {
        self.generation += 1;
        self.slot = Slot::Uninitialized;
        log::info!("surface generation {} created", self.generation);

        match self.setup(driver) {
            Ok(resources) => {
                self.slot = Slot::Ready(resources);
                log::info!("renderer ready (generation {})", self.generation);
                Ok(())
            }
            Err(e) => {
                self.slot = Slot::Failed;
                log::error!("renderer setup failed: {e}");
                Err(e)
            }
        }
    }

    /// Sets the viewport to cover `width` × `height`. Valid in every state.
    pub fn on_surface_resized(&mut self, driver: &mut D, width: u32, height: u32) {
        log::debug!("viewport {width}x{height}");
        driver.viewport(0, 0, width, height);
        self.viewport = Some((width, height));
    }

    /// Draws one frame. Does nothing unless the renderer is ready; driver
    /// errors raised while drawing are logged, not returned.
    pub fn on_draw_frame(&mut self, driver: &mut D) {
        let Slot::Ready(res) = &self.slot else {
            log::trace!("draw skipped: renderer not ready");
            return;
        };

        let pass = QuadPass {
            clear_color: self.config.clear_color,
            blend: Some(BlendFunc::ALPHA),
            program: &res.program,
            sampler: SamplerBinding {
                location: res.texture_uniform,
                unit: TEXTURE_UNIT,
                texture: &res.texture,
            },
            attributes: [
                VertexAttrib {
                    location: res.texcoord,
                    components: TEXCOORD_COMPONENTS,
                    buffer: &res.texcoord_buffer,
                },
                VertexAttrib {
                    location: res.position,
                    components: POSITION_COMPONENTS,
                    buffer: &res.position_buffer,
                },
            ],
            topology: Topology::TriangleStrip,
            vertex_count: VERTEX_COUNT,
        };
        driver.draw_quad(&pass);

        while let Some(err) = driver.take_error() {
            log::warn!("draw: {err}");
        }
    }

    fn setup(&self, driver: &mut D) -> Result<Resources<D>, SetupError> {
        let program =
            gpu_util::link_program(driver, VERTEX_SHADER, FRAGMENT_SHADER).ok_or(SetupError::Link)?;

        match self.bind(driver, &program) {
            Ok((locations, texture, position_buffer, texcoord_buffer)) => Ok(Resources {
                program,
                position: locations.position,
                texcoord: locations.texcoord,
                texture_uniform: locations.texture_uniform,
                texture,
                position_buffer,
                texcoord_buffer,
            }),
            Err(e) => {
                driver.use_program(None);
                driver.delete_program(program);
                Err(e)
            }
        }
    }

    /// Setup steps that run with `program` bound.
    fn bind(
        &self,
        driver: &mut D,
        program: &D::Program,
    ) -> Result<(Locations, D::Texture, D::Buffer, D::Buffer), SetupError> {
        driver.use_program(Some(program));
        gpu_util::check_error(driver, "use_program")
            .map_err(|source| SetupError::Driver { label: "use_program", source })?;

        let position = driver
            .attrib_location(program, POSITION_ATTRIB)
            .ok_or(SetupError::MissingAttribute(POSITION_ATTRIB))?;
        let texcoord = driver
            .attrib_location(program, TEXCOORD_ATTRIB)
            .ok_or(SetupError::MissingAttribute(TEXCOORD_ATTRIB))?;
        driver.enable_vertex_attrib_array(position);
        driver.enable_vertex_attrib_array(texcoord);

        let texture_uniform = driver
            .uniform_location(program, TEXTURE_UNIFORM)
            .ok_or(SetupError::MissingUniform(TEXTURE_UNIFORM))?;

        let bitmap = load_bitmap(&self.assets, &self.config.asset_name)?;
        let texture = gpu_util::upload_texture(
            driver,
            &bitmap,
            self.config.min_filter,
            self.config.mag_filter,
        )
        .ok_or(SetupError::TextureCreation)?;
        drop(bitmap);
        gpu_util::check_error(driver, "upload_texture")
            .map_err(|source| SetupError::Driver { label: "upload_texture", source })?;

        let position_buffer = driver
            .create_vertex_buffer(self.vertices.as_slice())
            .ok_or(SetupError::BufferCreation(POSITION_ATTRIB))?;
        let texcoord_buffer = driver
            .create_vertex_buffer(self.texcoords.as_slice())
            .ok_or(SetupError::BufferCreation(TEXCOORD_ATTRIB))?;

        let locations = Locations { position, texcoord, texture_uniform };
        Ok((locations, texture, position_buffer, texcoord_buffer))
    }
}
