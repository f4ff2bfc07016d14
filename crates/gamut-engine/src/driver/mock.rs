//! Recording driver for tests: counts live objects, records state changes
//! and can be told to fail at specific steps.

use std::collections::{BTreeSet, VecDeque};

use super::{
    BlendFunc, Driver, DriverError, ErrorCode, FilterMode, QuadPass, ShaderStage, Topology,
};
use crate::assets::Bitmap;

#[derive(Debug)]
pub(crate) struct MockShader {
    pub id: u32,
    pub stage: ShaderStage,
    compiled: bool,
}

#[derive(Debug)]
pub(crate) struct MockProgram {
    pub id: u32,
    shaders: Vec<MockShader>,
    linked: bool,
}

#[derive(Debug)]
pub(crate) struct MockTexture {
    pub id: u32,
    pub size: Option<(u32, u32)>,
    pub filters: Option<(FilterMode, FilterMode)>,
}

#[derive(Debug)]
pub(crate) struct MockBuffer {
    pub id: u32,
    pub len: usize,
}

/// Snapshot of one `draw_quad` call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawRecord {
    pub clear_color: [f32; 4],
    pub blend: Option<BlendFunc>,
    pub program: u32,
    pub texture: u32,
    pub sampler_location: u32,
    pub unit: u32,
    /// `(location, components, buffer id)` in binding order.
    pub attributes: Vec<(u32, u32, u32)>,
    /// Float count of each attribute's buffer.
    pub buffer_lens: Vec<usize>,
    pub topology: Topology,
    pub vertex_count: u32,
}

#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    next_id: u32,

    pub live_shaders: BTreeSet<u32>,
    pub live_programs: BTreeSet<u32>,
    pub textures_created: u32,
    pub bound_program: Option<u32>,
    pub enabled_attribs: Vec<u32>,
    pub viewports: Vec<(i32, i32, u32, u32)>,
    pub draws: Vec<DrawRecord>,
    pub errors: VecDeque<DriverError>,

    // Failure knobs.
    pub fail_compile: Option<ShaderStage>,
    pub fail_link: bool,
    pub fail_create_program: bool,
    pub fail_create_texture: bool,
    /// `tex_image_2d` queues `InvalidValue` and leaves the texture empty.
    pub reject_tex_image: bool,
    pub missing_names: Vec<&'static str>,
    pub error_on_use_program: Option<ErrorCode>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl Driver for MockDriver {
    type Shader = MockShader;
    type Program = MockProgram;
    type Texture = MockTexture;
    type Buffer = MockBuffer;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<MockShader> {
        let id = self.id();
        self.live_shaders.insert(id);
        Some(MockShader { id, stage, compiled: false })
    }

    fn compile_shader(&mut self, shader: &mut MockShader, source: &str) -> bool {
        shader.compiled = self.fail_compile != Some(shader.stage) && !source.trim().is_empty();
        shader.compiled
    }

    fn shader_info_log(&self, shader: &MockShader) -> String {
        if shader.compiled {
            String::new()
        } else {
            format!("mock: {} stage rejected", shader.stage)
        }
    }

    fn delete_shader(&mut self, shader: MockShader) {
        self.live_shaders.remove(&shader.id);
    }

    fn create_program(&mut self) -> Option<MockProgram> {
        if self.fail_create_program {
            return None;
        }
        let id = self.id();
        self.live_programs.insert(id);
        Some(MockProgram { id, shaders: Vec::new(), linked: false })
    }

    fn attach_shader(&mut self, program: &mut MockProgram, shader: MockShader) {
        program.shaders.push(shader);
    }

    fn link_program(&mut self, program: &mut MockProgram) -> bool {
        let stages: BTreeSet<_> = program
            .shaders
            .iter()
            .filter(|s| s.compiled)
            .map(|s| s.stage == ShaderStage::Vertex)
            .collect();
        program.linked = !self.fail_link && stages.len() == 2;
        program.linked
    }

    fn program_info_log(&self, program: &MockProgram) -> String {
        if program.linked { String::new() } else { "mock: link failed".to_string() }
    }

    fn delete_program(&mut self, program: MockProgram) {
        if self.bound_program == Some(program.id) {
            self.bound_program = None;
        }
        self.live_programs.remove(&program.id);
        for s in program.shaders {
            self.live_shaders.remove(&s.id);
        }
    }

    fn use_program(&mut self, program: Option<&MockProgram>) {
        if let (Some(_), Some(code)) = (program, self.error_on_use_program) {
            self.errors.push_back(DriverError::new(code, "mock: use_program"));
            return;
        }
        self.bound_program = program.map(|p| p.id);
    }

    fn attrib_location(&self, program: &MockProgram, name: &str) -> Option<u32> {
        if !program.linked || self.missing_names.contains(&name) {
            return None;
        }
        match name {
            "position" => Some(0),
            "texcoord" => Some(1),
            _ => None,
        }
    }

    fn uniform_location(&self, program: &MockProgram, name: &str) -> Option<u32> {
        if !program.linked || self.missing_names.contains(&name) {
            return None;
        }
        (name == "texture").then_some(0)
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.enabled_attribs.push(location);
    }

    fn create_texture(&mut self) -> Option<MockTexture> {
        if self.fail_create_texture {
            return None;
        }
        self.textures_created += 1;
        let id = self.id();
        Some(MockTexture { id, size: None, filters: None })
    }

    fn tex_image_2d(&mut self, texture: &mut MockTexture, bitmap: &Bitmap) {
        if self.reject_tex_image {
            self.errors.push_back(DriverError::new(ErrorCode::InvalidValue, "mock: texture too large"));
            return;
        }
        texture.size = Some((bitmap.width(), bitmap.height()));
    }

    fn tex_filters(&mut self, texture: &mut MockTexture, min: FilterMode, mag: FilterMode) {
        texture.filters = Some((min, mag));
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Option<MockBuffer> {
        let id = self.id();
        Some(MockBuffer { id, len: data.len() })
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewports.push((x, y, width, height));
    }

    fn draw_quad(&mut self, pass: &QuadPass<'_, Self>) {
        self.draws.push(DrawRecord {
            clear_color: pass.clear_color,
            blend: pass.blend,
            program: pass.program.id,
            texture: pass.sampler.texture.id,
            sampler_location: pass.sampler.location,
            unit: pass.sampler.unit,
            attributes: pass
                .attributes
                .iter()
                .map(|a| (a.location, a.components, a.buffer.id))
                .collect(),
            buffer_lens: pass.attributes.iter().map(|a| a.buffer.len).collect(),
            topology: pass.topology,
            vertex_count: pass.vertex_count,
        });
    }

    fn take_error(&mut self) -> Option<DriverError> {
        self.errors.pop_front()
    }
}
