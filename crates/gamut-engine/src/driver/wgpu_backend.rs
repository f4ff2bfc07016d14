use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use wgpu::util::DeviceExt;

use super::reflect::{self, ResourceKind, StageInterface};
use super::{
    BlendFactor, BlendFunc, Driver, DriverError, ErrorCode, FilterMode, QuadPass, ShaderStage,
    Topology,
};
use crate::assets::Bitmap;
use crate::device::{Gpu, SurfaceErrorAction};

type ErrorQueue = Arc<Mutex<VecDeque<DriverError>>>;

pub struct WgpuShader {
    id: u64,
    stage: ShaderStage,
    compiled: Option<(wgpu::ShaderModule, StageInterface)>,
    log: String,
}

pub struct WgpuProgram {
    id: u64,
    shaders: Vec<WgpuShader>,
    linked: Option<LinkedProgram>,
    log: String,
}

struct LinkedProgram {
    vs_module: wgpu::ShaderModule,
    fs_module: wgpu::ShaderModule,
    vertex: StageInterface,
    fragment: StageInterface,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

pub struct WgpuTexture {
    image: Option<(wgpu::Texture, wgpu::TextureView)>,
    sampler: Option<wgpu::Sampler>,
}

pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: u64,
    blend: Option<BlendFunc>,
    topology: Topology,
    /// `(location, components)` per vertex buffer slot.
    attributes: [(u32, u32); 2],
}

/// [`Driver`] on top of one [`Gpu`] surface generation.
///
/// Pipelines are built lazily per (program, blend, topology, vertex layout)
/// and cached until the program is deleted. Device errors raised by wgpu land
/// in the same queue as the driver's own state errors.
pub struct WgpuDriver {
    gpu: Gpu,
    errors: ErrorQueue,
    next_id: u64,

    current_program: Option<u64>,
    enabled_attribs: BTreeSet<u32>,
    /// `(x, y, width, height)`, origin at the bottom-left.
    viewport: Option<(i32, i32, u32, u32)>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    context_lost: bool,
}

impl WgpuDriver {
    pub fn new(gpu: Gpu) -> Self {
        let errors: ErrorQueue = Arc::default();

        let sink = Arc::clone(&errors);
        gpu.device().on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(DriverError::from(err));
        }));

        Self {
            gpu,
            errors,
            next_id: 0,
            current_program: None,
            enabled_attribs: BTreeSet::new(),
            viewport: None,
            pipelines: HashMap::new(),
            context_lost: false,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu {
        &mut self.gpu
    }

    /// True once presenting failed fatally; the owner should start a new
    /// surface generation.
    pub fn context_lost(&self) -> bool {
        self.context_lost
    }

    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn push_error(&self, code: ErrorCode, message: impl Into<String>) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(DriverError::new(code, message));
    }

    fn create_sampler(&self, min: FilterMode, mag: FilterMode) -> wgpu::Sampler {
        self.gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gamut image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode(mag),
            min_filter: filter_mode(min),
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        })
    }

    fn link(&self, program: &WgpuProgram) -> Result<LinkedProgram, String> {
        let compiled = |stage: ShaderStage| {
            let mut found = program.shaders.iter().filter(|s| s.stage == stage);
            let shader = found.next().ok_or_else(|| format!("no {stage} shader attached"))?;
            if found.next().is_some() {
                return Err(format!("more than one {stage} shader attached"));
            }
            shader
                .compiled
                .as_ref()
                .ok_or_else(|| format!("{stage} shader is not compiled"))
        };

        let (vs_module, vertex) = compiled(ShaderStage::Vertex)?;
        let (fs_module, fragment) = compiled(ShaderStage::Fragment)?;
        reflect::check_interface(vertex, fragment)?;

        let mut entries = Vec::new();
        for r in vertex.resources.iter().chain(&fragment.resources) {
            if r.group != 0 {
                return Err(format!("`{}` uses bind group {}, only 0 is supported", r.name, r.group));
            }
            let ty = match r.kind {
                ResourceKind::Texture => wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                ResourceKind::Sampler => {
                    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                }
                ResourceKind::Other => {
                    return Err(format!("unsupported resource `{}`", r.name));
                }
            };
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: r.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty,
                count: None,
            });
        }

        let device = self.gpu.device();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gamut program bgl"),
            entries: &entries,
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gamut program pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        Ok(LinkedProgram {
            vs_module: vs_module.clone(),
            fs_module: fs_module.clone(),
            vertex: vertex.clone(),
            fragment: fragment.clone(),
            bind_group_layout,
            pipeline_layout,
        })
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey, linked: &LinkedProgram) {
        if self.pipelines.contains_key(key) {
            return;
        }

        let attrs: Vec<[wgpu::VertexAttribute; 1]> = key
            .attributes
            .iter()
            .map(|&(location, components)| {
                [wgpu::VertexAttribute {
                    format: vertex_format(components),
                    offset: 0,
                    shader_location: location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .attributes
            .iter()
            .zip(&attrs)
            .map(|(&(_, components), attributes)| wgpu::VertexBufferLayout {
                array_stride: u64::from(components) * std::mem::size_of::<f32>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let pipeline = self.gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gamut quad pipeline"),
            layout: Some(&linked.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &linked.vs_module,
                entry_point: Some(linked.vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &linked.fs_module,
                entry_point: Some(linked.fragment.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.view_format(),
                    blend: key.blend.map(blend_state),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: match key.topology {
                    Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
                },
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(key.clone(), pipeline);
    }

    /// Viewport in wgpu's top-left convention, clipped to the surface.
    fn clipped_viewport(&self) -> Option<(f32, f32, f32, f32)> {
        let size = self.gpu.size();
        let (sw, sh) = (i64::from(size.width), i64::from(size.height));
        let (x, y, w, h) = match self.viewport {
            Some((x, y, w, h)) => (i64::from(x), i64::from(y), i64::from(w), i64::from(h)),
            None => (0, 0, sw, sh),
        };

        let x0 = x.clamp(0, sw);
        let x1 = (x + w).clamp(0, sw);
        let y0 = y.clamp(0, sh);
        let y1 = (y + h).clamp(0, sh);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as f32, (sh - y1) as f32, (x1 - x0) as f32, (y1 - y0) as f32))
    }

    fn validate_pass(&self, pass: &QuadPass<'_, Self>) -> Result<(), String> {
        if self.current_program != Some(pass.program.id) {
            return Err("draw with a program that is not current".into());
        }
        if pass.sampler.unit != 0 {
            return Err(format!("texture unit {} is not available", pass.sampler.unit));
        }
        if pass.sampler.texture.image.is_none() {
            return Err("draw with a texture that has no image".into());
        }
        for a in &pass.attributes {
            if !self.enabled_attribs.contains(&a.location) {
                return Err(format!("vertex attribute {} is not enabled", a.location));
            }
            if !(1..=4).contains(&a.components) {
                return Err(format!("vertex attribute {} has {} components", a.location, a.components));
            }
        }
        Ok(())
    }
}

impl Driver for WgpuDriver {
    type Shader = WgpuShader;
    type Program = WgpuProgram;
    type Texture = WgpuTexture;
    type Buffer = WgpuBuffer;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<WgpuShader> {
        if self.context_lost {
            return None;
        }
        Some(WgpuShader { id: self.id(), stage, compiled: None, log: String::new() })
    }

    fn compile_shader(&mut self, shader: &mut WgpuShader, source: &str) -> bool {
        match reflect::compile_wgsl(shader.stage, source) {
            Ok((_, interface)) => {
                let module = self.gpu.device().create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(match shader.stage {
                        ShaderStage::Vertex => "gamut vertex shader",
                        ShaderStage::Fragment => "gamut fragment shader",
                    }),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                });
                log::trace!("shader {} compiled ({} inputs)", shader.id, interface.inputs.len());
                shader.compiled = Some((module, interface));
                shader.log.clear();
                true
            }
            Err(log) => {
                shader.compiled = None;
                shader.log = log;
                false
            }
        }
    }

    fn shader_info_log(&self, shader: &WgpuShader) -> String {
        shader.log.clone()
    }

    fn delete_shader(&mut self, shader: WgpuShader) {
        drop(shader);
    }

    fn create_program(&mut self) -> Option<WgpuProgram> {
        if self.context_lost {
            return None;
        }
        Some(WgpuProgram { id: self.id(), shaders: Vec::new(), linked: None, log: String::new() })
    }

    fn attach_shader(&mut self, program: &mut WgpuProgram, shader: WgpuShader) {
        program.shaders.push(shader);
    }

    fn link_program(&mut self, program: &mut WgpuProgram) -> bool {
        self.pipelines.retain(|k, _| k.program != program.id);
        match self.link(program) {
            Ok(linked) => {
                program.linked = Some(linked);
                program.log.clear();
                true
            }
            Err(log) => {
                program.linked = None;
                program.log = log;
                false
            }
        }
    }

    fn program_info_log(&self, program: &WgpuProgram) -> String {
        program.log.clone()
    }

    fn delete_program(&mut self, program: WgpuProgram) {
        if self.current_program == Some(program.id) {
            self.current_program = None;
        }
        self.pipelines.retain(|k, _| k.program != program.id);
    }

    fn use_program(&mut self, program: Option<&WgpuProgram>) {
        match program {
            None => self.current_program = None,
            Some(p) if p.linked.is_some() => self.current_program = Some(p.id),
            Some(p) => self.push_error(
                ErrorCode::InvalidOperation,
                format!("program {} is not linked", p.id),
            ),
        }
    }

    fn attrib_location(&self, program: &WgpuProgram, name: &str) -> Option<u32> {
        program.linked.as_ref()?.vertex.input(name)
    }

    fn uniform_location(&self, program: &WgpuProgram, name: &str) -> Option<u32> {
        let linked = program.linked.as_ref()?;
        linked
            .fragment
            .resource(name)
            .or_else(|| linked.vertex.resource(name))
            .map(|r| r.binding)
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.enabled_attribs.insert(location);
    }

    fn create_texture(&mut self) -> Option<WgpuTexture> {
        if self.context_lost {
            return None;
        }
        Some(WgpuTexture { image: None, sampler: None })
    }

    fn tex_image_2d(&mut self, texture: &mut WgpuTexture, bitmap: &Bitmap) {
        let (width, height) = (bitmap.width(), bitmap.height());
        let max = self.gpu.device().limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            self.push_error(
                ErrorCode::InvalidValue,
                format!("texture size {width}x{height} outside 1..={max}"),
            );
            return;
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let gpu_texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("gamut image texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.stride()),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        texture.image = Some((gpu_texture, view));
        if texture.sampler.is_none() {
            texture.sampler = Some(self.create_sampler(FilterMode::Nearest, FilterMode::Linear));
        }
    }

    fn tex_filters(&mut self, texture: &mut WgpuTexture, min: FilterMode, mag: FilterMode) {
        texture.sampler = Some(self.create_sampler(min, mag));
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Option<WgpuBuffer> {
        if self.context_lost {
            return None;
        }
        if data.is_empty() {
            self.push_error(ErrorCode::InvalidValue, "empty vertex buffer");
            return None;
        }
        let buffer = self.gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gamut vertex buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Some(WgpuBuffer { buffer })
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Some((x, y, width, height));
    }

    fn draw_quad(&mut self, pass: &QuadPass<'_, Self>) {
        if self.context_lost {
            return;
        }
        if let Err(msg) = self.validate_pass(pass) {
            self.push_error(ErrorCode::InvalidOperation, msg);
            return;
        }
        let Some(linked) = pass.program.linked.as_ref() else {
            self.push_error(ErrorCode::InvalidOperation, "draw with an unlinked program");
            return;
        };

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let key = PipelineKey {
            program: pass.program.id,
            blend: pass.blend,
            topology: pass.topology,
            attributes: pass.attributes.each_ref().map(|a| (a.location, a.components)),
        };
        self.ensure_pipeline(&key, linked);
        let Some(pipeline) = self.pipelines.get(&key) else { return };

        let Some((_, view)) = pass.sampler.texture.image.as_ref() else { return };
        let Some(sampler) = pass.sampler.texture.sampler.as_ref() else { return };

        let mut entries = Vec::new();
        for r in linked.vertex.resources.iter().chain(&linked.fragment.resources) {
            let resource = match r.kind {
                ResourceKind::Texture if r.binding == pass.sampler.location => {
                    wgpu::BindingResource::TextureView(view)
                }
                ResourceKind::Sampler => wgpu::BindingResource::Sampler(sampler),
                _ => {
                    self.push_error(
                        ErrorCode::InvalidOperation,
                        format!("no texture bound for `{}`", r.name),
                    );
                    return;
                }
            };
            entries.push(wgpu::BindGroupEntry { binding: r.binding, resource });
        }
        let bind_group = self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gamut quad bind group"),
            layout: &linked.bind_group_layout,
            entries: &entries,
        });

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {}
                    SurfaceErrorAction::Fatal => {
                        self.context_lost = true;
                        self.push_error(ErrorCode::ContextLost, "surface is out of memory");
                    }
                }
                return;
            }
        };

        let [r, g, b, a] = pass.clear_color.map(f64::from);
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gamut quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // An empty viewport still clears.
            if let Some((x, y, w, h)) = self.clipped_viewport() {
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &bind_group, &[]);
                for (slot, attr) in (0u32..).zip(&pass.attributes) {
                    rpass.set_vertex_buffer(slot, attr.buffer.buffer.slice(..));
                }
                rpass.draw(0..pass.vertex_count, 0..1);
            }
        }

        self.gpu.submit(frame);
    }

    fn take_error(&mut self) -> Option<DriverError> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

/// The same factors apply to color and alpha.
fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: blend_factor(func.src),
        dst_factor: blend_factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}
