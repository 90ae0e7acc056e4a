use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{
    Device, DrawError, FrameError, GeometryId, Gpu, GpuFrame, GpuInit, IdAllocator, LinkedProgram,
    Primitive, ProgramId, ShaderStage, StageId, SurfaceErrorAction, TextureId, TextureOrigin,
    UniformLocation, UniformValue,
};
use crate::geometry::VertexLayout;
use crate::paint::Color;
use crate::texture::{MAX_TEXTURE_SLOTS, PixelData, SamplingConfig};

use super::convert::{
    TEXEL_SIZE, TEXTURE_FORMAT, sampler_descriptor, strip_index_format, texel_bytes, topology, vertex_format,
};
use super::link::{LinkedInterface, LocationTarget, link, place_uniform};
use super::reflect::{StageReflection, reflect};

struct StageEntry {
    reflection: StageReflection,
    module: Rc<wgpu::ShaderModule>,
}

/// Uniform block storage plus a CPU copy written by `set_uniform`.
struct BlockBuffer {
    buffer: wgpu::Buffer,
    shadow: Vec<u8>,
    dirty: bool,
}

struct ProgramEntry {
    vertex: Rc<wgpu::ShaderModule>,
    vertex_entry: String,
    fragment: Rc<wgpu::ShaderModule>,
    fragment_entry: String,
    interface: LinkedInterface,
    group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    blocks: Vec<BlockBuffer>,
    /// Slot read by each of `interface.textures`.
    texture_slots: Vec<u32>,
    pipelines: HashMap<(GeometryId, Primitive), wgpu::RenderPipeline>,
}

struct GeometryEntry {
    vertices: wgpu::Buffer,
    vertex_count: u32,
    indices: Option<(wgpu::Buffer, u32)>,
    layout: VertexLayout,
}

struct TextureEntry {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

struct OpenFrame {
    frame: GpuFrame,
    pending_clear: Option<wgpu::Color>,
}

#[derive(Copy, Clone)]
enum DrawRange {
    Arrays { first: u32, count: u32 },
    Indexed { count: u32 },
}

/// [`Device`] drawing into a window surface through wgpu.
///
/// Stages are WGSL, one entry point per module. Uniforms live in `var<uniform>`
/// blocks; each member is addressable by its own name (and as `block.member`).
/// A `texture_2d<f32>` named `t` is sampled with the sampler named `t_sampler`;
/// the slot it reads is set by writing `Int(slot)` to the name `t`.
///
/// Every draw is validated before it reaches wgpu, so a bad draw returns
/// [`DrawError`] instead of tripping wgpu's uncaptured error handler.
pub struct WgpuDevice {
    gpu: Gpu<'static>,
    ids: IdAllocator,
    stages: HashMap<StageId, StageEntry>,
    programs: HashMap<ProgramId, ProgramEntry>,
    geometries: HashMap<GeometryId, GeometryEntry>,
    textures: HashMap<TextureId, TextureEntry>,
    /// Sampled by textures whose slot has nothing bound.
    fallback: TextureEntry,
    program: Option<ProgramId>,
    geometry: Option<GeometryId>,
    slots: BTreeMap<u32, TextureId>,
    frame: Option<OpenFrame>,
}

impl WgpuDevice {
    /// Creates the GPU device and a surface covering `window`.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        let gpu = pollster::block_on(Gpu::new(window, size, init))?;
        let fallback = upload_texture(
            gpu.device(),
            gpu.queue(),
            &[PixelData::filled(1, 1, [0, 0, 0, 255])],
            &SamplingConfig::nearest(),
        );
        log::debug!("surface format {:?}", gpu.surface_format());

        Ok(Self {
            gpu,
            ids: IdAllocator::default(),
            stages: HashMap::new(),
            programs: HashMap::new(),
            geometries: HashMap::new(),
            textures: HashMap::new(),
            fallback,
            program: None,
            geometry: None,
            slots: BTreeMap::new(),
            frame: None,
        })
    }

    pub fn gpu(&self) -> &Gpu<'static> {
        &self.gpu
    }

    fn draw(&mut self, primitive: Primitive, range: DrawRange) -> Result<(), DrawError> {
        let open = self.frame.as_mut().ok_or(DrawError::NoFrame)?;
        let program_id = self.program.ok_or(DrawError::NoProgram)?;
        let program = self.programs.get_mut(&program_id).ok_or(DrawError::NoProgram)?;
        let geometry_id = self.geometry.ok_or(DrawError::NoGeometry)?;
        let geometry = self.geometries.get(&geometry_id).ok_or(DrawError::NoGeometry)?;

        let index_buffer = match range {
            DrawRange::Arrays { first, count } => {
                let end = first.saturating_add(count);
                if end > geometry.vertex_count {
                    return Err(DrawError::CountOutOfRange {
                        count: end,
                        available: geometry.vertex_count,
                    });
                }
                None
            }
            DrawRange::Indexed { count } => {
                let (buffer, available) = geometry.indices.as_ref().ok_or(DrawError::NoIndexBuffer)?;
                if count > *available {
                    return Err(DrawError::CountOutOfRange {
                        count,
                        available: *available,
                    });
                }
                Some(buffer)
            }
        };

        let missing = geometry.layout.missing_slots(&program.interface.inputs);
        if !missing.is_empty() {
            return Err(DrawError::MissingAttributes(missing));
        }

        let device = self.gpu.device();
        program.ensure_pipeline(device, self.gpu.surface_format(), geometry_id, geometry, primitive)?;
        program.flush_uniforms(self.gpu.queue());
        let bind_groups = program.bind_groups(device, &self.textures, &self.slots, &self.fallback);
        let pipeline = program
            .pipelines
            .get(&(geometry_id, primitive))
            .ok_or_else(|| DrawError::Device(format!("no pipeline for {geometry_id}")))?;

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let load = match open.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let mut pass = begin_pass(&mut open.frame, load, "tessel draw pass");
        pass.set_viewport(0.0, 0.0, size.width as f32, size.height as f32, 0.0, 1.0);
        pass.set_pipeline(pipeline);
        for (index, group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(index as u32, group, &[]);
        }
        pass.set_vertex_buffer(0, geometry.vertices.slice(..));
        match (range, index_buffer) {
            (DrawRange::Indexed { count }, Some(indices)) => {
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, 0..1);
            }
            (DrawRange::Arrays { first, count }, _) => pass.draw(first..first + count, 0..1),
            (DrawRange::Indexed { .. }, None) => return Err(DrawError::NoIndexBuffer),
        }
        Ok(())
    }
}

impl Device for WgpuDevice {
    fn texture_origin(&self) -> TextureOrigin {
        TextureOrigin::TopLeft
    }

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        let reflection = reflect(stage, source)?;
        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(reflection.entry_point.as_str()),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
            });
        let id = StageId(self.ids.next());
        self.stages.insert(
            id,
            StageEntry {
                reflection,
                module: Rc::new(module),
            },
        );
        Ok(id)
    }

    fn link_program(&mut self, stages: &[StageId]) -> Result<LinkedProgram, String> {
        let mut vertex = None;
        let mut fragment = None;
        for id in stages {
            let entry = self
                .stages
                .get(id)
                .ok_or_else(|| format!("{id} is not a compiled stage"))?;
            match entry.reflection.stage {
                ShaderStage::Vertex => vertex = Some(entry),
                ShaderStage::Fragment => fragment = Some(entry),
            }
        }
        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            return Err("a program needs one vertex and one fragment stage".to_string());
        };

        let interface = link(&vertex.reflection, &fragment.reflection)?;
        let device = self.gpu.device();

        let group_layouts: Vec<wgpu::BindGroupLayout> = (0..interface.group_count)
            .map(|group| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tessel bind group layout"),
                    entries: &layout_entries(&interface, group),
                })
            })
            .collect();
        let layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessel pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let blocks = interface
            .blocks
            .iter()
            .map(|block| {
                // Uniform buffers are sized in 16-byte rows.
                let size = (block.size.max(16) as usize).next_multiple_of(16);
                BlockBuffer {
                    buffer: device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(block.name.as_str()),
                        size: size as u64,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }),
                    shadow: vec![0; size],
                    dirty: true,
                }
            })
            .collect();

        let id = ProgramId(self.ids.next());
        let program_interface = interface.program_interface();
        let entry = ProgramEntry {
            vertex: Rc::clone(&vertex.module),
            vertex_entry: vertex.reflection.entry_point.clone(),
            fragment: Rc::clone(&fragment.module),
            fragment_entry: fragment.reflection.entry_point.clone(),
            texture_slots: vec![0; interface.textures.len()],
            interface,
            group_layouts,
            pipeline_layout,
            blocks,
            pipelines: HashMap::new(),
        };
        self.programs.insert(id, entry);
        log::debug!("linked {id}: {:?}", program_interface);

        Ok(LinkedProgram {
            id,
            interface: program_interface,
        })
    }

    fn delete_stage(&mut self, stage: StageId) {
        self.stages.remove(&stage);
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.contains_key(&program) {
            self.program = Some(program);
        } else {
            log::warn!("use of unknown {program}");
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let entry = self.programs.get(&program)?;
        entry
            .interface
            .names
            .get(name)
            .map(|index| UniformLocation(*index as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.program.and_then(|id| self.programs.get_mut(&id)) else {
            log::warn!("uniform write to {location} with no program in use");
            return;
        };
        let Some(target) = program.interface.locations.get(location.raw() as usize).copied() else {
            log::warn!("{location} is not a location of the program in use");
            return;
        };

        match target {
            LocationTarget::Bytes { block, offset, ty, .. } => {
                let Some(buffer) = program.blocks.get_mut(block) else {
                    return;
                };
                match place_uniform(&mut buffer.shadow, offset, ty, &value) {
                    Ok(()) => buffer.dirty = true,
                    Err(e) => log::warn!("skipping write to {location}: {e}"),
                }
            }
            LocationTarget::TextureSlot { texture } => match value {
                UniformValue::Int(slot) if (0..MAX_TEXTURE_SLOTS as i32).contains(&slot) => {
                    if let Some(current) = program.texture_slots.get_mut(texture) {
                        *current = slot as u32;
                    }
                }
                other => log::warn!("{other:?} is not a texture slot"),
            },
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.program == Some(program) {
            self.program = None;
        }
    }

    fn create_geometry(
        &mut self,
        vertices: &[u8],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> GeometryId {
        let device = self.gpu.device();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessel vertices"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = indices.map(|indices| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tessel indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, indices.len() as u32)
        });

        let id = GeometryId(self.ids.next());
        self.geometries.insert(
            id,
            GeometryEntry {
                vertices: vertex_buffer,
                vertex_count: (vertices.len() / layout.stride() as usize) as u32,
                indices: index_buffer,
                layout: layout.clone(),
            },
        );
        id
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        if self.geometries.contains_key(&geometry) {
            self.geometry = Some(geometry);
        } else {
            log::warn!("bind of unknown {geometry}");
        }
    }

    fn delete_geometry(&mut self, geometry: GeometryId) {
        self.geometries.remove(&geometry);
        for program in self.programs.values_mut() {
            program.pipelines.retain(|(g, _), _| *g != geometry);
        }
        if self.geometry == Some(geometry) {
            self.geometry = None;
        }
    }

    fn create_texture(&mut self, levels: &[PixelData], sampling: &SamplingConfig) -> TextureId {
        let entry = upload_texture(self.gpu.device(), self.gpu.queue(), levels, sampling);
        let id = TextureId(self.ids.next());
        self.textures.insert(id, entry);
        id
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.slots.insert(slot, texture);
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.slots.retain(|_, bound| *bound != texture);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn begin_frame(&mut self) -> Result<(), FrameError> {
        if let Some(stale) = self.frame.take() {
            log::warn!("previous frame was never presented");
            self.gpu.submit(stale.frame);
        }

        let acquired = self.gpu.begin_frame();
        match acquired {
            Ok(frame) => {
                self.frame = Some(OpenFrame {
                    frame,
                    pending_clear: None,
                });
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => Err(FrameError::Fatal(message)),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Err(FrameError::Skipped(message))
                    }
                }
            }
        }
    }

    fn clear(&mut self, color: Color) {
        match self.frame.as_mut() {
            Some(open) => open.pending_clear = Some(color.to_wgpu()),
            None => log::warn!("clear outside a frame"),
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<(), DrawError> {
        self.draw(primitive, DrawRange::Arrays { first, count })
    }

    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<(), DrawError> {
        self.draw(primitive, DrawRange::Indexed { count })
    }

    fn present(&mut self) {
        let Some(mut open) = self.frame.take() else {
            log::warn!("present without an open frame");
            return;
        };
        if let Some(color) = open.pending_clear.take() {
            let _pass = begin_pass(&mut open.frame, wgpu::LoadOp::Clear(color), "tessel clear pass");
        }
        self.gpu.submit(open.frame);
    }
}

impl ProgramEntry {
    fn ensure_pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        geometry_id: GeometryId,
        geometry: &GeometryEntry,
        primitive: Primitive,
    ) -> Result<(), DrawError> {
        if self.pipelines.contains_key(&(geometry_id, primitive)) {
            return Ok(());
        }

        // Attributes the vertex stage does not read stay out of the pipeline.
        let mut attributes = Vec::new();
        for attr in geometry.layout.attributes() {
            if !self.interface.inputs.contains(&attr.slot) {
                continue;
            }
            let vertex_format = vertex_format(attr)
                .ok_or_else(|| DrawError::Device(format!("no vertex format for {attr:?}")))?;
            attributes.push(wgpu::VertexAttribute {
                format: vertex_format,
                offset: attr.offset as u64,
                shader_location: attr.slot,
            });
        }
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: geometry.layout.stride() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessel pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some(self.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some(self.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology(primitive),
                strip_index_format: strip_index_format(primitive),
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
        log::debug!("built pipeline for {geometry_id} as {primitive:?}");
        self.pipelines.insert((geometry_id, primitive), pipeline);
        Ok(())
    }

    fn flush_uniforms(&mut self, queue: &wgpu::Queue) {
        for block in self.blocks.iter_mut().filter(|b| b.dirty) {
            queue.write_buffer(&block.buffer, 0, &block.shadow);
            block.dirty = false;
        }
    }

    /// Rebuilt per draw: slot bindings may change between draws.
    fn bind_groups(
        &self,
        device: &wgpu::Device,
        textures: &HashMap<TextureId, TextureEntry>,
        slots: &BTreeMap<u32, TextureId>,
        fallback: &TextureEntry,
    ) -> Vec<wgpu::BindGroup> {
        let iface = &self.interface;
        (0..iface.group_count)
            .map(|group| {
                let mut entries = Vec::new();
                for (block, buffer) in iface.blocks.iter().zip(&self.blocks) {
                    if block.group == group {
                        entries.push(wgpu::BindGroupEntry {
                            binding: block.binding,
                            resource: buffer.buffer.as_entire_binding(),
                        });
                    }
                }
                for (index, texture) in iface.textures.iter().enumerate() {
                    if texture.group == group {
                        let source = self.texture_for(Some(index), textures, slots, fallback);
                        entries.push(wgpu::BindGroupEntry {
                            binding: texture.binding,
                            resource: wgpu::BindingResource::TextureView(&source.view),
                        });
                    }
                }
                for sampler in iface.samplers.iter().filter(|s| s.group == group) {
                    let source = self.texture_for(sampler.texture, textures, slots, fallback);
                    entries.push(wgpu::BindGroupEntry {
                        binding: sampler.binding,
                        resource: wgpu::BindingResource::Sampler(&source.sampler),
                    });
                }
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("tessel bind group"),
                    layout: &self.group_layouts[group as usize],
                    entries: &entries,
                })
            })
            .collect()
    }

    fn texture_for<'a>(
        &self,
        texture: Option<usize>,
        textures: &'a HashMap<TextureId, TextureEntry>,
        slots: &BTreeMap<u32, TextureId>,
        fallback: &'a TextureEntry,
    ) -> &'a TextureEntry {
        texture
            .and_then(|index| self.texture_slots.get(index))
            .and_then(|slot| slots.get(slot))
            .and_then(|id| textures.get(id))
            .unwrap_or(fallback)
    }
}

fn layout_entries(iface: &LinkedInterface, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
    let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT;
    let blocks = iface
        .blocks
        .iter()
        .filter(|b| b.group == group)
        .map(|b| wgpu::BindGroupLayoutEntry {
            binding: b.binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(b.size as u64),
            },
            count: None,
        });
    let textures = iface
        .textures
        .iter()
        .filter(|t| t.group == group)
        .map(|t| wgpu::BindGroupLayoutEntry {
            binding: t.binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    let samplers = iface
        .samplers
        .iter()
        .filter(|s| s.group == group)
        .map(|s| wgpu::BindGroupLayoutEntry {
            binding: s.binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    blocks.chain(textures).chain(samplers).collect()
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    levels: &[PixelData],
    sampling: &SamplingConfig,
) -> TextureEntry {
    let fallback;
    let levels = if levels.is_empty() {
        log::error!("texture upload with no levels; using a 1x1 black texel");
        fallback = [PixelData::filled(1, 1, [0, 0, 0, 255])];
        &fallback[..]
    } else {
        levels
    };
    let base = &levels[0];

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tessel texture"),
        size: wgpu::Extent3d {
            width: base.width(),
            height: base.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, data) in levels.iter().enumerate() {
        let bytes = texel_bytes(data);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(TEXEL_SIZE * data.width()),
                rows_per_image: Some(data.height()),
            },
            wgpu::Extent3d {
                width: data.width(),
                height: data.height(),
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&sampler_descriptor(sampling));
    TextureEntry {
        _texture: texture,
        view,
        sampler,
    }
}

fn begin_pass<'e>(
    frame: &'e mut GpuFrame,
    load: wgpu::LoadOp<wgpu::Color>,
    label: &str,
) -> wgpu::RenderPass<'e> {
    frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &frame.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
