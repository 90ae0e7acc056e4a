//! A device that records every command instead of rendering.
//!
//! It keeps just enough state to reject the draws a real device would reject, so a
//! recorded sequence that draws cleanly here is well-formed for the GPU backend too.

use std::collections::HashMap;

use crate::geometry::VertexLayout;
use crate::paint::Color;
use crate::texture::{PixelData, SamplingConfig};

use super::api::{Device, LinkedProgram, Primitive, ProgramInterface, ShaderStage, TextureOrigin, UniformValue};
use super::error::{DrawError, FrameError};
use super::ids::{GeometryId, IdAllocator, ProgramId, StageId, TextureId, UniformLocation};

/// One recorded [`Device`] command.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CompileStage { stage: StageId, kind: ShaderStage },
    LinkProgram { program: ProgramId, stages: Vec<StageId> },
    DeleteStage(StageId),
    UseProgram(ProgramId),
    SetUniform { location: UniformLocation, value: UniformValue },
    DeleteProgram(ProgramId),
    CreateGeometry {
        geometry: GeometryId,
        vertex_bytes: usize,
        index_count: Option<usize>,
        stride: u32,
    },
    BindGeometry(GeometryId),
    DeleteGeometry(GeometryId),
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        channels: u8,
        levels: usize,
    },
    BindTexture { slot: u32, texture: TextureId },
    DeleteTexture(TextureId),
    SetViewport { width: u32, height: u32 },
    BeginFrame,
    Clear(Color),
    DrawArrays { primitive: Primitive, first: u32, count: u32 },
    DrawIndexed { primitive: Primitive, count: u32 },
    Present,
}

struct GeometryRecord {
    vertex_count: u32,
    index_count: Option<u32>,
    layout: VertexLayout,
}

/// In-memory [`Device`] for tests and headless runs.
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    ids: IdAllocator,
    origin: TextureOrigin,
    interface: ProgramInterface,
    rejections: Vec<(String, String)>,
    link_failure: Option<String>,
    failing_draws: u32,
    failing_frames: u32,
    lost: bool,
    location_queries: usize,

    stages: HashMap<StageId, ShaderStage>,
    programs: HashMap<ProgramId, ProgramInterface>,
    geometries: HashMap<GeometryId, GeometryRecord>,
    textures: HashMap<TextureId, (u32, u32)>,

    current_program: Option<ProgramId>,
    current_geometry: Option<GeometryId>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A device with a bottom-left texture origin whose programs read input slot 0 and
    /// declare no uniforms.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            ids: IdAllocator::default(),
            origin: TextureOrigin::BottomLeft,
            interface: ProgramInterface {
                inputs: vec![0],
                ..ProgramInterface::default()
            },
            rejections: Vec::new(),
            link_failure: None,
            failing_draws: 0,
            failing_frames: 0,
            lost: false,
            location_queries: 0,
            stages: HashMap::new(),
            programs: HashMap::new(),
            geometries: HashMap::new(),
            textures: HashMap::new(),
            current_program: None,
            current_geometry: None,
        }
    }

    // ── scripting ────────────────────────────────────────────────────────

    /// Interface reported for every program linked from now on.
    pub fn with_interface(mut self, interface: ProgramInterface) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_texture_origin(mut self, origin: TextureOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Fails compilation of any source containing `marker`, reporting `diagnostic`.
    pub fn reject_source(mut self, marker: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        self.rejections.push((marker.into(), diagnostic.into()));
        self
    }

    /// Fails every link with `diagnostic`.
    pub fn fail_link(mut self, diagnostic: impl Into<String>) -> Self {
        self.link_failure = Some(diagnostic.into());
        self
    }

    /// Fails the next `n` draw calls.
    pub fn fail_next_draws(&mut self, n: u32) {
        self.failing_draws = n;
    }

    /// Fails the next `n` `begin_frame` calls.
    pub fn fail_next_frames(&mut self, n: u32) {
        self.failing_frames = n;
    }

    /// Every later `begin_frame` fails fatally.
    pub fn lose_device(&mut self) {
        self.lost = true;
    }

    // ── inspection ───────────────────────────────────────────────────────

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of `uniform_location` queries answered so far.
    pub fn location_queries(&self) -> usize {
        self.location_queries
    }

    /// Programs, geometries and textures not yet deleted.
    pub fn live_resources(&self) -> usize {
        self.programs.len() + self.geometries.len() + self.textures.len()
    }

    pub fn live_stages(&self) -> usize {
        self.stages.len()
    }

    fn check_draw(&mut self, primitive: Primitive, needed: u32, indexed: bool) -> Result<(), DrawError> {
        if self.failing_draws > 0 {
            self.failing_draws -= 1;
            return Err(DrawError::Device(format!("scripted {primitive:?} draw failure")));
        }
        let program = self
            .current_program
            .and_then(|p| self.programs.get(&p))
            .ok_or(DrawError::NoProgram)?;
        let geometry = self
            .current_geometry
            .and_then(|g| self.geometries.get(&g))
            .ok_or(DrawError::NoGeometry)?;

        let missing = geometry.layout.missing_slots(&program.inputs);
        if !missing.is_empty() {
            return Err(DrawError::MissingAttributes(missing));
        }

        let available = if indexed {
            geometry.index_count.ok_or(DrawError::NoIndexBuffer)?
        } else {
            geometry.vertex_count
        };
        if needed > available {
            return Err(DrawError::CountOutOfRange {
                count: needed,
                available,
            });
        }
        Ok(())
    }
}

impl Device for RecordingDevice {
    fn texture_origin(&self) -> TextureOrigin {
        self.origin
    }

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        if let Some((_, diagnostic)) = self.rejections.iter().find(|(m, _)| source.contains(m.as_str())) {
            return Err(diagnostic.clone());
        }
        let id = StageId(self.ids.next());
        self.stages.insert(id, stage);
        self.calls.push(DeviceCall::CompileStage { stage: id, kind: stage });
        Ok(id)
    }

    fn link_program(&mut self, stages: &[StageId]) -> Result<LinkedProgram, String> {
        if let Some(unknown) = stages.iter().find(|s| !self.stages.contains_key(*s)) {
            return Err(format!("{unknown} is not a compiled stage"));
        }
        if let Some(diagnostic) = &self.link_failure {
            return Err(diagnostic.clone());
        }
        let id = ProgramId(self.ids.next());
        self.programs.insert(id, self.interface.clone());
        self.calls.push(DeviceCall::LinkProgram {
            program: id,
            stages: stages.to_vec(),
        });
        Ok(LinkedProgram {
            id,
            interface: self.interface.clone(),
        })
    }

    fn delete_stage(&mut self, stage: StageId) {
        self.stages.remove(&stage);
        self.calls.push(DeviceCall::DeleteStage(stage));
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.location_queries += 1;
        let iface = self.programs.get(&program)?;
        iface
            .uniforms
            .iter()
            .chain(&iface.samplers)
            .position(|n| n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.calls.push(DeviceCall::SetUniform { location, value });
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.calls.push(DeviceCall::DeleteProgram(program));
    }

    fn create_geometry(
        &mut self,
        vertices: &[u8],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> GeometryId {
        let id = GeometryId(self.ids.next());
        self.geometries.insert(
            id,
            GeometryRecord {
                vertex_count: (vertices.len() / layout.stride() as usize) as u32,
                index_count: indices.map(|i| i.len() as u32),
                layout: layout.clone(),
            },
        );
        self.calls.push(DeviceCall::CreateGeometry {
            geometry: id,
            vertex_bytes: vertices.len(),
            index_count: indices.map(<[u32]>::len),
            stride: layout.stride(),
        });
        id
    }

    fn bind_geometry(&mut self, geometry: GeometryId) {
        self.current_geometry = Some(geometry);
        self.calls.push(DeviceCall::BindGeometry(geometry));
    }

    fn delete_geometry(&mut self, geometry: GeometryId) {
        self.geometries.remove(&geometry);
        if self.current_geometry == Some(geometry) {
            self.current_geometry = None;
        }
        self.calls.push(DeviceCall::DeleteGeometry(geometry));
    }

    fn create_texture(&mut self, levels: &[PixelData], _sampling: &SamplingConfig) -> TextureId {
        let id = TextureId(self.ids.next());
        let (width, height, channels) = levels
            .first()
            .map_or((0, 0, 0), |l| (l.width(), l.height(), l.channels()));
        self.textures.insert(id, (width, height));
        self.calls.push(DeviceCall::CreateTexture {
            texture: id,
            width,
            height,
            channels,
            levels: levels.len(),
        });
        id
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.calls.push(DeviceCall::BindTexture { slot, texture });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.calls.push(DeviceCall::DeleteTexture(texture));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(DeviceCall::SetViewport { width, height });
    }

    fn begin_frame(&mut self) -> Result<(), FrameError> {
        if self.lost {
            return Err(FrameError::Fatal("scripted device loss".into()));
        }
        if self.failing_frames > 0 {
            self.failing_frames -= 1;
            return Err(FrameError::Skipped("scripted acquisition failure".into()));
        }
        self.calls.push(DeviceCall::BeginFrame);
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(DeviceCall::Clear(color));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<(), DrawError> {
        self.check_draw(primitive, first.saturating_add(count), false)?;
        self.calls.push(DeviceCall::DrawArrays {
            primitive,
            first,
            count,
        });
        Ok(())
    }

    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<(), DrawError> {
        self.check_draw(primitive, count, true)?;
        self.calls.push(DeviceCall::DrawIndexed { primitive, count });
        Ok(())
    }

    fn present(&mut self) {
        self.calls.push(DeviceCall::Present);
    }
}
