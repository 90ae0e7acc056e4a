use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::geometry::VertexLayout;
use crate::paint::Color;
use crate::texture::{PixelData, SamplingConfig};

use super::error::{DrawError, FrameError};
use super::ids::{GeometryId, ProgramId, StageId, TextureId, UniformLocation};

/// Device handle shared by the resource wrappers of one scene.
///
/// The harness is single-threaded; every wrapper borrows the device only for the
/// duration of one call.
pub type SharedDevice<D> = Rc<RefCell<D>>;

/// Wraps a device for sharing between resource wrappers.
pub fn share<D: Device>(device: D) -> SharedDevice<D> {
    Rc::new(RefCell::new(device))
}

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Primitive assembly mode of a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

/// Value written to a uniform location.
///
/// Sampler uniforms take `Int` holding the texture slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    /// Little-endian byte image as laid out in a uniform buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Int(v) => v.to_le_bytes().to_vec(),
            UniformValue::Float(v) => v.to_le_bytes().to_vec(),
            UniformValue::Vec2(v) => bytemuck::cast_slice::<_, u8>(v).to_vec(),
            UniformValue::Vec3(v) => bytemuck::cast_slice::<_, u8>(v).to_vec(),
            UniformValue::Vec4(v) => bytemuck::cast_slice::<_, u8>(v).to_vec(),
            UniformValue::Mat4(m) => bytemuck::cast_slice::<_, u8>(m).to_vec(),
        }
    }
}

/// Where texel row 0 lives in the device's texture coordinate space.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureOrigin {
    TopLeft,
    BottomLeft,
}

/// What a linked program reads, as reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInterface {
    /// Vertex input slots read by the vertex stage, ascending.
    pub inputs: Vec<u32>,
    /// Sampler uniform names; each takes a texture slot.
    pub samplers: Vec<String>,
    /// Plain (non-sampler) uniform names.
    pub uniforms: Vec<String>,
}

impl ProgramInterface {
    pub fn is_sampler(&self, name: &str) -> bool {
        self.samplers.iter().any(|s| s == name)
    }
}

/// Result of a successful link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram {
    pub id: ProgramId,
    pub interface: ProgramInterface,
}

/// Retained-state command vocabulary of a graphics device.
///
/// Bind/use calls change what subsequent uniform writes and draws apply to, exactly
/// like the binding points of a classic immediate-mode API. Callers track that state
/// explicitly in a [`FrameContext`](crate::frame::FrameContext); the device never has
/// to be asked what is bound.
///
/// Compile and link report the backend's diagnostic text as `Err(String)`.
pub trait Device {
    /// Texture coordinate origin expected by this device.
    fn texture_origin(&self) -> TextureOrigin;

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String>;
    fn link_program(&mut self, stages: &[StageId]) -> Result<LinkedProgram, String>;
    fn delete_stage(&mut self, stage: StageId);

    /// Makes `program` the target of subsequent uniform writes and draws.
    fn use_program(&mut self, program: ProgramId);
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Writes to `location` of the program last passed to `use_program`.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);
    fn delete_program(&mut self, program: ProgramId);

    /// Uploads vertex storage (and optional 32-bit indices) and attaches `layout`.
    fn create_geometry(
        &mut self,
        vertices: &[u8],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> GeometryId;
    fn bind_geometry(&mut self, geometry: GeometryId);
    fn delete_geometry(&mut self, geometry: GeometryId);

    /// Uploads `levels` (base level first) with the given sampling state.
    fn create_texture(&mut self, levels: &[PixelData], sampling: &SamplingConfig) -> TextureId;
    fn bind_texture(&mut self, slot: u32, texture: TextureId);
    fn delete_texture(&mut self, texture: TextureId);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn begin_frame(&mut self) -> Result<(), FrameError>;
    fn clear(&mut self, color: Color);
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<(), DrawError>;
    fn draw_indexed(&mut self, primitive: Primitive, count: u32) -> Result<(), DrawError>;
    /// Submits the frame opened by `begin_frame` for display.
    fn present(&mut self);
}
