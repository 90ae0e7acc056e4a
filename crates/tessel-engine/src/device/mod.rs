//! The device seam and its two implementations.
//!
//! [`Device`] is the retained-state command vocabulary the resource wrappers talk to.
//! [`WgpuDevice`] renders through wgpu; [`RecordingDevice`] records the commands for
//! tests. The wgpu context types ([`Gpu`], [`GpuFrame`], [`GpuInit`]) live here too.

mod api;
mod error;
mod frame;
mod gpu;
mod ids;
mod init;
mod recording;
mod surface;
mod wgpu_backend;

pub use api::{
    Device, LinkedProgram, Primitive, ProgramInterface, ShaderStage, SharedDevice, TextureOrigin,
    UniformValue, share,
};
pub use error::{DrawError, FrameError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use ids::{GeometryId, ProgramId, StageId, TextureId, UniformLocation};
pub use init::GpuInit;
pub use recording::{DeviceCall, RecordingDevice};
pub use wgpu_backend::WgpuDevice;

pub(crate) use ids::IdAllocator;
