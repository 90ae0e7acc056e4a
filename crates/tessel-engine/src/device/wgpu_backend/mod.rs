//! [`Device`](crate::device::Device) on top of wgpu, with WGSL stages reflected by naga.

mod backend;
mod convert;
mod link;
mod reflect;

pub use backend::WgpuDevice;
