//! Vertex storage, index storage and the attribute layout that ties them to shader inputs.
//!
//! A [`GeometryBuffer`] is uploaded once at setup and rebound cheaply every frame.

mod buffer;
mod error;
mod layout;

pub use buffer::GeometryBuffer;
pub use error::{GeometryError, LayoutError};
pub use layout::{ComponentType, VertexAttribute, VertexLayout};
