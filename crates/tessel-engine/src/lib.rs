//! Tessel engine crate.
//!
//! A minimal rasterization harness: shader programs, vertex geometry and sampled
//! textures are handed to a [`device::Device`] and drawn by a [`core::RenderLoop`]
//! once per frame until the window closes.

pub mod core;
pub mod device;
pub mod frame;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod shader;
pub mod texture;
pub mod window;
