//! Texture decoding, sampling state and slot binding.

mod error;
mod mipmap;
mod pixels;
mod sampling;
mod unit;

pub use error::LoadError;
pub use mipmap::{mip_chain, mip_level_count};
pub use pixels::{PixelData, PixelFormat, PixelSource};
pub use sampling::{Filter, MinFilter, MipmapPolicy, SamplingConfig, WrapMode};
pub use unit::{MAX_TEXTURE_SLOTS, SamplerSlot, TextureUnit};
