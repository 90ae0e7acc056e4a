use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

use super::pixels::{PixelData, PixelFormat};

/// Levels in a full chain for a `width`×`height` base: `floor(log2(max)) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// The full mip chain of `base`, base level first, each level half the previous one
/// (rounded down, at least 1) down to 1×1.
pub fn mip_chain(base: PixelData) -> Vec<PixelData> {
    let count = mip_level_count(base.width(), base.height()) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(base);

    while levels.len() < count {
        let Some(prev) = levels.last() else { break };
        let (w, h) = ((prev.width() / 2).max(1), (prev.height() / 2).max(1));
        match downsample(prev, w, h) {
            Some(level) => levels.push(level),
            None => {
                log::warn!("mip generation stopped at level {}", levels.len());
                break;
            }
        }
    }
    levels
}

fn downsample(src: &PixelData, width: u32, height: u32) -> Option<PixelData> {
    let pixels = match src.format() {
        PixelFormat::Luma => resize::<Luma<u8>>(src, width, height)?,
        PixelFormat::LumaAlpha => resize::<LumaA<u8>>(src, width, height)?,
        PixelFormat::Rgb => resize::<Rgb<u8>>(src, width, height)?,
        PixelFormat::Rgba => resize::<Rgba<u8>>(src, width, height)?,
    };
    PixelData::new(width, height, src.format(), pixels).ok()
}

fn resize<P: Pixel<Subpixel = u8> + 'static>(src: &PixelData, width: u32, height: u32) -> Option<Vec<u8>> {
    let image = ImageBuffer::<P, &[u8]>::from_raw(src.width(), src.height(), src.pixels())?;
    Some(imageops::resize(&image, width, height, FilterType::Triangle).into_raw())
}
