use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::error::LoadError;

/// Channel layout of decoded 8-bit pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub const fn channels(self) -> u8 {
        match self {
            PixelFormat::Luma => 1,
            PixelFormat::LumaAlpha => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    pub const fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Luma),
            2 => Some(PixelFormat::LumaAlpha),
            3 => Some(PixelFormat::Rgb),
            4 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }
}

/// Flat, row-major, 8-bit pixel buffer. Row 0 is whichever row the decode policy put
/// first.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelData {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl PixelData {
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::Empty { width, height });
        }
        let expected = width as usize * height as usize * format.channels() as usize;
        if pixels.len() != expected {
            return Err(LoadError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// A `width`×`height` RGBA image of one color. Zero dimensions are raised to 1.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            pixels: rgba.repeat(width as usize * height as usize),
        }
    }

    /// Decodes an encoded image held in memory.
    pub fn decode(bytes: &[u8], flip_vertically: bool) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(image, flip_vertically)
    }

    /// Reads and decodes an image file.
    pub fn open(path: &Path, flip_vertically: bool) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes, flip_vertically)
    }

    fn from_image(image: DynamicImage, flip_vertically: bool) -> Result<Self, LoadError> {
        let image = if flip_vertically { image.flipv() } else { image };
        let (width, height) = (image.width(), image.height());
        let (format, pixels) = match image.color().channel_count() {
            1 => (PixelFormat::Luma, image.into_luma8().into_raw()),
            2 => (PixelFormat::LumaAlpha, image.into_luma_alpha8().into_raw()),
            3 => (PixelFormat::Rgb, image.into_rgb8().into_raw()),
            _ => (PixelFormat::Rgba, image.into_rgba8().into_raw()),
        };
        Self::new(width, height, format, pixels)
    }

    /// Copy with the row order reversed.
    pub fn flipped_vertically(&self) -> Self {
        let row = self.row_len();
        let pixels = self.pixels.chunks_exact(row).rev().flatten().copied().collect();
        Self {
            width: self.width,
            height: self.height,
            format: self.format,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes per row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels() as usize
    }

    /// The pixels as RGBA; luma is replicated into RGB and missing alpha is opaque.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Rgba => self.pixels.clone(),
            PixelFormat::Rgb => self
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            PixelFormat::LumaAlpha => self
                .pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            PixelFormat::Luma => self.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        }
    }
}

impl fmt::Debug for PixelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Where a texture's pixels come from.
#[derive(Debug, Clone)]
pub enum PixelSource {
    File(PathBuf),
    /// An encoded image (PNG, JPEG) already in memory.
    Memory(Vec<u8>),
    /// Decoded pixels with row 0 at the top.
    Decoded(PixelData),
}

impl PixelSource {
    /// Decodes the source, putting the bottom row first when `flip_vertically` is set.
    pub fn decode(&self, flip_vertically: bool) -> Result<PixelData, LoadError> {
        match self {
            PixelSource::File(path) => PixelData::open(path, flip_vertically),
            PixelSource::Memory(bytes) => PixelData::decode(bytes, flip_vertically),
            PixelSource::Decoded(data) if flip_vertically => Ok(data.flipped_vertically()),
            PixelSource::Decoded(data) => Ok(data.clone()),
        }
    }
}

impl fmt::Display for PixelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelSource::File(path) => write!(f, "{}", path.display()),
            PixelSource::Memory(bytes) => write!(f, "<{} encoded bytes>", bytes.len()),
            PixelSource::Decoded(data) => write!(f, "<{}x{} pixels>", data.width, data.height),
        }
    }
}

impl From<PathBuf> for PixelSource {
    fn from(path: PathBuf) -> Self {
        PixelSource::File(path)
    }
}

impl From<&Path> for PixelSource {
    fn from(path: &Path) -> Self {
        PixelSource::File(path.to_path_buf())
    }
}

impl From<&str> for PixelSource {
    fn from(path: &str) -> Self {
        PixelSource::File(PathBuf::from(path))
    }
}

impl From<PixelData> for PixelSource {
    fn from(data: PixelData) -> Self {
        PixelSource::Decoded(data)
    }
}
