use std::fmt;
use std::io;
use std::path::PathBuf;

/// A texture that could not be produced.
///
/// Load failures are not fatal: the harness keeps running with the slot unbound.
#[derive(Debug)]
pub enum LoadError {
    /// The image file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The data is not an image format the decoder understands.
    Unsupported(String),
    /// The data claims a supported format but is damaged.
    Decode(String),
    /// Raw pixel data does not match its declared dimensions.
    PixelCount { expected: usize, actual: usize },
    /// Width or height is zero.
    Empty { width: u32, height: u32 },
    SlotOutOfRange { slot: u32, max: u32 },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            LoadError::Unsupported(why) => write!(f, "unsupported image: {why}"),
            LoadError::Decode(why) => write!(f, "corrupt image: {why}"),
            LoadError::PixelCount { expected, actual } => {
                write!(f, "expected {expected} bytes of pixel data, got {actual}")
            }
            LoadError::Empty { width, height } => write!(f, "image is {width}x{height}"),
            LoadError::SlotOutOfRange { slot, max } => {
                write!(f, "texture slot {slot} is out of range (0..{max})")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => LoadError::Unsupported(u.to_string()),
            other => LoadError::Decode(other.to_string()),
        }
    }
}
