use std::fmt;

use super::ids::GeometryId;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); the frame cannot be produced.
    Fatal,
}

/// Failure to start a frame. The render loop skips a `Skipped` frame and stops on
/// `Fatal`.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The surface could not hand out a texture this time.
    Skipped(String),
    /// The surface reported an unrecoverable condition.
    Fatal(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Skipped(why) => write!(f, "frame skipped: {why}"),
            FrameError::Fatal(why) => write!(f, "frame acquisition failed: {why}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// A draw call that could not be issued.
///
/// Draw errors are per-frame failures: the loop logs them and moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    /// No program is active in the frame.
    NoProgram,
    /// No geometry is bound in the frame.
    NoGeometry,
    /// The draw was issued through a geometry unit that is not the bound one.
    GeometryNotBound { bound: GeometryId, requested: GeometryId },
    /// Indexed draw on geometry created without index data.
    NoIndexBuffer,
    /// `count` exceeds the number of vertices or indices available.
    CountOutOfRange { count: u32, available: u32 },
    /// The layout does not feed every input slot the program reads.
    MissingAttributes(Vec<u32>),
    /// No frame is open on the device.
    NoFrame,
    /// The backend rejected the draw.
    Device(String),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::NoProgram => write!(f, "no program is active"),
            DrawError::NoGeometry => write!(f, "no geometry is bound"),
            DrawError::GeometryNotBound { bound, requested } => {
                write!(f, "draw through {requested} while {bound} is bound")
            }
            DrawError::NoIndexBuffer => write!(f, "indexed draw on geometry without index data"),
            DrawError::CountOutOfRange { count, available } => {
                write!(f, "draw count {count} exceeds the {available} available")
            }
            DrawError::MissingAttributes(slots) => {
                write!(f, "vertex layout does not provide input slots {slots:?}")
            }
            DrawError::NoFrame => write!(f, "no frame is open"),
            DrawError::Device(msg) => write!(f, "device rejected draw: {msg}"),
        }
    }
}

impl std::error::Error for DrawError {}
