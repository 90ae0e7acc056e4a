use std::fmt;

use crate::geometry::GeometryError;
use crate::shader::ProgramError;

use super::render_loop::LoopState;

/// A scene that cannot be drawn consistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Two sampler slots share one texture slot.
    DuplicateSlot { slot: u32, first: String, second: String },
    SlotOutOfRange { sampler: String, slot: u32 },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::DuplicateSlot { slot, first, second } => write!(
                f,
                "samplers `{first}` and `{second}` both use texture slot {slot}"
            ),
            SceneError::SlotOutOfRange { sampler, slot } => {
                write!(f, "sampler `{sampler}` uses out-of-range slot {slot}")
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// A failure that prevents the loop from reaching `Ready`.
#[derive(Debug)]
pub enum StartupError {
    Program(ProgramError),
    Geometry(GeometryError),
    Scene(SceneError),
    /// `load` or `run` called in the wrong state.
    State { expected: LoopState, actual: LoopState },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Program(e) => write!(f, "shader program: {e}"),
            StartupError::Geometry(e) => write!(f, "geometry: {e}"),
            StartupError::Scene(e) => write!(f, "scene: {e}"),
            StartupError::State { expected, actual } => {
                write!(f, "render loop is {actual:?}, expected {expected:?}")
            }
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Program(e) => Some(e),
            StartupError::Geometry(e) => Some(e),
            StartupError::Scene(e) => Some(e),
            StartupError::State { .. } => None,
        }
    }
}

impl From<ProgramError> for StartupError {
    fn from(e: ProgramError) -> Self {
        StartupError::Program(e)
    }
}

impl From<GeometryError> for StartupError {
    fn from(e: GeometryError) -> Self {
        StartupError::Geometry(e)
    }
}

impl From<SceneError> for StartupError {
    fn from(e: SceneError) -> Self {
        StartupError::Scene(e)
    }
}
