//! Shader stages and linked programs.

mod error;
mod program;
mod stage;

pub use error::{CompileError, LinkError, ProgramError};
pub use program::ShaderProgram;
pub use stage::CompiledStage;
