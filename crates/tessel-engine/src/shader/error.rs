use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::device::ShaderStage;

/// A stage the device refused to compile, with the compiler's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub stage: ShaderStage,
    /// Where the source came from: a file path or an inline label.
    pub origin: String,
    pub diagnostics: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shader `{}` failed to compile:\n{}",
            self.stage, self.origin, self.diagnostics
        )
    }
}

impl std::error::Error for CompileError {}

/// Stages that compiled but could not be combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    pub diagnostics: String,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program failed to link:\n{}", self.diagnostics)
    }
}

impl std::error::Error for LinkError {}

/// Failure to build a program from a vertex/fragment pair.
#[derive(Debug)]
pub enum ProgramError {
    Io { path: PathBuf, source: io::Error },
    /// One entry per stage that failed.
    Compile(Vec<CompileError>),
    Link(LinkError),
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::Io { path, .. } => write!(f, "failed to read {}", path.display()),
            ProgramError::Compile(errors) => {
                write!(f, "{} shader stage(s) failed to compile", errors.len())?;
                for e in errors {
                    write!(f, "\n{e}")?;
                }
                Ok(())
            }
            ProgramError::Link(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgramError::Io { source, .. } => Some(source),
            ProgramError::Compile(_) => None,
            ProgramError::Link(e) => Some(e),
        }
    }
}

impl From<LinkError> for ProgramError {
    fn from(e: LinkError) -> Self {
        ProgramError::Link(e)
    }
}
