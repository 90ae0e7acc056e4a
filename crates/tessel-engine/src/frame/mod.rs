//! Explicit "currently bound" state for one frame.

mod context;

pub use context::FrameContext;
