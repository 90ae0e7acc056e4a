//! The render loop and the contracts it is driven through.
//!
//! [`RenderLoop`] owns a [`Scene`] and runs one draw per frame against a [`Device`],
//! pulling window events from a [`ContextProvider`].
//!
//! [`Device`]: crate::device::Device

mod context;
mod error;
mod render_loop;
mod scene;

pub use context::ContextProvider;
pub use error::{SceneError, StartupError};
pub use render_loop::{FrameStats, LoopState, RenderLoop};
pub use scene::{DrawCommand, Scene};
