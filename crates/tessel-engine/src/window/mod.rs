//! winit-backed window: the [`ContextProvider`](crate::core::ContextProvider) used by the
//! viewer.

mod runtime;

pub use runtime::{ContextConfig, WinitContext};
