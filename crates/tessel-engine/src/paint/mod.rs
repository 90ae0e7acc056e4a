//! Color values handed to the device (clear color).

mod color;

pub use color::Color;
