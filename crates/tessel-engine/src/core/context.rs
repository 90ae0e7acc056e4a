/// The windowing side of the harness: a close signal, event polling, presentation and
/// resize notifications.
pub trait ContextProvider {
    /// Processes pending window events without blocking.
    fn poll_events(&mut self);

    /// Whether the user asked to close (window close button or Escape).
    fn should_close(&self) -> bool;

    /// Called right before the device presents the frame.
    fn present(&mut self);

    /// The latest framebuffer size reported since the previous call, if it changed.
    fn take_resize(&mut self) -> Option<(u32, u32)>;
}
