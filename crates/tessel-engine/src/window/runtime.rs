use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::core::ContextProvider;

const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(16);
const MAX_STARTUP_PUMPS: u32 = 300;

/// Window creation parameters.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub title: String,
    /// Logical pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            title: "tessel".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// One window whose event loop is pumped by the caller instead of owning the thread.
pub struct WinitContext {
    event_loop: EventLoop<()>,
    handler: Handler,
    window: Arc<Window>,
}

impl WinitContext {
    /// Opens the window and pumps events until it exists.
    pub fn create(config: ContextConfig) -> Result<Self> {
        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "window size {}x{} is empty",
            config.width,
            config.height
        );
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = Handler::new(config);

        for _ in 0..MAX_STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut handler);
            if let Some(e) = handler.error.take() {
                return Err(e);
            }
            if let Some(window) = handler.window.clone() {
                let size = window.inner_size();
                log::info!(
                    "window `{}` opened at {}x{} physical pixels",
                    handler.config.title,
                    size.width,
                    size.height
                );
                return Ok(Self {
                    event_loop,
                    handler,
                    window,
                });
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited with code {code} before the window was created");
            }
        }
        anyhow::bail!("window was not created after {MAX_STARTUP_PUMPS} event pumps")
    }

    /// Shared handle for surface creation.
    pub fn window(&self) -> Arc<Window> {
        Arc::clone(&self.window)
    }

    /// Current framebuffer size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

impl ContextProvider for WinitContext {
    fn poll_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn should_close(&self) -> bool {
        self.handler.close_requested
    }

    fn present(&mut self) {
        self.window.pre_present_notify();
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.handler
            .pending_resize
            .take()
            .map(|size| (size.width, size.height))
    }
}

struct Handler {
    config: ContextConfig,
    window: Option<Arc<Window>>,
    error: Option<anyhow::Error>,
    close_requested: bool,
    pending_resize: Option<PhysicalSize<u32>>,
}

impl Handler {
    fn new(config: ContextConfig) -> Self {
        Self {
            config,
            window: None,
            error: None,
            close_requested: false,
            pending_resize: None,
        }
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                self.error = Some(anyhow::Error::new(e).context("failed to create window"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.close_requested = true;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::debug!("escape pressed");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => self.pending_resize = Some(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.pending_resize = Some(window.inner_size());
                }
            }
            _ => {}
        }
    }
}
