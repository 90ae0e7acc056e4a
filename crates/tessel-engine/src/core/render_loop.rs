use std::collections::BTreeSet;

use crate::device::{Device, FrameError, SharedDevice, UniformValue};
use crate::frame::FrameContext;
use crate::paint::Color;

use super::context::ContextProvider;
use super::error::StartupError;
use super::scene::Scene;

/// Lifecycle of a [`RenderLoop`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// No scene loaded yet.
    Uninitialized,
    /// Scene loaded and validated; no frame drawn yet.
    Ready,
    Running,
    /// Close requested; the scene's resources have been released.
    Terminated,
}

/// Frame counters, logged when the loop terminates.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub presented: u64,
    pub dropped_draws: u64,
    pub skipped_frames: u64,
}

/// Drives one scene at display cadence.
///
/// Each iteration checks the close signal, clears, activates the program, writes the
/// sampler slot assignments and scene uniforms, binds textures and geometry, draws,
/// presents and polls events.
pub struct RenderLoop<D: Device> {
    device: SharedDevice<D>,
    clear_color: Color,
    state: LoopState,
    scene: Option<Scene<D>>,
    frame: FrameContext,
    stats: FrameStats,
    reported_unbound: BTreeSet<String>,
}

impl<D: Device> RenderLoop<D> {
    pub fn new(device: SharedDevice<D>, clear_color: Color) -> Self {
        Self {
            device,
            clear_color: clear_color.clamped(),
            state: LoopState::Uninitialized,
            scene: None,
            frame: FrameContext::new(),
            stats: FrameStats::default(),
            reported_unbound: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn scene(&self) -> Option<&Scene<D>> {
        self.scene.as_ref()
    }

    /// Takes ownership of `scene` and moves to `Ready`.
    ///
    /// A scene that fails validation is released and the loop stays `Uninitialized`.
    pub fn load(&mut self, scene: Scene<D>) -> Result<(), StartupError> {
        if self.state != LoopState::Uninitialized {
            return Err(StartupError::State {
                expected: LoopState::Uninitialized,
                actual: self.state,
            });
        }
        if let Err(e) = scene.validate() {
            scene.release();
            return Err(e.into());
        }
        log::info!(
            "scene ready: {}, {}, {} texture slot(s)",
            scene.program().id(),
            scene.geometry().id(),
            scene.textures().len()
        );
        self.scene = Some(scene);
        self.state = LoopState::Ready;
        Ok(())
    }

    /// Steps until the context asks to close.
    pub fn run<C: ContextProvider>(&mut self, ctx: &mut C) -> Result<(), StartupError> {
        if self.state != LoopState::Ready {
            return Err(StartupError::State {
                expected: LoopState::Ready,
                actual: self.state,
            });
        }
        while self.step(ctx) != LoopState::Terminated {}
        Ok(())
    }

    /// Runs exactly one loop iteration and returns the resulting state.
    ///
    /// Does nothing before `load` or after termination.
    pub fn step<C: ContextProvider>(&mut self, ctx: &mut C) -> LoopState {
        match self.state {
            LoopState::Ready => {
                log::info!("render loop running");
                self.state = LoopState::Running;
            }
            LoopState::Running => {}
            LoopState::Uninitialized | LoopState::Terminated => return self.state,
        }

        if ctx.should_close() {
            self.terminate();
            return self.state;
        }

        if !self.render_frame(ctx) {
            self.terminate();
            return self.state;
        }

        ctx.poll_events();
        if let Some((width, height)) = ctx.take_resize() {
            log::debug!("viewport resized to {width}x{height}");
            self.device.borrow_mut().set_viewport(width, height);
        }
        self.state
    }

    /// Returns `false` when the device can no longer produce frames.
    fn render_frame<C: ContextProvider>(&mut self, ctx: &mut C) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return true;
        };
        let frame = &mut self.frame;
        frame.begin();

        let begun = self.device.borrow_mut().begin_frame();
        match begun {
            Ok(()) => {}
            Err(e @ FrameError::Fatal(_)) => {
                log::error!("frame {}: {e}; stopping", frame.frame_index());
                return false;
            }
            Err(e) => {
                log::warn!("frame {}: {e}", frame.frame_index());
                self.stats.skipped_frames += 1;
                return true;
            }
        }
        self.device.borrow_mut().clear(self.clear_color);

        scene.program.use_program(frame);
        for slot in &scene.textures {
            scene
                .program
                .set_uniform(frame, slot.sampler(), UniformValue::Int(slot.slot() as i32));
        }
        for (name, value) in &scene.uniforms {
            scene.program.set_uniform(frame, name, *value);
        }

        for slot in &scene.textures {
            slot.bind(frame);
        }
        for sampler in frame.unbound_samplers(scene.program.sampler_slots()) {
            if self.reported_unbound.insert(sampler.to_string()) {
                log::warn!("sampler `{sampler}` has no texture bound; it reads a fallback");
            }
        }

        scene.geometry.bind(frame);
        if let Err(e) = scene.draw(frame) {
            log::error!("frame {}: draw dropped: {e}", frame.frame_index());
            self.stats.dropped_draws += 1;
        }

        ctx.present();
        self.device.borrow_mut().present();
        self.stats.presented += 1;
        true
    }

    fn terminate(&mut self) {
        self.state = LoopState::Terminated;
        if let Some(scene) = self.scene.take() {
            scene.release();
        }
        log::info!("render loop terminated");
        log::debug!(
            "{} frame(s) presented, {} draw(s) dropped, {} frame(s) skipped",
            self.stats.presented,
            self.stats.dropped_draws,
            self.stats.skipped_frames
        );
    }
}
