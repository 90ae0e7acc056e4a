use crate::device::{Device, DrawError, Primitive, UniformValue};
use crate::frame::FrameContext;
use crate::geometry::GeometryBuffer;
use crate::shader::ShaderProgram;
use crate::texture::{MAX_TEXTURE_SLOTS, SamplerSlot};

use super::error::SceneError;

/// The single draw a scene issues each frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCommand {
    /// `count` vertices in storage order.
    Arrays { primitive: Primitive, count: u32 },
    /// The first `count` indices.
    Indexed { primitive: Primitive, count: u32 },
}

/// Everything one frame draws, built once before the loop starts.
///
/// Resources are expected to have been created program first, then geometry, then
/// textures in slot-list order. Dropping the scene releases them in the reverse.
pub struct Scene<D: Device> {
    // Fields drop in declaration order.
    pub(crate) textures: Vec<SamplerSlot<D>>,
    pub(crate) geometry: GeometryBuffer<D>,
    pub(crate) program: ShaderProgram<D>,
    pub(crate) draw: DrawCommand,
    pub(crate) uniforms: Vec<(String, UniformValue)>,
}

impl<D: Device> Scene<D> {
    pub fn new(program: ShaderProgram<D>, geometry: GeometryBuffer<D>, draw: DrawCommand) -> Self {
        Self {
            textures: Vec::new(),
            geometry,
            program,
            draw,
            uniforms: Vec::new(),
        }
    }

    /// Adds a sampler slot; slots are bound in the order they are added.
    pub fn with_texture(mut self, slot: SamplerSlot<D>) -> Self {
        self.textures.push(slot);
        self
    }

    /// Adds a uniform written every frame after the sampler assignments.
    pub fn with_uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.uniforms.push((name.into(), value));
        self
    }

    pub fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    pub fn geometry(&self) -> &GeometryBuffer<D> {
        &self.geometry
    }

    pub fn textures(&self) -> &[SamplerSlot<D>] {
        &self.textures
    }

    pub fn draw_command(&self) -> DrawCommand {
        self.draw
    }

    /// Checks slot assignments. Sampler names the program does not declare are only
    /// logged: a mistyped name leaves the texture unread but is not fatal.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, slot) in self.textures.iter().enumerate() {
            if slot.slot() >= MAX_TEXTURE_SLOTS {
                return Err(SceneError::SlotOutOfRange {
                    sampler: slot.sampler().to_string(),
                    slot: slot.slot(),
                });
            }
            if let Some(first) = self.textures[..i].iter().find(|s| s.slot() == slot.slot()) {
                return Err(SceneError::DuplicateSlot {
                    slot: slot.slot(),
                    first: first.sampler().to_string(),
                    second: slot.sampler().to_string(),
                });
            }
            if !self.program.interface().is_sampler(slot.sampler()) {
                log::warn!(
                    "{} declares no sampler `{}`; slot {} will not be read",
                    self.program.id(),
                    slot.sampler(),
                    slot.slot()
                );
            }
        }
        Ok(())
    }

    /// Issues this scene's draw through the bound geometry.
    pub(crate) fn draw(&self, frame: &FrameContext) -> Result<(), DrawError> {
        match self.draw {
            DrawCommand::Arrays { primitive, count } => {
                self.geometry.draw_arrays(frame, primitive, count)
            }
            DrawCommand::Indexed { primitive, count } => {
                self.geometry.draw_indexed(frame, primitive, count)
            }
        }
    }

    /// Releases textures last-to-first, then the geometry, then the program.
    pub(crate) fn release(self) {
        drop(self);
    }
}

impl<D: Device> Drop for Scene<D> {
    fn drop(&mut self) {
        // A Vec drops front to back; the last texture created goes first.
        while let Some(slot) = self.textures.pop() {
            drop(slot);
        }
    }
}
