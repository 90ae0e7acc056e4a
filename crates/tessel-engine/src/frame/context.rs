use std::collections::BTreeMap;
use std::rc::Rc;

use crate::device::{DrawError, GeometryId, ProgramId, ProgramInterface, TextureId};
use crate::geometry::VertexLayout;

/// What is bound on the device right now, as far as this frame is concerned.
///
/// Every bind/use/draw goes through a `FrameContext`. Binding something that is already
/// bound in the current frame reports "unchanged" so the caller can skip the device
/// call. [`begin`](Self::begin) forgets everything, so the first bind of each frame
/// always reaches the device.
#[derive(Debug, Default)]
pub struct FrameContext {
    program: Option<(ProgramId, Rc<ProgramInterface>)>,
    geometry: Option<GeometryId>,
    textures: BTreeMap<u32, TextureId>,
    frame_index: u64,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame with nothing bound.
    pub fn begin(&mut self) {
        self.program = None;
        self.geometry = None;
        self.textures.clear();
        self.frame_index += 1;
    }

    /// Number of frames begun so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn active_program(&self) -> Option<ProgramId> {
        self.program.as_ref().map(|(id, _)| *id)
    }

    pub fn program_interface(&self) -> Option<&ProgramInterface> {
        self.program.as_ref().map(|(_, iface)| iface.as_ref())
    }

    pub fn bound_geometry(&self) -> Option<GeometryId> {
        self.geometry
    }

    pub fn texture_at(&self, slot: u32) -> Option<TextureId> {
        self.textures.get(&slot).copied()
    }

    /// Slots with a texture bound this frame, ascending.
    pub fn bound_slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.textures.keys().copied()
    }

    /// Returns `true` if `program` was not already active.
    pub(crate) fn set_program(&mut self, program: ProgramId, interface: &Rc<ProgramInterface>) -> bool {
        if self.active_program() == Some(program) {
            return false;
        }
        self.program = Some((program, Rc::clone(interface)));
        true
    }

    /// Returns `true` if `geometry` was not already bound.
    pub(crate) fn set_geometry(&mut self, geometry: GeometryId) -> bool {
        self.geometry.replace(geometry) != Some(geometry)
    }

    /// Returns `true` if `slot` did not already hold `texture`.
    pub(crate) fn set_texture(&mut self, slot: u32, texture: TextureId) -> bool {
        self.textures.insert(slot, texture) != Some(texture)
    }

    /// Sampler names among `assignments` whose slot has no texture bound.
    pub fn unbound_samplers<'a>(
        &self,
        assignments: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> Vec<&'a str> {
        assignments
            .into_iter()
            .filter(|(_, slot)| !self.textures.contains_key(slot))
            .map(|(name, _)| name)
            .collect()
    }

    /// Checks that a draw through `geometry` (read with `layout`) is well-defined.
    pub fn check_draw(&self, geometry: GeometryId, layout: &VertexLayout) -> Result<(), DrawError> {
        let (_, interface) = self.program.as_ref().ok_or(DrawError::NoProgram)?;
        let bound = self.geometry.ok_or(DrawError::NoGeometry)?;
        if bound != geometry {
            return Err(DrawError::GeometryNotBound {
                bound,
                requested: geometry,
            });
        }
        let missing = layout.missing_slots(&interface.inputs);
        if !missing.is_empty() {
            return Err(DrawError::MissingAttributes(missing));
        }
        Ok(())
    }
}
