use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::device::{
    Device, LinkedProgram, ProgramId, ProgramInterface, ShaderStage, SharedDevice, StageId,
    UniformLocation, UniformValue,
};
use crate::frame::FrameContext;

use super::error::{CompileError, LinkError, ProgramError};
use super::stage::CompiledStage;

/// A linked vertex/fragment program.
///
/// Uniform names resolve to device locations on first use; misses are cached as well,
/// so an unknown name is reported once and then ignored. Released from the device on
/// drop.
pub struct ShaderProgram<D: Device> {
    device: SharedDevice<D>,
    id: ProgramId,
    interface: Rc<ProgramInterface>,
    locations: HashMap<String, Option<UniformLocation>>,
    sampler_slots: BTreeMap<String, u32>,
}

impl<D: Device> ShaderProgram<D> {
    /// Compiles one stage from inline source.
    pub fn compile(
        device: &SharedDevice<D>,
        stage: ShaderStage,
        source: &str,
    ) -> Result<CompiledStage<D>, CompileError> {
        CompiledStage::compile(device, stage, source, "<inline>")
    }

    /// Links exactly one vertex and one fragment stage. The stages are released once
    /// the link has been attempted, whatever its outcome.
    pub fn link(device: &SharedDevice<D>, stages: Vec<CompiledStage<D>>) -> Result<Self, LinkError> {
        let count = |kind| stages.iter().filter(|s| s.stage() == kind).count();
        let (vertex, fragment) = (count(ShaderStage::Vertex), count(ShaderStage::Fragment));
        if vertex != 1 || fragment != 1 {
            return Err(LinkError {
                diagnostics: format!(
                    "expected one vertex and one fragment stage, got {vertex} vertex and {fragment} fragment"
                ),
            });
        }

        let ids: Vec<StageId> = stages.iter().map(CompiledStage::id).collect();
        let linked = device.borrow_mut().link_program(&ids);
        drop(stages);

        let LinkedProgram { id, interface } = linked.map_err(|diagnostics| LinkError { diagnostics })?;
        log::info!(
            "linked {id}: inputs {:?}, samplers {:?}, uniforms {:?}",
            interface.inputs,
            interface.samplers,
            interface.uniforms
        );
        Ok(Self {
            device: device.clone(),
            id,
            interface: Rc::new(interface),
            locations: HashMap::new(),
            sampler_slots: BTreeMap::new(),
        })
    }

    /// Compiles and links a program from two inline sources.
    pub fn from_sources(
        device: &SharedDevice<D>,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self, ProgramError> {
        Self::build(device, (vertex, "<vertex>"), (fragment, "<fragment>"))
    }

    /// Reads both stage files fully, then compiles and links them.
    pub fn from_files(
        device: &SharedDevice<D>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ProgramError> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| ProgramError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let vertex = read(vertex_path)?;
        let fragment = read(fragment_path)?;
        let vertex_origin = vertex_path.display().to_string();
        let fragment_origin = fragment_path.display().to_string();
        Self::build(
            device,
            (vertex.as_str(), vertex_origin.as_str()),
            (fragment.as_str(), fragment_origin.as_str()),
        )
    }

    fn build(
        device: &SharedDevice<D>,
        (vertex, vertex_origin): (&str, &str),
        (fragment, fragment_origin): (&str, &str),
    ) -> Result<Self, ProgramError> {
        let vertex = CompiledStage::compile(device, ShaderStage::Vertex, vertex, vertex_origin);
        let fragment =
            CompiledStage::compile(device, ShaderStage::Fragment, fragment, fragment_origin);

        match (vertex, fragment) {
            (Ok(vertex), Ok(fragment)) => Self::link(device, vec![vertex, fragment]).map_err(|e| {
                log::error!("{e}");
                ProgramError::Link(e)
            }),
            (vertex, fragment) => {
                let errors: Vec<CompileError> =
                    [vertex.err(), fragment.err()].into_iter().flatten().collect();
                for e in &errors {
                    log::error!("{e}");
                }
                Err(ProgramError::Compile(errors))
            }
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    /// Activates the program for subsequent uniform writes and draws.
    pub fn use_program(&self, frame: &mut FrameContext) {
        if frame.set_program(self.id, &self.interface) {
            self.device.borrow_mut().use_program(self.id);
        }
    }

    /// Writes `value` to the uniform called `name`.
    ///
    /// Sampler uniforms take `UniformValue::Int(slot)`; the assignment is remembered
    /// for [`sampler_slots`](Self::sampler_slots). Writes to a program that is not
    /// active in `frame` are dropped with a warning.
    pub fn set_uniform(&mut self, frame: &FrameContext, name: &str, value: UniformValue) {
        if frame.active_program() != Some(self.id) {
            log::warn!("uniform `{name}` written to {} while it is not active; ignored", self.id);
            return;
        }

        if self.interface.is_sampler(name) {
            match value {
                UniformValue::Int(slot) if slot >= 0 => {
                    self.sampler_slots.insert(name.to_string(), slot as u32);
                }
                other => {
                    log::warn!("sampler `{name}` takes a slot index, got {other:?}; ignored");
                    return;
                }
            }
        }

        if let Some(location) = self.location(name) {
            self.device.borrow_mut().set_uniform(location, value);
        }
    }

    /// Every sampler the program declares with the slot it reads. Samplers never
    /// assigned read slot 0.
    pub fn sampler_slots(&self) -> Vec<(&str, u32)> {
        self.interface
            .samplers
            .iter()
            .map(|name| {
                let slot = self.sampler_slots.get(name).copied().unwrap_or(0);
                (name.as_str(), slot)
            })
            .collect()
    }

    fn location(&mut self, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.get(name) {
            return *cached;
        }
        let location = self.device.borrow_mut().uniform_location(self.id, name);
        if location.is_none() {
            log::warn!("{} has no active uniform `{name}`", self.id);
        }
        self.locations.insert(name.to_string(), location);
        location
    }
}

impl<D: Device> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => {
                device.delete_program(self.id);
                log::debug!("released {}", self.id);
            }
            Err(_) => log::error!("device busy, leaking {}", self.id),
        }
    }
}

impl<D: Device> std::fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}
