use crate::device::{Device, ShaderStage, SharedDevice, StageId};

use super::error::CompileError;

/// One compiled shader stage, waiting to be linked.
///
/// Linking consumes the stage; dropping it unlinked releases it.
pub struct CompiledStage<D: Device> {
    device: SharedDevice<D>,
    id: StageId,
    stage: ShaderStage,
}

impl<D: Device> CompiledStage<D> {
    /// Compiles `source` as `stage`. `origin` names the source in diagnostics.
    pub fn compile(
        device: &SharedDevice<D>,
        stage: ShaderStage,
        source: &str,
        origin: &str,
    ) -> Result<Self, CompileError> {
        let compiled = device.borrow_mut().compile_stage(stage, source);
        match compiled {
            Ok(id) => {
                log::debug!("compiled {stage} shader `{origin}` as {id}");
                Ok(Self {
                    device: device.clone(),
                    id,
                    stage,
                })
            }
            Err(diagnostics) => Err(CompileError {
                stage,
                origin: origin.to_string(),
                diagnostics,
            }),
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<D: Device> Drop for CompiledStage<D> {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => device.delete_stage(self.id),
            Err(_) => log::error!("device busy, leaking {}", self.id),
        }
    }
}
