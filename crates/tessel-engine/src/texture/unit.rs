use crate::device::{Device, SharedDevice, TextureId, TextureOrigin};
use crate::frame::FrameContext;

use super::error::LoadError;
use super::mipmap::mip_chain;
use super::pixels::{PixelFormat, PixelSource};
use super::sampling::{MipmapPolicy, SamplingConfig};

/// Number of sampler slots a frame can bind.
pub const MAX_TEXTURE_SLOTS: u32 = 16;

/// A device texture bound to one numbered slot.
///
/// Released from the device on drop.
pub struct TextureUnit<D: Device> {
    device: SharedDevice<D>,
    id: TextureId,
    slot: u32,
    width: u32,
    height: u32,
    format: PixelFormat,
    levels: u32,
    sampling: SamplingConfig,
}

impl<D: Device> TextureUnit<D> {
    /// Decodes `source`, applies `sampling` and uploads the result for `slot`.
    ///
    /// Images are flipped on decode when the device puts texture row 0 at the bottom.
    pub fn load(
        device: &SharedDevice<D>,
        source: impl Into<PixelSource>,
        slot: u32,
        sampling: SamplingConfig,
    ) -> Result<Self, LoadError> {
        if slot >= MAX_TEXTURE_SLOTS {
            return Err(LoadError::SlotOutOfRange {
                slot,
                max: MAX_TEXTURE_SLOTS,
            });
        }
        let source = source.into();
        let flip = device.borrow().texture_origin() == TextureOrigin::BottomLeft;
        let base = source.decode(flip)?;
        let (width, height, format) = (base.width(), base.height(), base.format());

        let sampling = sampling.effective();
        let levels = match sampling.mipmaps {
            MipmapPolicy::Generate => mip_chain(base),
            MipmapPolicy::None => vec![base],
        };
        let id = device.borrow_mut().create_texture(&levels, &sampling);
        log::info!(
            "loaded {source} as {id}: {width}x{height} {format:?}, {} level(s), slot {slot}",
            levels.len()
        );

        Ok(Self {
            device: device.clone(),
            id,
            slot,
            width,
            height,
            format,
            levels: levels.len() as u32,
            sampling,
        })
    }

    /// Binds this texture to its slot. Rebinding within a frame is free.
    pub fn bind(&self, frame: &mut FrameContext) {
        if frame.set_texture(self.slot, self.id) {
            self.device.borrow_mut().bind_texture(self.slot, self.id);
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.levels
    }

    /// Sampling state after any fallback applied at load.
    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }
}

impl<D: Device> Drop for TextureUnit<D> {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => {
                device.delete_texture(self.id);
                log::debug!("released {}", self.id);
            }
            Err(_) => log::error!("device busy, leaking {}", self.id),
        }
    }
}

impl<D: Device> std::fmt::Debug for TextureUnit<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureUnit")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("size", &(self.width, self.height))
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

/// A sampler uniform, the slot it reads and the texture loaded for it, if any.
pub struct SamplerSlot<D: Device> {
    sampler: String,
    slot: u32,
    texture: Option<TextureUnit<D>>,
}

impl<D: Device> SamplerSlot<D> {
    pub fn new(sampler: impl Into<String>, texture: TextureUnit<D>) -> Self {
        Self {
            sampler: sampler.into(),
            slot: texture.slot(),
            texture: Some(texture),
        }
    }

    /// A slot with nothing to bind.
    pub fn empty(sampler: impl Into<String>, slot: u32) -> Self {
        Self {
            sampler: sampler.into(),
            slot,
            texture: None,
        }
    }

    /// Loads the texture for `sampler`; a failed load is logged and leaves the slot
    /// empty.
    pub fn load(
        device: &SharedDevice<D>,
        sampler: impl Into<String>,
        source: impl Into<PixelSource>,
        slot: u32,
        sampling: SamplingConfig,
    ) -> Self {
        let sampler = sampler.into();
        let source = source.into();
        match TextureUnit::load(device, source.clone(), slot, sampling) {
            Ok(texture) => Self::new(sampler, texture),
            Err(e) => {
                log::error!("texture {source} for sampler `{sampler}` failed to load: {e}; slot {slot} left unbound");
                Self::empty(sampler, slot)
            }
        }
    }

    /// Binds the texture to the slot; does nothing for an empty slot.
    pub fn bind(&self, frame: &mut FrameContext) {
        if let Some(texture) = &self.texture {
            texture.bind(frame);
        }
    }

    pub fn sampler(&self) -> &str {
        &self.sampler
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn texture(&self) -> Option<&TextureUnit<D>> {
        self.texture.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }
}

impl<D: Device> std::fmt::Debug for SamplerSlot<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerSlot")
            .field("sampler", &self.sampler)
            .field("slot", &self.slot)
            .field("texture", &self.texture)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, RecordingDevice, share};
    use crate::texture::PixelData;

    fn checker() -> PixelData {
        PixelData::new(2, 2, PixelFormat::Rgb, vec![0, 0, 0, 9, 9, 9, 9, 9, 9, 0, 0, 0]).unwrap()
    }

    // ── loading ──────────────────────────────────────────────────────────

    #[test]
    fn load_generates_mip_chain() {
        let device = share(RecordingDevice::new());
        let tex = TextureUnit::load(&device, checker(), 0, SamplingConfig::default()).unwrap();
        assert_eq!(tex.mip_levels(), 2);
        assert_eq!(
            device.borrow().calls(),
            &[DeviceCall::CreateTexture {
                texture: tex.id(),
                width: 2,
                height: 2,
                channels: 3,
                levels: 2
            }]
        );
    }

    #[test]
    fn load_without_mipmaps_downgrades_filter() {
        let device = share(RecordingDevice::new());
        let sampling = SamplingConfig::default().with_mipmaps(MipmapPolicy::None);
        let tex = TextureUnit::load(&device, checker(), 0, sampling).unwrap();
        assert_eq!(tex.mip_levels(), 1);
        assert!(!tex.sampling().min_filter.uses_mipmaps());
    }

    #[test]
    fn slot_out_of_range() {
        let device = share(RecordingDevice::new());
        let err = TextureUnit::load(&device, checker(), MAX_TEXTURE_SLOTS, SamplingConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::SlotOutOfRange { slot: 16, .. }));
        assert!(device.borrow().calls().is_empty());
    }

    #[test]
    fn undecodable_bytes_fail_to_load() {
        let device = share(RecordingDevice::new());
        let source = PixelSource::Memory(b"\x89PNG not really".to_vec());
        assert!(TextureUnit::load(&device, source, 0, SamplingConfig::default()).is_err());
        assert!(device.borrow().calls().is_empty());
    }

    // ── sampler slots ────────────────────────────────────────────────────

    #[test]
    fn failed_slot_is_empty_and_binds_nothing() {
        let device = share(RecordingDevice::new());
        let slot = SamplerSlot::load(
            &device,
            "texture2",
            "/nonexistent/awesomeface.png",
            1,
            SamplingConfig::default(),
        );
        assert!(!slot.is_loaded());
        assert_eq!(slot.slot(), 1);

        let mut frame = FrameContext::new();
        slot.bind(&mut frame);
        assert!(device.borrow().calls().is_empty());
        assert_eq!(frame.texture_at(1), None);
    }

    #[test]
    fn bind_is_elided_within_a_frame() {
        let device = share(RecordingDevice::new());
        let slot = SamplerSlot::load(&device, "texture1", checker(), 3, SamplingConfig::nearest());
        let id = slot.texture().unwrap().id();
        device.borrow_mut().clear_calls();

        let mut frame = FrameContext::new();
        slot.bind(&mut frame);
        slot.bind(&mut frame);
        assert_eq!(
            device.borrow().calls(),
            &[DeviceCall::BindTexture { slot: 3, texture: id }]
        );

        frame.begin();
        slot.bind(&mut frame);
        assert_eq!(device.borrow().calls().len(), 2);
    }

    #[test]
    fn drop_deletes_texture() {
        let device = share(RecordingDevice::new());
        let tex = TextureUnit::load(&device, checker(), 0, SamplingConfig::nearest()).unwrap();
        let id = tex.id();
        drop(tex);
        assert_eq!(device.borrow().calls().last(), Some(&DeviceCall::DeleteTexture(id)));
    }
}
