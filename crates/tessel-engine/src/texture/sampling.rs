/// Texture coordinate wrapping outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// Filter within one mip level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Minification filter: a texel filter, optionally combined with a filter between mip
/// levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    /// Filter within a level.
    pub const fn texel(self) -> Filter {
        match self {
            MinFilter::Nearest | MinFilter::NearestMipmapNearest | MinFilter::NearestMipmapLinear => {
                Filter::Nearest
            }
            MinFilter::Linear | MinFilter::LinearMipmapNearest | MinFilter::LinearMipmapLinear => {
                Filter::Linear
            }
        }
    }

    /// Filter between levels, if the filter reads mipmaps at all.
    pub const fn mipmap(self) -> Option<Filter> {
        match self {
            MinFilter::Nearest | MinFilter::Linear => None,
            MinFilter::NearestMipmapNearest | MinFilter::LinearMipmapNearest => {
                Some(Filter::Nearest)
            }
            MinFilter::NearestMipmapLinear | MinFilter::LinearMipmapLinear => Some(Filter::Linear),
        }
    }

    pub const fn uses_mipmaps(self) -> bool {
        self.mipmap().is_some()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MipmapPolicy {
    /// Upload the base level only.
    None,
    /// Generate a full chain down to 1×1 at load time.
    Generate,
}

/// Sampling state attached to a texture at load time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SamplingConfig {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: MinFilter,
    pub mag_filter: Filter,
    pub mipmaps: MipmapPolicy,
}

impl Default for SamplingConfig {
    /// Mirrored repeat on both axes, trilinear minification, linear magnification and
    /// a generated mip chain.
    fn default() -> Self {
        Self {
            wrap_s: WrapMode::MirroredRepeat,
            wrap_t: WrapMode::MirroredRepeat,
            min_filter: MinFilter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            mipmaps: MipmapPolicy::Generate,
        }
    }
}

impl SamplingConfig {
    /// Point sampling, clamped, no mipmaps.
    pub const fn nearest() -> Self {
        Self {
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            min_filter: MinFilter::Nearest,
            mag_filter: Filter::Nearest,
            mipmaps: MipmapPolicy::None,
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_filters(mut self, min: MinFilter, mag: Filter) -> Self {
        self.min_filter = min;
        self.mag_filter = mag;
        self
    }

    pub fn with_mipmaps(mut self, mipmaps: MipmapPolicy) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    /// The configuration a device can honor: a mipmapped min filter without a mip
    /// chain falls back to its texel filter.
    pub fn effective(self) -> Self {
        if self.mipmaps == MipmapPolicy::None && self.min_filter.uses_mipmaps() {
            let min_filter = match self.min_filter.texel() {
                Filter::Nearest => MinFilter::Nearest,
                Filter::Linear => MinFilter::Linear,
            };
            log::warn!(
                "min filter {:?} needs mipmaps but none are generated; using {min_filter:?}",
                self.min_filter
            );
            return Self { min_filter, ..self };
        }
        self
    }
}
