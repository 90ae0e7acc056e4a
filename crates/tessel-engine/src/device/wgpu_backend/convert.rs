//! Harness enums to their wgpu counterparts.

use std::borrow::Cow;

use crate::device::Primitive;
use crate::geometry::{ComponentType, VertexAttribute};
use crate::texture::{Filter, PixelData, PixelFormat, SamplingConfig, WrapMode};

pub(crate) fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Points => wgpu::PrimitiveTopology::PointList,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
        Primitive::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Primitive::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

pub(crate) fn strip_index_format(primitive: Primitive) -> Option<wgpu::IndexFormat> {
    match primitive {
        Primitive::LineStrip | Primitive::TriangleStrip => Some(wgpu::IndexFormat::Uint32),
        _ => None,
    }
}

/// `None` for combinations without a mapped vertex format (3-component and single
/// 8/16-bit components, normalized 32-bit integers).
pub(crate) fn vertex_format(attr: &VertexAttribute) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    let format = match (attr.kind, attr.normalized, attr.components) {
        (ComponentType::F32, _, 1) => F::Float32,
        (ComponentType::F32, _, 2) => F::Float32x2,
        (ComponentType::F32, _, 3) => F::Float32x3,
        (ComponentType::F32, _, 4) => F::Float32x4,
        (ComponentType::U32, false, 1) => F::Uint32,
        (ComponentType::U32, false, 2) => F::Uint32x2,
        (ComponentType::U32, false, 3) => F::Uint32x3,
        (ComponentType::U32, false, 4) => F::Uint32x4,
        (ComponentType::I32, false, 1) => F::Sint32,
        (ComponentType::I32, false, 2) => F::Sint32x2,
        (ComponentType::I32, false, 3) => F::Sint32x3,
        (ComponentType::I32, false, 4) => F::Sint32x4,
        (ComponentType::U8, false, 2) => F::Uint8x2,
        (ComponentType::U8, false, 4) => F::Uint8x4,
        (ComponentType::U8, true, 2) => F::Unorm8x2,
        (ComponentType::U8, true, 4) => F::Unorm8x4,
        (ComponentType::I8, false, 2) => F::Sint8x2,
        (ComponentType::I8, false, 4) => F::Sint8x4,
        (ComponentType::I8, true, 2) => F::Snorm8x2,
        (ComponentType::I8, true, 4) => F::Snorm8x4,
        (ComponentType::U16, false, 2) => F::Uint16x2,
        (ComponentType::U16, false, 4) => F::Uint16x4,
        (ComponentType::U16, true, 2) => F::Unorm16x2,
        (ComponentType::U16, true, 4) => F::Unorm16x4,
        (ComponentType::I16, false, 2) => F::Sint16x2,
        (ComponentType::I16, false, 4) => F::Sint16x4,
        (ComponentType::I16, true, 2) => F::Snorm16x2,
        (ComponentType::I16, true, 4) => F::Snorm16x4,
        _ => return None,
    };
    Some(format)
}

/// Every texture is stored as sRGB RGBA so sampling yields the same color whatever
/// the source channel count.
pub(crate) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub(crate) const TEXEL_SIZE: u32 = 4;

/// Pixel bytes in [`TEXTURE_FORMAT`] layout. Luma is replicated into RGB.
pub(crate) fn texel_bytes(data: &PixelData) -> Cow<'_, [u8]> {
    match data.format() {
        PixelFormat::Rgba => Cow::Borrowed(data.pixels()),
        _ => Cow::Owned(data.to_rgba8()),
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

fn mipmap_filter_mode(filter: Filter) -> wgpu::MipmapFilterMode {
    match filter {
        Filter::Nearest => wgpu::MipmapFilterMode::Nearest,
        Filter::Linear => wgpu::MipmapFilterMode::Linear,
    }
}

/// Sampler for `sampling`. A min filter without a mip component samples the base
/// level only.
pub(crate) fn sampler_descriptor(sampling: &SamplingConfig) -> wgpu::SamplerDescriptor<'static> {
    let mip = sampling.min_filter.mipmap();
    wgpu::SamplerDescriptor {
        label: Some("tessel sampler"),
        address_mode_u: address_mode(sampling.wrap_s),
        address_mode_v: address_mode(sampling.wrap_t),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter_mode(sampling.mag_filter),
        min_filter: filter_mode(sampling.min_filter.texel()),
        mipmap_filter: mipmap_filter_mode(mip.unwrap_or(Filter::Nearest)),
        lod_min_clamp: 0.0,
        lod_max_clamp: if mip.is_some() { 32.0 } else { 0.0 },
        compare: None,
        anisotropy_clamp: 1,
        border_color: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::MinFilter;

    #[test]
    fn float_and_normalized_formats() {
        assert_eq!(
            vertex_format(&VertexAttribute::float(0, 3, 12, 0)),
            Some(wgpu::VertexFormat::Float32x3)
        );
        let color = VertexAttribute {
            kind: ComponentType::U8,
            normalized: true,
            components: 4,
            ..VertexAttribute::float(1, 4, 16, 12)
        };
        assert_eq!(vertex_format(&color), Some(wgpu::VertexFormat::Unorm8x4));
        let odd = VertexAttribute { components: 3, ..color };
        assert_eq!(vertex_format(&odd), None);
    }

    #[test]
    fn luma_uploads_as_gray_rgba() {
        let gray = PixelData::new(2, 1, PixelFormat::Luma, vec![10, 200]).unwrap();
        assert_eq!(&*texel_bytes(&gray), &[10, 10, 10, 255, 200, 200, 200, 255]);

        let gray_alpha = PixelData::new(1, 1, PixelFormat::LumaAlpha, vec![90, 128]).unwrap();
        assert_eq!(&*texel_bytes(&gray_alpha), &[90, 90, 90, 128]);

        let rgb = PixelData::new(1, 1, PixelFormat::Rgb, vec![1, 2, 3]).unwrap();
        assert_eq!(&*texel_bytes(&rgb), &[1, 2, 3, 255]);
    }

    #[test]
    fn rgba_uploads_without_copying() {
        let rgba = PixelData::new(1, 1, PixelFormat::Rgba, vec![1, 2, 3, 4]).unwrap();
        assert!(matches!(texel_bytes(&rgba), Cow::Borrowed(_)));
        assert_eq!(texel_bytes(&rgba).len() as u32, TEXEL_SIZE);
    }

    #[test]
    fn default_sampling_maps_to_trilinear_mirror() {
        let desc = sampler_descriptor(&SamplingConfig::default());
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::MirrorRepeat);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::MipmapFilterMode::Linear);
        assert_eq!(desc.lod_max_clamp, 32.0);
    }

    #[test]
    fn non_mip_filter_clamps_to_base_level() {
        let cfg = SamplingConfig::default().with_filters(MinFilter::Nearest, Filter::Nearest);
        let desc = sampler_descriptor(&cfg);
        assert_eq!(desc.lod_max_clamp, 0.0);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
    }
}
