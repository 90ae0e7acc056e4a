use super::error::LayoutError;

/// Scalar type of one attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    F32,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl ComponentType {
    /// Size of one component in bytes.
    pub const fn size(self) -> u32 {
        match self {
            ComponentType::U8 | ComponentType::I8 => 1,
            ComponentType::U16 | ComponentType::I16 => 2,
            ComponentType::F32 | ComponentType::U32 | ComponentType::I32 => 4,
        }
    }
}

/// How one shader input slot is read from interleaved vertex storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub slot: u32,
    pub components: u8,
    pub kind: ComponentType,
    /// Integer components are mapped to `[0, 1]` / `[-1, 1]` when set.
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

impl VertexAttribute {
    /// An `f32` attribute.
    pub const fn float(slot: u32, components: u8, stride: u32, offset: u32) -> Self {
        Self {
            slot,
            components,
            kind: ComponentType::F32,
            normalized: false,
            stride,
            offset,
        }
    }

    /// Bytes read per vertex.
    pub const fn byte_len(&self) -> u32 {
        self.components as u32 * self.kind.size()
    }

    /// One past the last byte read, relative to the vertex start. Widened so an
    /// offset near `u32::MAX` cannot wrap.
    pub const fn end(&self) -> u64 {
        self.offset as u64 + self.byte_len() as u64
    }
}

/// Validated attribute layout of one interleaved vertex buffer.
///
/// Attributes keep the order they were given in.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexLayout {
    pub fn new(attributes: impl IntoIterator<Item = VertexAttribute>) -> Result<Self, LayoutError> {
        let attributes: Vec<VertexAttribute> = attributes.into_iter().collect();
        let first = attributes.first().ok_or(LayoutError::Empty)?;
        let stride = first.stride;

        for (i, a) in attributes.iter().enumerate() {
            if a.stride == 0 {
                return Err(LayoutError::ZeroStride { slot: a.slot });
            }
            if a.stride != stride {
                return Err(LayoutError::StrideMismatch {
                    slot: a.slot,
                    stride: a.stride,
                    expected: stride,
                });
            }
            if !(1..=4).contains(&a.components) {
                return Err(LayoutError::ComponentCount {
                    slot: a.slot,
                    components: a.components,
                });
            }
            if a.end() > u64::from(stride) {
                return Err(LayoutError::OutOfStride {
                    slot: a.slot,
                    end: a.end(),
                    stride,
                });
            }
            if attributes[..i].iter().any(|b| b.slot == a.slot) {
                return Err(LayoutError::DuplicateSlot(a.slot));
            }
        }

        let mut by_offset: Vec<&VertexAttribute> = attributes.iter().collect();
        by_offset.sort_by_key(|a| a.offset);
        for pair in by_offset.windows(2) {
            if pair[0].end() > u64::from(pair[1].offset) {
                return Err(LayoutError::Overlap {
                    first: pair[0].slot,
                    second: pair[1].slot,
                });
            }
        }

        Ok(Self { attributes, stride })
    }

    /// Tightly packed `f32` attributes on slots `0..n`, one entry per slot giving its
    /// component count.
    pub fn packed_f32(components: &[u8]) -> Result<Self, LayoutError> {
        let stride: u32 = components.iter().map(|&c| c as u32 * 4).sum();
        let mut offset = 0;
        let attributes = components.iter().enumerate().map(|(slot, &c)| {
            let attr = VertexAttribute::float(slot as u32, c, stride, offset);
            offset += c as u32 * 4;
            attr
        });
        Self::new(attributes.collect::<Vec<_>>())
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Bytes between consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn has_slot(&self, slot: u32) -> bool {
        self.attributes.iter().any(|a| a.slot == slot)
    }

    /// Slots of `required` this layout does not describe.
    pub fn missing_slots(&self, required: &[u32]) -> Vec<u32> {
        required.iter().copied().filter(|&s| !self.has_slot(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── accepted layouts ─────────────────────────────────────────────────

    #[test]
    fn packed_position_color_uv() {
        let layout = VertexLayout::packed_f32(&[3, 3, 2]).unwrap();
        assert_eq!(layout.stride(), 32);
        let offsets: Vec<u32> = layout.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert_eq!(layout.attributes()[2].end(), 32);
    }

    #[test]
    fn attribute_may_end_exactly_at_stride() {
        let layout = VertexLayout::new([VertexAttribute::float(0, 3, 12, 0)]);
        assert!(layout.is_ok());
    }

    #[test]
    fn padding_between_attributes_is_allowed() {
        let layout = VertexLayout::new([
            VertexAttribute::float(0, 2, 24, 0),
            VertexAttribute::float(1, 2, 24, 16),
        ]);
        assert!(layout.is_ok());
    }

    #[test]
    fn normalized_bytes() {
        let color = VertexAttribute {
            slot: 1,
            components: 4,
            kind: ComponentType::U8,
            normalized: true,
            stride: 16,
            offset: 12,
        };
        let layout = VertexLayout::new([VertexAttribute::float(0, 3, 16, 0), color]).unwrap();
        assert_eq!(layout.attributes()[1].byte_len(), 4);
    }

    // ── rejected layouts ─────────────────────────────────────────────────

    #[test]
    fn byte_range_past_stride_is_rejected() {
        let err = VertexLayout::new([
            VertexAttribute::float(0, 3, 20, 0),
            VertexAttribute::float(1, 3, 20, 12),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::OutOfStride {
                slot: 1,
                end: 24,
                stride: 20
            }
        );
    }

    #[test]
    fn offset_near_u32_max_is_out_of_stride() {
        let err = VertexLayout::new([VertexAttribute::float(0, 4, 16, u32::MAX - 3)]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::OutOfStride {
                slot: 0,
                end: u64::from(u32::MAX) + 13,
                stride: 16
            }
        );
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert_eq!(VertexLayout::new([]).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let err = VertexLayout::new([VertexAttribute::float(0, 3, 0, 0)]).unwrap_err();
        assert_eq!(err, LayoutError::ZeroStride { slot: 0 });
    }

    #[test]
    fn component_count_out_of_range() {
        let err = VertexLayout::new([VertexAttribute::float(0, 5, 32, 0)]).unwrap_err();
        assert_eq!(err, LayoutError::ComponentCount { slot: 0, components: 5 });
        let err = VertexLayout::new([VertexAttribute::float(0, 0, 32, 0)]).unwrap_err();
        assert_eq!(err, LayoutError::ComponentCount { slot: 0, components: 0 });
    }

    #[test]
    fn mixed_strides_are_rejected() {
        let err = VertexLayout::new([
            VertexAttribute::float(0, 3, 24, 0),
            VertexAttribute::float(1, 3, 32, 12),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::StrideMismatch {
                slot: 1,
                stride: 32,
                expected: 24
            }
        );
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let err = VertexLayout::new([
            VertexAttribute::float(0, 2, 16, 0),
            VertexAttribute::float(0, 2, 16, 8),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateSlot(0));
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let err = VertexLayout::new([
            VertexAttribute::float(0, 3, 24, 0),
            VertexAttribute::float(1, 3, 24, 8),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::Overlap { first: 0, second: 1 });
    }

    // ── queries ──────────────────────────────────────────────────────────

    #[test]
    fn missing_slots_lists_uncovered_inputs() {
        let layout = VertexLayout::packed_f32(&[3, 2]).unwrap();
        assert!(layout.missing_slots(&[0, 1]).is_empty());
        assert_eq!(layout.missing_slots(&[0, 2, 3]), vec![2, 3]);
    }
}
