use std::fmt;

/// Rejected attribute layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No attributes at all.
    Empty,
    /// Stride of zero bytes.
    ZeroStride { slot: u32 },
    /// Component count outside `1..=4`.
    ComponentCount { slot: u32, components: u8 },
    /// Attributes of one interleaved buffer disagree on the stride.
    StrideMismatch { slot: u32, stride: u32, expected: u32 },
    /// Two attributes feed the same input slot.
    DuplicateSlot(u32),
    /// `offset + components * size` runs past the stride.
    OutOfStride { slot: u32, end: u64, stride: u32 },
    /// Byte ranges of two attributes overlap.
    Overlap { first: u32, second: u32 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "vertex layout has no attributes"),
            LayoutError::ZeroStride { slot } => write!(f, "attribute {slot} has a zero stride"),
            LayoutError::ComponentCount { slot, components } => {
                write!(f, "attribute {slot} has {components} components (expected 1..=4)")
            }
            LayoutError::StrideMismatch { slot, stride, expected } => write!(
                f,
                "attribute {slot} has stride {stride} but the interleaved buffer uses {expected}"
            ),
            LayoutError::DuplicateSlot(slot) => write!(f, "slot {slot} is described twice"),
            LayoutError::OutOfStride { slot, end, stride } => write!(
                f,
                "attribute {slot} ends at byte {end}, past the {stride}-byte stride"
            ),
            LayoutError::Overlap { first, second } => {
                write!(f, "attributes {first} and {second} overlap")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Rejected geometry upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    Layout(LayoutError),
    /// Vertex data is empty.
    NoVertices,
    /// Vertex data is not a whole number of strides.
    PartialVertex { bytes: usize, stride: u32 },
    /// An index references a vertex past the end of the vertex data.
    IndexOutOfRange { index: u32, vertex_count: u32 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::Layout(e) => write!(f, "invalid vertex layout: {e}"),
            GeometryError::NoVertices => write!(f, "geometry has no vertex data"),
            GeometryError::PartialVertex { bytes, stride } => write!(
                f,
                "{bytes} bytes of vertex data is not a multiple of the {stride}-byte stride"
            ),
            GeometryError::IndexOutOfRange { index, vertex_count } => write!(
                f,
                "index {index} is out of range for {vertex_count} vertices"
            ),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for GeometryError {
    fn from(e: LayoutError) -> Self {
        GeometryError::Layout(e)
    }
}
