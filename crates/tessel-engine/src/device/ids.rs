use std::fmt;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw numeric value, unique per device instance.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

resource_id!(
    /// Compiled shader stage.
    StageId, "stage"
);
resource_id!(
    /// Linked shader program.
    ProgramId, "program"
);
resource_id!(
    /// Vertex storage + optional index storage + attribute layout.
    GeometryId, "geometry"
);
resource_id!(
    /// Device texture object with its sampling state.
    TextureId, "texture"
);
resource_id!(
    /// Uniform location inside one linked program.
    UniformLocation, "uniform"
);

/// Monotonic id source shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}
