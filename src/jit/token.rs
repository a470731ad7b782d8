//! Identity keys for the runtime objects the store is indexed by.
//!
//! The surrounding runtime owns methods, modules and domains; this crate only needs a
//! stable, equality-comparable key for each. Each key is a thin newtype over the
//! runtime's own identity value (typically the object's address), so keys from
//! different kinds can never be confused with each other.
//!
//! [`TypeHandle`] is different: it is the opaque, pointer-width type reference carried by
//! every [`crate::jit::VarInfo`]. It is copied into records verbatim and never interpreted.

use std::fmt;

macro_rules! identity {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a key from the runtime's identity value.
            #[must_use]
            pub fn new(value: u64) -> Self {
                $name(value)
            }

            /// The raw identity value.
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "(0x{:x})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{:x}", self.0)
            }
        }
    };
}

identity!(
    /// Identity of a compiled method.
    MethodId,
    "MethodId"
);

identity!(
    /// Identity of a loaded code module.
    ModuleId,
    "ModuleId"
);

identity!(
    /// Identity of an execution domain.
    DomainId,
    "DomainId"
);

/// Opaque pointer-width type reference of a variable descriptor.
///
/// Stored in records as a native-endian `usize`, so a record is only meaningful to the
/// process that wrote it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeHandle(pub usize);

impl TypeHandle {
    /// The null type reference.
    pub const NULL: TypeHandle = TypeHandle(0);

    /// Returns `true` for the null type reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle(0x{:x})", self.0)
    }
}
