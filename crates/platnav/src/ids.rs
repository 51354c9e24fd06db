use std::{fmt, ops::Deref};

/// The index of a [`Node`](crate::Node) in a [`NavMesh`](crate::NavMesh).
///
/// Only meaningful for the mesh generation it was obtained from. See [`NavMesh::generation`](crate::NavMesh::generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(pub u32);

/// The index of an [`Edge`](crate::Edge) in a [`NavMesh`](crate::NavMesh).
///
/// Only meaningful for the mesh generation it was obtained from. See [`NavMesh::generation`](crate::NavMesh::generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct EdgeId(pub u32);

macro_rules! index_newtype {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// The position of the item in its backing storage.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Deref for $name {
            type Target = u32;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                $name(value)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                $name(value as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_newtype!(NodeId, "n");
index_newtype!(EdgeId, "e");
