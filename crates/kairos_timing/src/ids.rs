//! Opaque ID newtypes for graph and constraint entities.
//!
//! All IDs are dense, zero-based `u32` indices into the arrays owned by the
//! [`TimingGraph`](crate::graph::TimingGraph) or
//! [`TimingConstraints`](crate::constraints::TimingConstraints). They stay
//! valid for the lifetime of their owner.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Creates an ID from an array index.
            ///
            /// # Panics
            ///
            /// Panics if `index` does not fit in a `u32`.
            pub fn from_index(index: usize) -> Self {
                match u32::try_from(index) {
                    Ok(raw) => Self(raw),
                    Err(_) => panic!(concat!(stringify!($name), " index {} overflows u32"), index),
                }
            }

            /// Returns the raw `u32` index.
            pub const fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as `usize`, for array access.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A node in the timing graph.
    NodeId,
    "n"
);

define_id!(
    /// An edge in the timing graph.
    EdgeId,
    "e"
);

define_id!(
    /// A clock domain declared in the timing constraints.
    DomainId,
    "clk"
);

define_id!(
    /// A level of the timing graph's levelization.
    LevelId,
    "L"
);

impl LevelId {
    /// The level holding every node without predecessors.
    pub const ZERO: LevelId = LevelId::from_raw(0);
}
