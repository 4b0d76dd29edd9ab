// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque integer identifiers.
//!
//! Partition and node identity, and the consensus term, are opaque
//! integers handed to this crate by the embedder (the consensus module
//! assigns them). We wrap each in its own newtype so the compiler keeps
//! them from being mixed up at call sites.

/// Define a `Copy` newtype wrapper around `u64`.
///
/// Generates `new()`, `get()`, `Display`, `From<u64>`, and the ordering
/// traits. Mirrors the shape of a string-newtype `define_id!` macro but
/// over opaque integers, since partition/node ids here are assigned by
/// the consensus module rather than generated as UUID strings.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

define_int_id! {
    /// Identifies one partition (one consensus log group).
    pub struct PartitionId;
}

define_int_id! {
    /// Identifies this replica's node within the cluster.
    pub struct NodeId;
}

define_int_id! {
    /// Monotonically increasing consensus epoch.
    pub struct Term;
}

impl Term {
    /// The term before any consensus activity has taken place.
    pub const ZERO: Term = Term::new(0);
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
