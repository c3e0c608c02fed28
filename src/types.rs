//! Core index types, sentinels, and compile-time limits.
//!
//! Vertices are plain `usize` indices into the graph's vertex table. All
//! "no vertex" / "not a member" / "no value" states are expressed with the
//! explicit sentinel constants below, which live outside the valid index
//! range `0..MAX_VERTS`.
//!
//! # Invariants
//!
//! - A valid vertex index is always `< MAX_VERTS`.
//! - `INVALID_VERTEX`, `NOT_IN_SET` and `INVALID_MDD` never collide with a
//!   valid index, a valid set position, or a valid degree respectively.

/// A vertex index into a [`Graph`](crate::graph::Graph).
pub type VertIndex = usize;

/// Maximum number of vertices a graph may have.
pub const MAX_VERTS: usize = 1024;

/// Maximum degree a vertex may have (including its self-loop).
pub const MAX_DEGREE: usize = 1024;

/// Sentinel for "no such vertex".
pub const INVALID_VERTEX: VertIndex = usize::MAX;

/// Sentinel stored in a [`VertexSet`](crate::vertex_set::VertexSet) position
/// table for vertices that are not members.
pub const NOT_IN_SET: usize = usize::MAX;

/// Sentinel MDD value for vertices that are already dominated.
pub const INVALID_MDD: usize = usize::MAX;

/// Lower-bound value meaning "cannot be covered at all". Any comparison
/// against a size bound treats this as infinity.
pub const INFEASIBLE: usize = MAX_VERTS + 1;
