//! Error types for the GMDC codec.

use thiserror::Error;

/// Errors produced while decoding or encoding GMDC data.
#[derive(Debug, Error)]
pub enum Error {
    /// Cursor/container-level error.
    #[error(transparent)]
    Common(#[from] simscene_common::Error),

    /// An element bitmask with bits this codec has no table entry for.
    ///
    /// Unknown element kinds cannot be skipped because their stride is
    /// unknown, so the whole chunk is rejected.
    #[error("element mask {mask:#010x} contains unknown element bits")]
    UnknownElementMask { mask: u32 },

    /// A present element array whose length differs from the group's vertex count.
    #[error("{kind} array has {actual} elements, group vertex count is {expected}")]
    ElementArity {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A vertex data group index pointing past the group table.
    #[error("{referrer} references vertex data group {index}, but only {group_count} exist")]
    DanglingGroupReference {
        referrer: &'static str,
        index: u32,
        group_count: usize,
    },

    /// A shape referencing a morph target that does not exist.
    #[error("shape {shape} references morph {morph}, but only {morph_count} exist")]
    DanglingMorphReference {
        shape: usize,
        morph: u32,
        morph_count: usize,
    },

    /// A morph delta keyed by a vertex id absent from its target group.
    #[error("morph {morph} targets vertex id {vertex_id}, not present in group {group}")]
    DanglingVertexId {
        morph: usize,
        group: u32,
        vertex_id: u32,
    },

    /// A triangle index list whose length is not a multiple of three.
    #[error("subset {subset:?} has {count} indices, not a whole number of triangles")]
    IndexCountNotTriangles { subset: String, count: usize },

    /// A subset primitive type other than triangle lists.
    #[error("unsupported primitive type {value} (only triangle lists are supported)")]
    UnsupportedPrimitive { value: u32 },

    /// A file whose chunk directory holds no geometry chunk.
    #[error("no geometry chunk in file")]
    MissingGeometryChunk,
}

/// Result type alias using the GMDC Error type.
pub type Result<T> = std::result::Result<T, Error>;
