//! Error types for the CRES codec.

use thiserror::Error;

/// Errors produced while decoding or encoding CRES data.
#[derive(Debug, Error)]
pub enum Error {
    /// Cursor/container-level error.
    #[error(transparent)]
    Common(#[from] simscene_common::Error),

    /// A bone parent index pointing past the bone table.
    #[error("bone {bone} has parent index {parent}, but only {bone_count} bones exist")]
    DanglingBoneReference {
        bone: usize,
        parent: u32,
        bone_count: usize,
    },

    /// A parent graph violating acyclicity or topological order.
    ///
    /// Every non-root bone must name a parent at a strictly earlier
    /// position; forward references make cycles expressible, so they are
    /// rejected outright.
    #[error("bone {bone} has parent index {parent}, violating topological order")]
    CyclicSkeleton { bone: usize, parent: u32 },

    /// A file whose chunk directory holds no skeleton chunk.
    #[error("no skeleton chunk in file")]
    MissingSkeletonChunk,
}

/// Result type alias using the CRES Error type.
pub type Result<T> = std::result::Result<T, Error>;
