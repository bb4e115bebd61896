//! GMDC geometry container codec.
//!
//! GMDC files carry the renderable geometry of a TS2 scene resource: vertex
//! data groups (parallel element arrays behind a presence bitmask), named
//! triangle-list subsets, LOD link pairs, morph targets with their shapes,
//! and bounding geometry. This crate decodes a full byte buffer into a
//! [`GmdcFile`] and encodes one back, preserving chunk order and unknown
//! chunks byte-for-byte.
//!
//! # Example
//!
//! ```no_run
//! use simscene_gmdc::{decode_gmdc, encode_gmdc};
//!
//! let bytes = std::fs::read("body.gmdc")?;
//! let mut file = decode_gmdc(&bytes)?;
//!
//! if let Some(geometry) = file.geometry() {
//!     println!("{geometry}");
//! }
//!
//! let out = encode_gmdc(&file)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bounds;
mod error;
mod file;
mod group;
mod morph;
mod subset;

pub use bounds::{BoundingGeometry, BoundingMesh};
pub use error::{Error, Result};
pub use file::{
    decode_gmdc, encode_gmdc, GeometryData, GmdcChunk, GmdcFile, LinkEntry, GEOMETRY_VERSION,
};
pub use group::{
    BoneAssignment, ElementKind, VertexDataGroup, ELEMENT_TABLE, KNOWN_ELEMENT_MASK, NO_BONE,
};
pub use morph::{MorphDelta, MorphTarget, Shape};
pub use subset::ModelSubset;
