//! SimScene - TS2 scene resource codec library.
//!
//! A unified interface to the SimScene crate family for working with the
//! GMDC geometry and CRES skeleton resource formats.
//!
//! # Crates
//!
//! - [`simscene_common`] - Binary cursor, chunk directory, transform math
//! - [`simscene_gmdc`] - GMDC geometry container codec
//! - [`simscene_cres`] - CRES skeleton resource codec
//!
//! # Example
//!
//! ```no_run
//! use simscene::prelude::*;
//!
//! let gmdc = decode_gmdc(&std::fs::read("body.gmdc")?)?;
//! let cres = decode_cres(&std::fs::read("body.cres")?)?;
//!
//! for issue in simscene::validate(&gmdc, &cres) {
//!     eprintln!("{issue}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod validate;

// Re-export all sub-crates
pub use simscene_common as common;
pub use simscene_cres as cres;
pub use simscene_gmdc as gmdc;

pub use validate::{validate, weight_issues, ValidationIssue};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use simscene_common::{BinaryReader, BinaryWriter, Quat, Transform, Vec3};
    pub use simscene_cres::{decode_cres, encode_cres, Bone, CresFile, Skeleton};
    pub use simscene_gmdc::{
        decode_gmdc, encode_gmdc, GeometryData, GmdcFile, ModelSubset, VertexDataGroup,
    };

    pub use crate::{validate, weight_issues, ValidationIssue};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
