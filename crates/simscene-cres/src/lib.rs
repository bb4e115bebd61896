//! CRES skeleton resource codec.
//!
//! CRES files carry the skeletal hierarchy a scene resource is rigged
//! against: an ordered bone table with local and inverse-bind transforms,
//! plus the instance ids of the geometry chunks the skeleton drives. This
//! crate decodes a full byte buffer into a [`CresFile`] and encodes one
//! back, preserving chunk order and unknown chunks byte-for-byte.
//!
//! # Example
//!
//! ```no_run
//! use simscene_cres::decode_cres;
//!
//! let bytes = std::fs::read("body.cres")?;
//! let file = decode_cres(&bytes)?;
//!
//! if let Some(skeleton) = file.skeleton() {
//!     println!("{skeleton}");
//!     let world = skeleton.compose_world_transform(0)?;
//!     println!("root at {:?}", world.translation);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod file;
mod skeleton;

pub use error::{Error, Result};
pub use file::{decode_cres, encode_cres, CresChunk, CresFile, SKELETON_VERSION};
pub use skeleton::{Bone, Skeleton, ROOT_PARENT};
