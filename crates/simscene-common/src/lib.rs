//! Common utilities for simscene.
//!
//! This crate provides the foundational types used across the simscene
//! codec crates:
//!
//! - [`BinaryReader`] / [`BinaryWriter`] - positioned little-endian binary
//!   cursor over byte buffers
//! - [`chunk`] - the chunk directory structure shared by GMDC and CRES
//!   containers (headers, linked resources, opaque passthrough)
//! - [`Vec3`], [`Quat`], [`Transform`] - rigid-transform math for skeleton
//!   composition

mod error;
mod reader;
mod transform;
mod writer;

pub mod chunk;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use transform::{Quat, Transform, Vec3};
pub use writer::BinaryWriter;
