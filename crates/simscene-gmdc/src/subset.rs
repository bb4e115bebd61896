//! Model subsets: named triangle lists over a vertex data group.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// The only primitive type the format carries: triangle lists.
const PRIMITIVE_TRIANGLES: u32 = 2;

/// A named renderable part: a triangle index list into one vertex data group
/// plus the subset of skeleton bones it uses.
///
/// Triangle indices are *not* range-checked against the group at decode
/// time; that is a `validate`-time concern, so adversarially corrupted
/// indices surface as issues rather than decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelSubset {
    pub name: String,
    /// Index into the file's vertex data group table.
    pub group: u32,
    /// Flat triangle list; length is always a multiple of three.
    pub indices: Vec<u16>,
    /// Renderer flags, round-tripped verbatim.
    pub flags: u32,
    /// Skeleton bone indices used by this subset.
    pub bones: Vec<u16>,
}

impl ModelSubset {
    /// Number of triangles in the subset.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>, group_count: usize) -> Result<Self> {
        let primitive = reader.read_u32()?;
        if primitive != PRIMITIVE_TRIANGLES {
            return Err(Error::UnsupportedPrimitive { value: primitive });
        }
        let group = reader.read_u32()?;
        if group as usize >= group_count {
            return Err(Error::DanglingGroupReference {
                referrer: "model subset",
                index: group,
                group_count,
            });
        }
        let name = reader.read_str()?.to_owned();
        let index_count = reader.read_u32()? as usize;
        if index_count % 3 != 0 {
            return Err(Error::IndexCountNotTriangles {
                subset: name,
                count: index_count,
            });
        }
        let mut indices = Vec::with_capacity(index_count.min(0x10000));
        for _ in 0..index_count {
            indices.push(reader.read_u16()?);
        }
        let flags = reader.read_u32()?;
        let bone_count = reader.read_u32()? as usize;
        let mut bones = Vec::with_capacity(bone_count.min(0x10000));
        for _ in 0..bone_count {
            bones.push(reader.read_u16()?);
        }
        Ok(Self {
            name,
            group,
            indices,
            flags,
            bones,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, group_count: usize) -> Result<()> {
        if self.group as usize >= group_count {
            return Err(Error::DanglingGroupReference {
                referrer: "model subset",
                index: self.group,
                group_count,
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::IndexCountNotTriangles {
                subset: self.name.clone(),
                count: self.indices.len(),
            });
        }
        writer.write_u32(PRIMITIVE_TRIANGLES)?;
        writer.write_u32(self.group)?;
        writer.write_str(&self.name)?;
        writer.write_u32(self.indices.len() as u32)?;
        for i in &self.indices {
            writer.write_u16(*i)?;
        }
        writer.write_u32(self.flags)?;
        writer.write_u32(self.bones.len() as u32)?;
        for b in &self.bones {
            writer.write_u16(*b)?;
        }
        Ok(())
    }
}
