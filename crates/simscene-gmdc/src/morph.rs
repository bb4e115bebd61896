//! Morph targets and shapes.
//!
//! A morph target is a named set of per-vertex position/normal deltas keyed
//! by vertex id rather than raw array position, since morphs may target a
//! reindexed subset of a group. A shape is a named selection of morph
//! targets exposed as one blend key.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::{BinaryReader, BinaryWriter};

use crate::group::VertexDataGroup;
use crate::{Error, Result};

/// One vertex's deformation delta within a morph target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MorphDelta {
    pub vertex_id: u32,
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A named deformation target over one vertex data group.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MorphTarget {
    pub name: String,
    /// Index of the vertex data group the deltas apply to.
    pub group: u32,
    pub deltas: Vec<MorphDelta>,
}

impl MorphTarget {
    pub(crate) fn read(
        reader: &mut BinaryReader<'_>,
        groups: &[VertexDataGroup],
        morph_index: usize,
    ) -> Result<Self> {
        let name = reader.read_str()?.to_owned();
        let group = reader.read_u32()?;
        let target = groups.get(group as usize).ok_or(Error::DanglingGroupReference {
            referrer: "morph target",
            index: group,
            group_count: groups.len(),
        })?;
        let delta_count = reader.read_u32()? as usize;
        let mut deltas = Vec::with_capacity(delta_count.min(0x10000));
        for _ in 0..delta_count {
            let delta = MorphDelta {
                vertex_id: reader.read_u32()?,
                position: reader.read_f32x3()?,
                normal: reader.read_f32x3()?,
            };
            if !target.contains_vertex_id(delta.vertex_id) {
                return Err(Error::DanglingVertexId {
                    morph: morph_index,
                    group,
                    vertex_id: delta.vertex_id,
                });
            }
            deltas.push(delta);
        }
        Ok(Self {
            name,
            group,
            deltas,
        })
    }

    pub(crate) fn write(
        &self,
        writer: &mut BinaryWriter,
        groups: &[VertexDataGroup],
        morph_index: usize,
    ) -> Result<()> {
        let target = groups
            .get(self.group as usize)
            .ok_or(Error::DanglingGroupReference {
                referrer: "morph target",
                index: self.group,
                group_count: groups.len(),
            })?;
        writer.write_str(&self.name)?;
        writer.write_u32(self.group)?;
        writer.write_u32(self.deltas.len() as u32)?;
        for delta in &self.deltas {
            if !target.contains_vertex_id(delta.vertex_id) {
                return Err(Error::DanglingVertexId {
                    morph: morph_index,
                    group: self.group,
                    vertex_id: delta.vertex_id,
                });
            }
            writer.write_u32(delta.vertex_id)?;
            writer.write_f32x3(delta.position)?;
            writer.write_f32x3(delta.normal)?;
        }
        Ok(())
    }
}

/// A named blend key: an ordered list of morph target indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    pub name: String,
    pub morphs: Vec<u32>,
}

impl Shape {
    pub(crate) fn read(
        reader: &mut BinaryReader<'_>,
        morph_count: usize,
        shape_index: usize,
    ) -> Result<Self> {
        let name = reader.read_str()?.to_owned();
        let count = reader.read_u32()? as usize;
        let mut morphs = Vec::with_capacity(count.min(0x10000));
        for _ in 0..count {
            let morph = reader.read_u32()?;
            if morph as usize >= morph_count {
                return Err(Error::DanglingMorphReference {
                    shape: shape_index,
                    morph,
                    morph_count,
                });
            }
            morphs.push(morph);
        }
        Ok(Self { name, morphs })
    }

    pub(crate) fn write(
        &self,
        writer: &mut BinaryWriter,
        morph_count: usize,
        shape_index: usize,
    ) -> Result<()> {
        writer.write_str(&self.name)?;
        writer.write_u32(self.morphs.len() as u32)?;
        for morph in &self.morphs {
            if *morph as usize >= morph_count {
                return Err(Error::DanglingMorphReference {
                    shape: shape_index,
                    morph: *morph,
                    morph_count,
                });
            }
            writer.write_u32(*morph)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_group() -> VertexDataGroup {
        let mut g = VertexDataGroup::with_count(3);
        g.positions = Some(vec![[0.0; 3]; 3]);
        g.vertex_ids = Some(vec![100, 101, 102]);
        g
    }

    fn sample_morph() -> MorphTarget {
        MorphTarget {
            name: "smile".into(),
            group: 0,
            deltas: vec![MorphDelta {
                vertex_id: 101,
                position: [0.0, 0.1, 0.0],
                normal: [0.0, 0.0, 0.0],
            }],
        }
    }

    #[test]
    fn test_morph_roundtrip() {
        let groups = [keyed_group()];
        let morph = sample_morph();
        let mut w = BinaryWriter::new();
        morph.write(&mut w, &groups, 0).unwrap();
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(MorphTarget::read(&mut r, &groups, 0).unwrap(), morph);
        assert!(r.is_empty());
    }

    #[test]
    fn test_unknown_vertex_id_rejected() {
        let groups = [keyed_group()];
        let mut morph = sample_morph();
        morph.deltas[0].vertex_id = 999;
        let mut w = BinaryWriter::new();
        assert!(matches!(
            morph.write(&mut w, &groups, 0),
            Err(Error::DanglingVertexId {
                vertex_id: 999,
                ..
            })
        ));
    }

    #[test]
    fn test_positional_fallback_without_id_array() {
        let mut group = keyed_group();
        group.vertex_ids = None;
        let groups = [group];
        let mut morph = sample_morph();
        morph.deltas[0].vertex_id = 2;
        let mut w = BinaryWriter::new();
        morph.write(&mut w, &groups, 0).unwrap();

        morph.deltas[0].vertex_id = 3;
        let mut w = BinaryWriter::new();
        assert!(morph.write(&mut w, &groups, 0).is_err());
    }

    #[test]
    fn test_shape_dangling_morph_is_a_decode_error() {
        let shape = Shape {
            name: "fat".into(),
            morphs: vec![0],
        };
        let mut w = BinaryWriter::new();
        shape.write(&mut w, 1, 0).unwrap();
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert!(matches!(
            Shape::read(&mut r, 0, 0),
            Err(Error::DanglingMorphReference { morph: 0, .. })
        ));
    }
}
