//! Bounding geometry: an axis-aligned box plus an optional simplified mesh.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::{BinaryReader, BinaryWriter};

use crate::Result;

/// A simplified collision/bounding mesh, independent of render geometry.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingMesh {
    pub vertices: Vec<[f32; 3]>,
    /// Flat triangle index list.
    pub indices: Vec<u16>,
}

/// Axis-aligned bounds and the optional bounding mesh.
///
/// Mesh presence is an explicit flag on disk so an empty mesh stays distinct
/// from an absent one across round-trips.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingGeometry {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub mesh: Option<BoundingMesh>,
}

impl BoundingGeometry {
    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let min = reader.read_f32x3()?;
        let max = reader.read_f32x3()?;
        let mesh = if reader.read_u32()? != 0 {
            let vertex_count = reader.read_u32()? as usize;
            let index_count = reader.read_u32()? as usize;
            let mut vertices = Vec::with_capacity(vertex_count.min(0x10000));
            for _ in 0..vertex_count {
                vertices.push(reader.read_f32x3()?);
            }
            let mut indices = Vec::with_capacity(index_count.min(0x10000));
            for _ in 0..index_count {
                indices.push(reader.read_u16()?);
            }
            Some(BoundingMesh { vertices, indices })
        } else {
            None
        };
        Ok(Self { min, max, mesh })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_f32x3(self.min)?;
        writer.write_f32x3(self.max)?;
        match &self.mesh {
            Some(mesh) => {
                writer.write_u32(1)?;
                writer.write_u32(mesh.vertices.len() as u32)?;
                writer.write_u32(mesh.indices.len() as u32)?;
                for v in &mesh.vertices {
                    writer.write_f32x3(*v)?;
                }
                for i in &mesh.indices {
                    writer.write_u16(*i)?;
                }
            }
            None => writer.write_u32(0)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(bounds: &BoundingGeometry) -> BoundingGeometry {
        let mut w = BinaryWriter::new();
        bounds.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        let back = BoundingGeometry::read(&mut r).unwrap();
        assert!(r.is_empty());
        back
    }

    #[test]
    fn test_roundtrip_with_mesh() {
        let bounds = BoundingGeometry {
            min: [-1.0, -1.0, 0.0],
            max: [1.0, 1.0, 0.0],
            mesh: Some(BoundingMesh {
                vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                indices: vec![0, 1, 2],
            }),
        };
        assert_eq!(roundtrip(&bounds), bounds);
    }

    #[test]
    fn test_empty_mesh_distinct_from_absent() {
        let absent = BoundingGeometry {
            min: [0.0; 3],
            max: [0.0; 3],
            mesh: None,
        };
        let empty = BoundingGeometry {
            mesh: Some(BoundingMesh::default()),
            ..absent.clone()
        };
        assert_eq!(roundtrip(&absent).mesh, None);
        assert_eq!(roundtrip(&empty).mesh, Some(BoundingMesh::default()));
    }
}
