//! GMDC file handling: the geometry chunk codec and the file-level wrapper.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::chunk::{
    check_consumed, ChunkDirectory, ChunkHeader, LinkedResource, RawChunk, TAG_GEOMETRY,
};
use simscene_common::{BinaryReader, BinaryWriter};
use tracing::debug;

use crate::bounds::BoundingGeometry;
use crate::group::VertexDataGroup;
use crate::morph::{MorphTarget, Shape};
use crate::subset::ModelSubset;
use crate::{Error, Result};

/// Version this codec writes for new geometry chunks.
pub const GEOMETRY_VERSION: u32 = 4;

/// A payload-free pairing of vertex data groups, relating an LOD/alternate
/// group to its parent group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkEntry {
    pub parent: u32,
    pub child: u32,
}

/// The decoded geometry chunk.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryData {
    /// Resource name carried in the chunk.
    pub name: String,
    /// Chunk version as decoded (or [`GEOMETRY_VERSION`] for new data).
    pub version: u32,
    /// Chunk instance id; skeletons reference geometry by it.
    pub instance_id: u32,
    pub groups: Vec<VertexDataGroup>,
    pub subsets: Vec<ModelSubset>,
    pub links: Vec<LinkEntry>,
    pub morphs: Vec<MorphTarget>,
    pub shapes: Vec<Shape>,
    pub bounds: BoundingGeometry,
}

impl Default for GeometryData {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: GEOMETRY_VERSION,
            instance_id: 0,
            groups: Vec::new(),
            subsets: Vec::new(),
            links: Vec::new(),
            morphs: Vec::new(),
            shapes: Vec::new(),
            bounds: BoundingGeometry::default(),
        }
    }
}

impl GeometryData {
    /// Decode a geometry chunk payload.
    ///
    /// Sections are materialized in dependency order (groups before anything
    /// that references them), and the payload must be consumed exactly.
    pub fn decode(chunk: &RawChunk) -> Result<Self> {
        let mut reader = BinaryReader::new(&chunk.data);
        let name = reader.read_str()?.to_owned();

        let group_count = reader.read_u32()? as usize;
        debug!(group_count, name = %name, "decoding geometry chunk");
        let mut groups = Vec::with_capacity(group_count.min(256));
        for _ in 0..group_count {
            groups.push(VertexDataGroup::read(&mut reader)?);
        }

        let subset_count = reader.read_u32()? as usize;
        let mut subsets = Vec::with_capacity(subset_count.min(256));
        for _ in 0..subset_count {
            subsets.push(ModelSubset::read(&mut reader, groups.len())?);
        }

        let link_count = reader.read_u32()? as usize;
        let mut links = Vec::with_capacity(link_count.min(256));
        for _ in 0..link_count {
            let entry = LinkEntry {
                parent: reader.read_u32()?,
                child: reader.read_u32()?,
            };
            for index in [entry.parent, entry.child] {
                if index as usize >= groups.len() {
                    return Err(Error::DanglingGroupReference {
                        referrer: "link entry",
                        index,
                        group_count: groups.len(),
                    });
                }
            }
            links.push(entry);
        }

        let morph_count = reader.read_u32()? as usize;
        let mut morphs = Vec::with_capacity(morph_count.min(256));
        for i in 0..morph_count {
            morphs.push(MorphTarget::read(&mut reader, &groups, i)?);
        }

        let shape_count = reader.read_u32()? as usize;
        let mut shapes = Vec::with_capacity(shape_count.min(256));
        for i in 0..shape_count {
            shapes.push(Shape::read(&mut reader, morphs.len(), i)?);
        }

        let bounds = BoundingGeometry::read(&mut reader)?;

        check_consumed(&chunk.header, reader.position())?;

        Ok(Self {
            name,
            version: chunk.header.version,
            instance_id: chunk.header.instance_id,
            groups,
            subsets,
            links,
            morphs,
            shapes,
            bounds,
        })
    }

    /// Encode this geometry back into a raw chunk.
    ///
    /// Every count, element mask and the chunk length are recomputed from
    /// the model; a model violating an invariant is refused, never emitted.
    pub fn encode(&self) -> Result<RawChunk> {
        let mut writer = BinaryWriter::new();
        writer.write_str(&self.name)?;

        writer.write_u32(self.groups.len() as u32)?;
        for group in &self.groups {
            group.write(&mut writer)?;
        }

        writer.write_u32(self.subsets.len() as u32)?;
        for subset in &self.subsets {
            subset.write(&mut writer, self.groups.len())?;
        }

        writer.write_u32(self.links.len() as u32)?;
        for link in &self.links {
            for index in [link.parent, link.child] {
                if index as usize >= self.groups.len() {
                    return Err(Error::DanglingGroupReference {
                        referrer: "link entry",
                        index,
                        group_count: self.groups.len(),
                    });
                }
            }
            writer.write_u32(link.parent)?;
            writer.write_u32(link.child)?;
        }

        writer.write_u32(self.morphs.len() as u32)?;
        for (i, morph) in self.morphs.iter().enumerate() {
            morph.write(&mut writer, &self.groups, i)?;
        }

        writer.write_u32(self.shapes.len() as u32)?;
        for (i, shape) in self.shapes.iter().enumerate() {
            shape.write(&mut writer, self.morphs.len(), i)?;
        }

        self.bounds.write(&mut writer)?;

        let data = writer.into_bytes();
        Ok(RawChunk {
            header: ChunkHeader {
                tag: TAG_GEOMETRY,
                version: self.version,
                instance_id: self.instance_id,
                length: data.len() as u32,
            },
            data,
        })
    }
}

impl fmt::Display for GeometryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Geometry \"{}\" (version {})", self.name, self.version)?;
        writeln!(f, "--Data groups ({}):", self.groups.len())?;
        for (i, group) in self.groups.iter().enumerate() {
            writeln!(
                f,
                "  {i} - vertices: {:5}, elements: {}",
                group.vertex_count,
                group.synopsis()
            )?;
        }
        writeln!(f, "--Subsets ({}):", self.subsets.len())?;
        for (i, subset) in self.subsets.iter().enumerate() {
            writeln!(
                f,
                "  {i} - \"{}\": {} triangles, group {}, {} bones",
                subset.name,
                subset.triangle_count(),
                subset.group,
                subset.bones.len()
            )?;
        }
        writeln!(f, "--Morphs: {}, shapes: {}", self.morphs.len(), self.shapes.len())?;
        write!(
            f,
            "--Bounds: {:?}..{:?}, mesh: {}",
            self.bounds.min,
            self.bounds.max,
            match &self.bounds.mesh {
                Some(m) => format!("{} vertices", m.vertices.len()),
                None => "none".into(),
            }
        )
    }
}

/// One chunk of a GMDC file: decoded geometry or opaque passthrough.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GmdcChunk {
    Geometry(GeometryData),
    Opaque(RawChunk),
}

/// A decoded GMDC file: linked resources plus chunks in file order.
///
/// Chunk order is preserved exactly on re-encode; entities reference each
/// other by position, so reordering would silently corrupt cross-references.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GmdcFile {
    pub links: Vec<LinkedResource>,
    pub chunks: Vec<GmdcChunk>,
}

impl GmdcFile {
    /// The first geometry chunk, if any.
    pub fn geometry(&self) -> Option<&GeometryData> {
        self.chunks.iter().find_map(|c| match c {
            GmdcChunk::Geometry(g) => Some(g),
            GmdcChunk::Opaque(_) => None,
        })
    }

    /// Mutable access to the first geometry chunk.
    pub fn geometry_mut(&mut self) -> Option<&mut GeometryData> {
        self.chunks.iter_mut().find_map(|c| match c {
            GmdcChunk::Geometry(g) => Some(g),
            GmdcChunk::Opaque(_) => None,
        })
    }
}

/// Decode a GMDC file from a full byte buffer.
pub fn decode_gmdc(bytes: &[u8]) -> Result<GmdcFile> {
    let directory = ChunkDirectory::parse(bytes)?;
    let mut chunks = Vec::with_capacity(directory.chunks.len());
    let mut seen_geometry = false;
    for raw in directory.chunks {
        if raw.header.tag == TAG_GEOMETRY {
            chunks.push(GmdcChunk::Geometry(GeometryData::decode(&raw)?));
            seen_geometry = true;
        } else {
            chunks.push(GmdcChunk::Opaque(raw));
        }
    }
    if !seen_geometry {
        return Err(Error::MissingGeometryChunk);
    }
    Ok(GmdcFile {
        links: directory.links,
        chunks,
    })
}

/// Encode a GMDC file to bytes, chunks in stored order.
pub fn encode_gmdc(file: &GmdcFile) -> Result<Vec<u8>> {
    let mut directory = ChunkDirectory {
        links: file.links.clone(),
        chunks: Vec::with_capacity(file.chunks.len()),
    };
    for chunk in &file.chunks {
        directory.chunks.push(match chunk {
            GmdcChunk::Geometry(g) => g.encode()?,
            GmdcChunk::Opaque(raw) => raw.clone(),
        });
    }
    Ok(directory.encode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingGeometry;
    use crate::group::VertexDataGroup;
    use crate::morph::{MorphDelta, MorphTarget, Shape};

    /// The quad scenario: one group of 4 vertices, one subset of 2 triangles.
    pub(crate) fn quad_file() -> GmdcFile {
        let mut group = VertexDataGroup::with_count(4);
        group.positions = Some(vec![
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ]);
        let geometry = GeometryData {
            name: "quad".into(),
            instance_id: 1,
            groups: vec![group],
            subsets: vec![ModelSubset {
                name: "quad".into(),
                group: 0,
                indices: vec![0, 1, 2, 0, 2, 3],
                flags: 0xFFFF_FFFF,
                bones: vec![],
            }],
            bounds: BoundingGeometry {
                min: [-1.0, -1.0, 0.0],
                max: [1.0, 1.0, 0.0],
                mesh: None,
            },
            ..GeometryData::default()
        };
        GmdcFile {
            links: vec![],
            chunks: vec![GmdcChunk::Geometry(geometry)],
        }
    }

    #[test]
    fn test_quad_decodes_to_exact_values() {
        let bytes = encode_gmdc(&quad_file()).unwrap();
        let file = decode_gmdc(&bytes).unwrap();
        let geometry = file.geometry().unwrap();
        assert_eq!(geometry.groups[0].vertex_count, 4);
        assert_eq!(geometry.subsets[0].indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(geometry.bounds.min, [-1.0, -1.0, 0.0]);
        assert_eq!(geometry.bounds.max, [1.0, 1.0, 0.0]);
        assert!(geometry.morphs.is_empty());
    }

    #[test]
    fn test_roundtrip_byte_identical() {
        let bytes = encode_gmdc(&quad_file()).unwrap();
        let file = decode_gmdc(&bytes).unwrap();
        assert_eq!(file, quad_file());
        assert_eq!(encode_gmdc(&file).unwrap(), bytes);
    }

    #[test]
    fn test_truncation_sweep_errors_never_panics() {
        let bytes = encode_gmdc(&quad_file()).unwrap();
        for end in 0..bytes.len() {
            assert!(decode_gmdc(&bytes[..end]).is_err(), "prefix {end}");
        }
    }

    #[test]
    fn test_opaque_chunks_survive_in_order() {
        let mut file = quad_file();
        let opaque = RawChunk {
            header: ChunkHeader {
                tag: 0x1234_5678,
                version: 9,
                instance_id: 2,
                length: 4,
            },
            data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };
        file.chunks.insert(0, GmdcChunk::Opaque(opaque.clone()));

        let bytes = encode_gmdc(&file).unwrap();
        let back = decode_gmdc(&bytes).unwrap();
        assert_eq!(back.chunks.len(), 2);
        assert_eq!(back.chunks[0], GmdcChunk::Opaque(opaque));
        assert!(matches!(back.chunks[1], GmdcChunk::Geometry(_)));
    }

    #[test]
    fn test_morphs_and_shapes_roundtrip() {
        let mut file = quad_file();
        {
            let geometry = file.geometry_mut().unwrap();
            geometry.groups[0].vertex_ids = Some(vec![5, 6, 7, 8]);
            geometry.morphs.push(MorphTarget {
                name: "raise".into(),
                group: 0,
                deltas: vec![MorphDelta {
                    vertex_id: 6,
                    position: [0.0, 0.0, 0.5],
                    normal: [0.0, 0.0, 0.0],
                }],
            });
            geometry.shapes.push(Shape {
                name: "raised".into(),
                morphs: vec![0],
            });
        }
        let bytes = encode_gmdc(&file).unwrap();
        let back = decode_gmdc(&bytes).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_out_of_range_triangle_index_still_decodes() {
        // Index 7 is out of range for 4 vertices but is a validate-time
        // concern, not a decode error.
        let mut file = quad_file();
        file.geometry_mut().unwrap().subsets[0].indices[3] = 7;
        let bytes = encode_gmdc(&file).unwrap();
        let back = decode_gmdc(&bytes).unwrap();
        assert_eq!(back.geometry().unwrap().subsets[0].indices[3], 7);
    }

    #[test]
    fn test_missing_geometry_chunk() {
        let directory = ChunkDirectory {
            links: vec![],
            chunks: vec![],
        };
        let bytes = directory.encode().unwrap();
        assert!(matches!(
            decode_gmdc(&bytes),
            Err(Error::MissingGeometryChunk)
        ));
    }
}
