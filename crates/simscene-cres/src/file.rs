//! CRES file handling: the skeleton chunk codec and the file-level wrapper.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::chunk::{
    check_consumed, ChunkDirectory, ChunkHeader, LinkedResource, RawChunk, TAG_SKELETON,
};
use simscene_common::{BinaryReader, BinaryWriter};

use crate::skeleton::Skeleton;
use crate::{Error, Result};

/// Version this codec writes for new skeleton chunks.
pub const SKELETON_VERSION: u32 = 7;

/// One chunk of a CRES file: decoded skeleton or opaque passthrough.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CresChunk {
    Skeleton(Skeleton),
    Opaque(RawChunk),
}

/// A decoded CRES file: linked resources plus chunks in file order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CresFile {
    pub links: Vec<LinkedResource>,
    pub chunks: Vec<CresChunk>,
}

impl CresFile {
    /// The first skeleton chunk, if any.
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.chunks.iter().find_map(|c| match c {
            CresChunk::Skeleton(s) => Some(s),
            CresChunk::Opaque(_) => None,
        })
    }

    /// Mutable access to the first skeleton chunk.
    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.chunks.iter_mut().find_map(|c| match c {
            CresChunk::Skeleton(s) => Some(s),
            CresChunk::Opaque(_) => None,
        })
    }
}

fn decode_skeleton_chunk(chunk: &RawChunk) -> Result<Skeleton> {
    let mut reader = BinaryReader::new(&chunk.data);
    let mut skeleton = Skeleton::read(&mut reader)?;
    check_consumed(&chunk.header, reader.position())?;
    skeleton.version = chunk.header.version;
    skeleton.instance_id = chunk.header.instance_id;
    Ok(skeleton)
}

fn encode_skeleton_chunk(skeleton: &Skeleton) -> Result<RawChunk> {
    let mut writer = BinaryWriter::new();
    skeleton.write(&mut writer)?;
    let data = writer.into_bytes();
    Ok(RawChunk {
        header: ChunkHeader {
            tag: TAG_SKELETON,
            version: skeleton.version,
            instance_id: skeleton.instance_id,
            length: data.len() as u32,
        },
        data,
    })
}

/// Decode a CRES file from a full byte buffer.
pub fn decode_cres(bytes: &[u8]) -> Result<CresFile> {
    let directory = ChunkDirectory::parse(bytes)?;
    let mut chunks = Vec::with_capacity(directory.chunks.len());
    let mut seen_skeleton = false;
    for raw in directory.chunks {
        if raw.header.tag == TAG_SKELETON {
            chunks.push(CresChunk::Skeleton(decode_skeleton_chunk(&raw)?));
            seen_skeleton = true;
        } else {
            chunks.push(CresChunk::Opaque(raw));
        }
    }
    if !seen_skeleton {
        return Err(Error::MissingSkeletonChunk);
    }
    Ok(CresFile {
        links: directory.links,
        chunks,
    })
}

/// Encode a CRES file to bytes, chunks in stored order.
pub fn encode_cres(file: &CresFile) -> Result<Vec<u8>> {
    let mut directory = ChunkDirectory {
        links: file.links.clone(),
        chunks: Vec::with_capacity(file.chunks.len()),
    };
    for chunk in &file.chunks {
        directory.chunks.push(match chunk {
            CresChunk::Skeleton(s) => encode_skeleton_chunk(s)?,
            CresChunk::Opaque(raw) => raw.clone(),
        });
    }
    Ok(directory.encode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{Bone, ROOT_PARENT};
    use simscene_common::{Quat, Transform, Vec3};

    fn sample_file() -> CresFile {
        let skeleton = Skeleton {
            name: "auskel".into(),
            version: SKELETON_VERSION,
            instance_id: 5,
            bones: vec![
                Bone {
                    name: "root".into(),
                    parent: None,
                    local: Transform::new(Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY, 1.0),
                    inverse_bind: Transform::new(
                        Vec3::new(0.0, 0.0, -1.0),
                        Quat::IDENTITY,
                        1.0,
                    ),
                },
                Bone {
                    name: "spine".into(),
                    parent: Some(0),
                    local: Transform::new(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY, 1.0),
                    inverse_bind: Transform::IDENTITY,
                },
            ],
            rigged_models: vec![1, 2],
        };
        CresFile {
            links: vec![],
            chunks: vec![CresChunk::Skeleton(skeleton)],
        }
    }

    #[test]
    fn test_roundtrip_byte_identical() {
        let file = sample_file();
        let bytes = encode_cres(&file).unwrap();
        let back = decode_cres(&bytes).unwrap();
        assert_eq!(back, file);
        assert_eq!(encode_cres(&back).unwrap(), bytes);
    }

    #[test]
    fn test_cycle_on_disk_rejected() {
        let mut file = sample_file();
        // A self-parent; write the chunk by hand since `encode_cres` refuses it.
        file.skeleton_mut().unwrap().bones[1].parent = Some(1);
        let skeleton = file.skeleton().unwrap();

        let mut writer = BinaryWriter::new();
        writer.write_str(&skeleton.name).unwrap();
        writer.write_u32(2).unwrap();
        for bone in &skeleton.bones {
            writer.write_str(&bone.name).unwrap();
            writer.write_u32(bone.parent.unwrap_or(ROOT_PARENT)).unwrap();
            for t in [&bone.local, &bone.inverse_bind] {
                writer.write_f32x3(t.translation.to_array()).unwrap();
                writer.write_f32x4(t.rotation.to_array()).unwrap();
                writer.write_f32(t.scale).unwrap();
            }
        }
        writer.write_u32(0).unwrap();
        let data = writer.into_bytes();

        let directory = ChunkDirectory {
            links: vec![],
            chunks: vec![RawChunk {
                header: ChunkHeader {
                    tag: TAG_SKELETON,
                    version: SKELETON_VERSION,
                    instance_id: 5,
                    length: data.len() as u32,
                },
                data,
            }],
        };
        let bytes = directory.encode().unwrap();
        assert!(matches!(
            decode_cres(&bytes),
            Err(Error::CyclicSkeleton { bone: 1, parent: 1 })
        ));
    }

    #[test]
    fn test_truncation_sweep_errors_never_panics() {
        let bytes = encode_cres(&sample_file()).unwrap();
        for end in 0..bytes.len() {
            assert!(decode_cres(&bytes[..end]).is_err(), "prefix {end}");
        }
    }

    #[test]
    fn test_missing_skeleton_chunk() {
        let bytes = ChunkDirectory::default().encode().unwrap();
        assert!(matches!(
            decode_cres(&bytes),
            Err(Error::MissingSkeletonChunk)
        ));
    }
}
