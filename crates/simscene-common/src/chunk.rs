//! Container-level chunk directory shared by GMDC and CRES files.
//!
//! Both formats open with the same structure: a magic, a linked-resource
//! table, then a sequence of length-prefixed chunks. The directory walks that
//! structure without interpreting chunk payloads; format codecs claim the
//! chunks they understand and everything else is carried opaquely so a file
//! with unrecognized chunks still round-trips byte-for-byte.
//!
//! Chunk order is load-bearing: chunks reference each other by position, so
//! the directory re-emits them in exactly the order they were read.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BinaryReader, BinaryWriter, Error, Result};

/// File magic shared by both container formats.
pub const FILE_MAGIC: &[u8; 4] = b"\x01\x00\xff\xff";

/// Chunk tag of a geometry data container (GMDC).
pub const TAG_GEOMETRY: u32 = 0xAC4F_8687;

/// Chunk tag of a skeleton resource node (CRES).
pub const TAG_SKELETON: u32 = 0xE519_C933;

/// Highest chunk versions this codec understands, per tag.
///
/// Loaded once as static configuration; versions above the listed maximum
/// fail with [`Error::UnsupportedVersion`], lower versions attempt a
/// best-effort decode. Tags absent from the table are opaque passthrough and
/// carry no version constraint.
pub const SUPPORTED_VERSIONS: &[(u32, u32)] = &[(TAG_GEOMETRY, 4), (TAG_SKELETON, 7)];

/// Look up the maximum understood version for a chunk tag.
pub fn max_supported_version(tag: u32) -> Option<u32> {
    SUPPORTED_VERSIONS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, v)| *v)
}

/// A fixed-size chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkHeader {
    /// Chunk type identifier.
    pub tag: u32,
    /// Format version of the payload.
    pub version: u32,
    /// Instance id; other chunks reference this chunk by it.
    pub instance_id: u32,
    /// Payload length in bytes.
    pub length: u32,
}

impl ChunkHeader {
    pub const SIZE: usize = 16;

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            tag: reader.read_u32()?,
            version: reader.read_u32()?,
            instance_id: reader.read_u32()?,
            length: reader.read_u32()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32(self.tag)?;
        writer.write_u32(self.version)?;
        writer.write_u32(self.instance_id)?;
        writer.write_u32(self.length)
    }
}

/// An undecoded chunk: header plus verbatim payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawChunk {
    pub header: ChunkHeader,
    pub data: Vec<u8>,
}

/// An entry in the container's linked-resource table.
///
/// Four ids identifying an external resource in the game's data pipeline.
/// The codec round-trips these verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkedResource {
    pub type_id: u32,
    pub group_id: u32,
    pub instance_id: u32,
    pub resource_id: u32,
}

impl LinkedResource {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            type_id: reader.read_u32()?,
            group_id: reader.read_u32()?,
            instance_id: reader.read_u32()?,
            resource_id: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32(self.type_id)?;
        writer.write_u32(self.group_id)?;
        writer.write_u32(self.instance_id)?;
        writer.write_u32(self.resource_id)
    }
}

/// The parsed container: linked resources plus raw chunks in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkDirectory {
    pub links: Vec<LinkedResource>,
    pub chunks: Vec<RawChunk>,
}

impl ChunkDirectory {
    /// Parse the container structure from a full file buffer.
    ///
    /// Validates the magic, every chunk header's declared length against the
    /// remaining buffer, and known tags' versions against
    /// [`SUPPORTED_VERSIONS`]. Payloads are not interpreted here.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_magic(FILE_MAGIC)?;

        let link_count = reader.read_u32()? as usize;
        let mut links = Vec::with_capacity(link_count.min(1024));
        for _ in 0..link_count {
            links.push(LinkedResource::read(&mut reader)?);
        }

        let chunk_count = reader.read_u32()? as usize;
        let mut chunks = Vec::with_capacity(chunk_count.min(1024));
        for _ in 0..chunk_count {
            let header = ChunkHeader::read(&mut reader)?;
            if let Some(max) = max_supported_version(header.tag) {
                if header.version > max {
                    return Err(Error::UnsupportedVersion {
                        tag: header.tag,
                        version: header.version,
                        max,
                    });
                }
            }
            let payload = reader.read_bytes(header.length as usize)?;
            chunks.push(RawChunk {
                header,
                data: payload.to_vec(),
            });
        }

        Ok(Self { links, chunks })
    }

    /// Serialize the container, chunks in stored order.
    ///
    /// Each chunk's length field is recomputed from its payload rather than
    /// trusted from the header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(FILE_MAGIC)?;
        writer.write_u32(self.links.len() as u32)?;
        for link in &self.links {
            link.write(&mut writer)?;
        }
        writer.write_u32(self.chunks.len() as u32)?;
        for chunk in &self.chunks {
            let header = ChunkHeader {
                length: chunk.data.len() as u32,
                ..chunk.header
            };
            header.write(&mut writer)?;
            writer.write_bytes(&chunk.data)?;
        }
        Ok(writer.into_bytes())
    }
}

/// Check that a chunk decoder consumed its payload exactly.
///
/// The primary structural integrity check: a decoder that stops short or
/// overruns the declared length read garbage, so nothing it produced can be
/// trusted.
pub fn check_consumed(header: &ChunkHeader, consumed: usize) -> Result<()> {
    if consumed != header.length as usize {
        return Err(Error::MalformedChunk {
            tag: header.tag,
            declared: header.length as usize,
            consumed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_directory() -> ChunkDirectory {
        ChunkDirectory {
            links: vec![LinkedResource {
                type_id: 0xE519_C933,
                group_id: 0x1C05_0000,
                instance_id: 0xFF00_0001,
                resource_id: 0,
            }],
            chunks: vec![
                RawChunk {
                    header: ChunkHeader {
                        tag: 0xDEAD_0001,
                        version: 1,
                        instance_id: 7,
                        length: 3,
                    },
                    data: vec![1, 2, 3],
                },
                RawChunk {
                    header: ChunkHeader {
                        tag: TAG_GEOMETRY,
                        version: 4,
                        instance_id: 8,
                        length: 0,
                    },
                    data: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_roundtrip_preserves_order_and_opaque_chunks() {
        let dir = sample_directory();
        let bytes = dir.encode().unwrap();
        let parsed = ChunkDirectory::parse(&bytes).unwrap();
        assert_eq!(parsed, dir);
        assert_eq!(parsed.chunks[0].header.tag, 0xDEAD_0001);
    }

    #[test]
    fn test_unsupported_version() {
        let mut dir = sample_directory();
        dir.chunks[1].header.version = 5;
        let bytes = dir.encode().unwrap();
        assert!(matches!(
            ChunkDirectory::parse(&bytes),
            Err(Error::UnsupportedVersion {
                tag: TAG_GEOMETRY,
                version: 5,
                max: 4,
            })
        ));
    }

    #[test]
    fn test_declared_length_beyond_buffer() {
        let dir = sample_directory();
        let mut bytes = dir.encode().unwrap();
        let len = bytes.len();
        bytes.truncate(len - 1);
        // Chop the tail; some read must now report truncation.
        assert!(matches!(
            ChunkDirectory::parse(&bytes),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_truncation_sweep_never_panics() {
        let bytes = sample_directory().encode().unwrap();
        for end in 0..bytes.len() {
            assert!(ChunkDirectory::parse(&bytes[..end]).is_err(), "prefix {end}");
        }
    }

    #[test]
    fn test_check_consumed() {
        let header = ChunkHeader {
            tag: TAG_GEOMETRY,
            version: 4,
            instance_id: 0,
            length: 10,
        };
        assert!(check_consumed(&header, 10).is_ok());
        assert!(matches!(
            check_consumed(&header, 9),
            Err(Error::MalformedChunk {
                declared: 10,
                consumed: 9,
                ..
            })
        ));
    }
}
