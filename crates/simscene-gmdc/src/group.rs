//! Vertex data groups: parallel element arrays behind a presence bitmask.
//!
//! A group stores one array per element kind it carries; all present arrays
//! have exactly `vertex_count` elements. On disk a group is a bitmask, the
//! vertex count, then the present arrays in [`ELEMENT_TABLE`] order. The
//! bitmask is always recomputed from which arrays are present when encoding;
//! a stale mask field is never trusted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Unused bone slot sentinel in a bone assignment.
pub const NO_BONE: u8 = 0xFF;

/// The element kinds a vertex data group can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    Position,
    Normal,
    Uv0,
    Uv1,
    BoneIndices,
    BoneWeights,
    VertexId,
}

impl ElementKind {
    /// The bit this kind occupies in a group's element mask.
    pub const fn bit(self) -> u32 {
        match self {
            ElementKind::Position => 0x01,
            ElementKind::Normal => 0x02,
            ElementKind::Uv0 => 0x04,
            ElementKind::Uv1 => 0x08,
            ElementKind::BoneIndices => 0x10,
            ElementKind::BoneWeights => 0x20,
            ElementKind::VertexId => 0x40,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Position => "position",
            ElementKind::Normal => "normal",
            ElementKind::Uv0 => "uv0",
            ElementKind::Uv1 => "uv1",
            ElementKind::BoneIndices => "bone indices",
            ElementKind::BoneWeights => "bone weights",
            ElementKind::VertexId => "vertex id",
        }
    }

    /// One-letter code used by the group synopsis.
    const fn code(self) -> char {
        match self {
            ElementKind::Position => 'V',
            ElementKind::Normal => 'N',
            ElementKind::Uv0 => 'T',
            ElementKind::Uv1 => '2',
            ElementKind::BoneIndices => 'B',
            ElementKind::BoneWeights => 'W',
            ElementKind::VertexId => 'K',
        }
    }
}

/// Every element kind in on-disk order, with its per-vertex byte stride.
///
/// This is the format's element configuration table; decode rejects masks
/// with bits outside it.
pub const ELEMENT_TABLE: &[(ElementKind, usize)] = &[
    (ElementKind::Position, 12),
    (ElementKind::Normal, 12),
    (ElementKind::Uv0, 8),
    (ElementKind::Uv1, 8),
    (ElementKind::BoneIndices, 3),
    (ElementKind::BoneWeights, 12),
    (ElementKind::VertexId, 4),
];

const fn known_mask() -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < ELEMENT_TABLE.len() {
        mask |= ELEMENT_TABLE[i].0.bit();
        i += 1;
    }
    mask
}

/// Union of all bits in [`ELEMENT_TABLE`].
pub const KNOWN_ELEMENT_MASK: u32 = known_mask();

/// Per-vertex bone assignment: up to three bone indices, `0xFF`-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneAssignment(pub [u8; 3]);

impl BoneAssignment {
    /// The assigned bone indices, in slot order, skipping unused slots.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied().filter(|&b| b != NO_BONE)
    }

    /// Number of assigned bones (0 to 3).
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// One vertex data group: a vertex count plus optional parallel arrays.
///
/// Absent element kinds are `None`, never zero-filled; a zero-vertex group
/// is valid and stays distinct from an absent one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexDataGroup {
    pub vertex_count: u32,
    pub positions: Option<Vec<[f32; 3]>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uv0: Option<Vec<[f32; 2]>>,
    pub uv1: Option<Vec<[f32; 2]>>,
    pub bone_indices: Option<Vec<BoneAssignment>>,
    pub bone_weights: Option<Vec<[f32; 3]>>,
    pub vertex_ids: Option<Vec<u32>>,
}

impl VertexDataGroup {
    /// Create an empty group with a vertex count and no element arrays.
    pub fn with_count(vertex_count: u32) -> Self {
        Self {
            vertex_count,
            ..Self::default()
        }
    }

    fn has(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Position => self.positions.is_some(),
            ElementKind::Normal => self.normals.is_some(),
            ElementKind::Uv0 => self.uv0.is_some(),
            ElementKind::Uv1 => self.uv1.is_some(),
            ElementKind::BoneIndices => self.bone_indices.is_some(),
            ElementKind::BoneWeights => self.bone_weights.is_some(),
            ElementKind::VertexId => self.vertex_ids.is_some(),
        }
    }

    fn array_len(&self, kind: ElementKind) -> Option<usize> {
        match kind {
            ElementKind::Position => self.positions.as_ref().map(Vec::len),
            ElementKind::Normal => self.normals.as_ref().map(Vec::len),
            ElementKind::Uv0 => self.uv0.as_ref().map(Vec::len),
            ElementKind::Uv1 => self.uv1.as_ref().map(Vec::len),
            ElementKind::BoneIndices => self.bone_indices.as_ref().map(Vec::len),
            ElementKind::BoneWeights => self.bone_weights.as_ref().map(Vec::len),
            ElementKind::VertexId => self.vertex_ids.as_ref().map(Vec::len),
        }
    }

    /// The element mask recomputed from which arrays are present.
    pub fn element_mask(&self) -> u32 {
        ELEMENT_TABLE
            .iter()
            .filter(|(kind, _)| self.has(*kind))
            .fold(0, |mask, (kind, _)| mask | kind.bit())
    }

    /// Whether a morph-style vertex id resolves into this group.
    ///
    /// Membership is tested against the vertex-id array when the group has
    /// one; groups without ids fall back to positional indexing.
    pub fn contains_vertex_id(&self, id: u32) -> bool {
        match &self.vertex_ids {
            Some(ids) => ids.contains(&id),
            None => id < self.vertex_count,
        }
    }

    /// Vertices whose assigned bone weights do not sum to 1.0 within `tolerance`.
    ///
    /// Weights are stored exactly as decoded; this query is the only place
    /// normalization is judged. Vertices with no assigned bones are skipped.
    pub fn weight_sum_outliers(&self, tolerance: f32) -> Vec<(usize, f32)> {
        let (Some(bones), Some(weights)) = (&self.bone_indices, &self.bone_weights) else {
            return Vec::new();
        };
        bones
            .iter()
            .zip(weights)
            .enumerate()
            .filter_map(|(i, (assignment, w))| {
                let n = assignment.count();
                if n == 0 {
                    return None;
                }
                let sum: f32 = w[..n].iter().sum();
                ((sum - 1.0).abs() > tolerance).then_some((i, sum))
            })
            .collect()
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mask = reader.read_u32()?;
        if mask & !KNOWN_ELEMENT_MASK != 0 {
            return Err(Error::UnknownElementMask { mask });
        }
        let vertex_count = reader.read_u32()?;
        let n = vertex_count as usize;

        let mut group = VertexDataGroup::with_count(vertex_count);
        for (kind, _) in ELEMENT_TABLE {
            if mask & kind.bit() == 0 {
                continue;
            }
            match kind {
                ElementKind::Position => {
                    group.positions = Some(read_vec(reader, n, BinaryReader::read_f32x3)?)
                }
                ElementKind::Normal => {
                    group.normals = Some(read_vec(reader, n, BinaryReader::read_f32x3)?)
                }
                ElementKind::Uv0 => {
                    group.uv0 = Some(read_vec(reader, n, BinaryReader::read_f32x2)?)
                }
                ElementKind::Uv1 => {
                    group.uv1 = Some(read_vec(reader, n, BinaryReader::read_f32x2)?)
                }
                ElementKind::BoneIndices => {
                    group.bone_indices = Some(read_vec(reader, n, |r| {
                        let b = r.read_bytes(3)?;
                        Ok(BoneAssignment([b[0], b[1], b[2]]))
                    })?)
                }
                ElementKind::BoneWeights => {
                    group.bone_weights = Some(read_vec(reader, n, BinaryReader::read_f32x3)?)
                }
                ElementKind::VertexId => {
                    group.vertex_ids = Some(read_vec(reader, n, BinaryReader::read_u32)?)
                }
            }
        }
        Ok(group)
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        // Refuse to emit a group whose arrays disagree on length.
        for (kind, _) in ELEMENT_TABLE {
            if let Some(len) = self.array_len(*kind) {
                if len != self.vertex_count as usize {
                    return Err(Error::ElementArity {
                        kind: kind.name(),
                        expected: self.vertex_count as usize,
                        actual: len,
                    });
                }
            }
        }

        writer.write_u32(self.element_mask())?;
        writer.write_u32(self.vertex_count)?;
        for (kind, _) in ELEMENT_TABLE {
            match kind {
                ElementKind::Position => {
                    if let Some(v) = &self.positions {
                        for p in v {
                            writer.write_f32x3(*p)?;
                        }
                    }
                }
                ElementKind::Normal => {
                    if let Some(v) = &self.normals {
                        for p in v {
                            writer.write_f32x3(*p)?;
                        }
                    }
                }
                ElementKind::Uv0 => {
                    if let Some(v) = &self.uv0 {
                        for p in v {
                            writer.write_f32x2(*p)?;
                        }
                    }
                }
                ElementKind::Uv1 => {
                    if let Some(v) = &self.uv1 {
                        for p in v {
                            writer.write_f32x2(*p)?;
                        }
                    }
                }
                ElementKind::BoneIndices => {
                    if let Some(v) = &self.bone_indices {
                        for b in v {
                            writer.write_bytes(&b.0)?;
                        }
                    }
                }
                ElementKind::BoneWeights => {
                    if let Some(v) = &self.bone_weights {
                        for p in v {
                            writer.write_f32x3(*p)?;
                        }
                    }
                }
                ElementKind::VertexId => {
                    if let Some(v) = &self.vertex_ids {
                        for id in v {
                            writer.write_u32(*id)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// One-line synopsis of the elements present, e.g. `<VNTBW>`.
    pub fn synopsis(&self) -> String {
        let mut s = String::from("<");
        for (kind, _) in ELEMENT_TABLE {
            if self.has(*kind) {
                s.push(kind.code());
            }
        }
        s.push('>');
        s
    }
}

fn read_vec<'a, T>(
    reader: &mut BinaryReader<'a>,
    count: usize,
    mut read_one: impl FnMut(&mut BinaryReader<'a>) -> simscene_common::Result<T>,
) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(count.min(0x10000));
    for _ in 0..count {
        out.push(read_one(reader)?);
    }
    Ok(out)
}
