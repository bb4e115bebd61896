//! Cross-format consistency checks between geometry and skeleton files.
//!
//! Decode accepts any structurally sound file; the checks here are semantic
//! and collect every finding instead of stopping at the first, so a tool can
//! report all of a file's problems in one pass.

use thiserror::Error;

use simscene_cres::CresFile;
use simscene_gmdc::GmdcFile;

/// A single consistency finding. Never fatal: the data decoded fine, it just
/// will not render or animate the way its references claim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("subset {subset} \"{name}\": triangle index {index} at position {position} exceeds group vertex count {vertex_count}")]
    TriangleIndexOutOfRange {
        subset: usize,
        name: String,
        position: usize,
        index: u16,
        vertex_count: u32,
    },

    #[error("subset {subset} \"{name}\": references group {group}, but only {group_count} groups exist")]
    SubsetGroupOutOfRange {
        subset: usize,
        name: String,
        group: u32,
        group_count: usize,
    },

    #[error("subset {subset} \"{name}\": bone table entry {slot} is skeleton bone {bone}, but the skeleton has {bone_count} bones")]
    SubsetBoneOutOfRange {
        subset: usize,
        name: String,
        slot: usize,
        bone: u16,
        bone_count: usize,
    },

    #[error("morph {morph} \"{name}\": references group {group}, but only {group_count} groups exist")]
    MorphGroupOutOfRange {
        morph: usize,
        name: String,
        group: u32,
        group_count: usize,
    },

    #[error("morph {morph} \"{name}\": delta {delta} targets vertex id {vertex_id} not present in group {group}")]
    MorphVertexIdUnknown {
        morph: usize,
        name: String,
        delta: usize,
        vertex_id: u32,
        group: u32,
    },

    #[error("shape {shape} \"{name}\": references morph {morph}, but only {morph_count} morphs exist")]
    ShapeMorphOutOfRange {
        shape: usize,
        name: String,
        morph: u32,
        morph_count: usize,
    },

    #[error("group {group}, vertex {vertex}: bone weights sum to {sum} instead of 1.0")]
    WeightSumOffUnity { group: usize, vertex: usize, sum: f32 },
}

/// Check a geometry file against the skeleton it is rigged to.
///
/// Skeleton-dependent checks are skipped when the CRES file carries no
/// skeleton chunk; everything else runs on the geometry alone. An empty
/// result means the pair is consistent.
pub fn validate(gmdc: &GmdcFile, cres: &CresFile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let bone_count = cres.skeleton().map(|s| s.bones.len());

    for geometry in gmdc.chunks.iter().filter_map(|c| match c {
        simscene_gmdc::GmdcChunk::Geometry(g) => Some(g),
        simscene_gmdc::GmdcChunk::Opaque(_) => None,
    }) {
        let group_count = geometry.groups.len();

        for (si, subset) in geometry.subsets.iter().enumerate() {
            let Some(group) = geometry.groups.get(subset.group as usize) else {
                issues.push(ValidationIssue::SubsetGroupOutOfRange {
                    subset: si,
                    name: subset.name.clone(),
                    group: subset.group,
                    group_count,
                });
                continue;
            };

            for (pos, &index) in subset.indices.iter().enumerate() {
                if u32::from(index) >= group.vertex_count {
                    issues.push(ValidationIssue::TriangleIndexOutOfRange {
                        subset: si,
                        name: subset.name.clone(),
                        position: pos,
                        index,
                        vertex_count: group.vertex_count,
                    });
                }
            }

            if let Some(bone_count) = bone_count {
                for (slot, &bone) in subset.bones.iter().enumerate() {
                    if usize::from(bone) >= bone_count {
                        issues.push(ValidationIssue::SubsetBoneOutOfRange {
                            subset: si,
                            name: subset.name.clone(),
                            slot,
                            bone,
                            bone_count,
                        });
                    }
                }
            }
        }

        for (mi, morph) in geometry.morphs.iter().enumerate() {
            let Some(group) = geometry.groups.get(morph.group as usize) else {
                issues.push(ValidationIssue::MorphGroupOutOfRange {
                    morph: mi,
                    name: morph.name.clone(),
                    group: morph.group,
                    group_count,
                });
                continue;
            };
            for (di, delta) in morph.deltas.iter().enumerate() {
                if !group.contains_vertex_id(delta.vertex_id) {
                    issues.push(ValidationIssue::MorphVertexIdUnknown {
                        morph: mi,
                        name: morph.name.clone(),
                        delta: di,
                        vertex_id: delta.vertex_id,
                        group: morph.group,
                    });
                }
            }
        }

        for (si, shape) in geometry.shapes.iter().enumerate() {
            for &morph in &shape.morphs {
                if morph as usize >= geometry.morphs.len() {
                    issues.push(ValidationIssue::ShapeMorphOutOfRange {
                        shape: si,
                        name: shape.name.clone(),
                        morph,
                        morph_count: geometry.morphs.len(),
                    });
                }
            }
        }
    }

    issues
}

/// Report vertices whose bone weights do not sum to 1.0 within `tolerance`.
///
/// Kept apart from [`validate`]: off-unity weights are common in shipped
/// assets and many pipelines normalize at load time, so tools treat these as
/// warnings rather than inconsistencies.
pub fn weight_issues(gmdc: &GmdcFile, tolerance: f32) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for geometry in gmdc.chunks.iter().filter_map(|c| match c {
        simscene_gmdc::GmdcChunk::Geometry(g) => Some(g),
        simscene_gmdc::GmdcChunk::Opaque(_) => None,
    }) {
        for (gi, group) in geometry.groups.iter().enumerate() {
            for (vertex, sum) in group.weight_sum_outliers(tolerance) {
                issues.push(ValidationIssue::WeightSumOffUnity {
                    group: gi,
                    vertex,
                    sum,
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use simscene_cres::{Bone, CresChunk, Skeleton, SKELETON_VERSION};
    use simscene_gmdc::{
        BoneAssignment, GeometryData, GmdcChunk, ModelSubset, VertexDataGroup, NO_BONE,
    };

    fn quad_file() -> GmdcFile {
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
            ..GeometryData::default()
        };
        GmdcFile {
            links: vec![],
            chunks: vec![GmdcChunk::Geometry(geometry)],
        }
    }

    fn two_bone_skeleton() -> CresFile {
        let skeleton = Skeleton {
            name: "rig".into(),
            version: SKELETON_VERSION,
            instance_id: 2,
            bones: vec![
                Bone {
                    name: "root".into(),
                    parent: None,
                    ..Bone::default()
                },
                Bone {
                    name: "spine".into(),
                    parent: Some(0),
                    ..Bone::default()
                },
            ],
            rigged_models: vec![1],
        };
        CresFile {
            links: vec![],
            chunks: vec![CresChunk::Skeleton(skeleton)],
        }
    }

    #[test]
    fn test_consistent_pair_yields_no_issues() {
        assert!(validate(&quad_file(), &CresFile::default()).is_empty());
        assert!(validate(&quad_file(), &two_bone_skeleton()).is_empty());
    }

    #[test]
    fn test_out_of_range_triangle_index_reported_once() {
        let mut file = quad_file();
        if let GmdcChunk::Geometry(g) = &mut file.chunks[0] {
            g.subsets[0].indices[3] = 7;
        }
        let issues = validate(&file, &CresFile::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0],
            ValidationIssue::TriangleIndexOutOfRange {
                subset: 0,
                name: "quad".into(),
                position: 3,
                index: 7,
                vertex_count: 4,
            }
        );
    }

    #[test]
    fn test_subset_bone_against_skeleton() {
        let mut file = quad_file();
        if let GmdcChunk::Geometry(g) = &mut file.chunks[0] {
            g.subsets[0].bones = vec![0, 5];
        }
        // Without a skeleton the bone table is unverifiable; no issue.
        assert!(validate(&file, &CresFile::default()).is_empty());

        let issues = validate(&file, &two_bone_skeleton());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            ValidationIssue::SubsetBoneOutOfRange {
                slot: 1,
                bone: 5,
                bone_count: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_morph_vertex_id_membership() {
        let mut file = quad_file();
        if let GmdcChunk::Geometry(g) = &mut file.chunks[0] {
            g.groups[0].vertex_ids = Some(vec![10, 11, 12, 13]);
            g.morphs.push(simscene_gmdc::MorphTarget {
                name: "raise".into(),
                group: 0,
                deltas: vec![
                    simscene_gmdc::MorphDelta {
                        vertex_id: 11,
                        position: [0.0, 0.0, 0.5],
                        normal: [0.0, 0.0, 0.0],
                    },
                    simscene_gmdc::MorphDelta {
                        vertex_id: 99,
                        position: [0.0, 0.0, 0.5],
                        normal: [0.0, 0.0, 0.0],
                    },
                ],
            });
        }
        let issues = validate(&file, &CresFile::default());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            ValidationIssue::MorphVertexIdUnknown {
                delta: 1,
                vertex_id: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_shape_morph_reference() {
        let mut file = quad_file();
        if let GmdcChunk::Geometry(g) = &mut file.chunks[0] {
            g.shapes.push(simscene_gmdc::Shape {
                name: "raised".into(),
                morphs: vec![0],
            });
        }
        let issues = validate(&file, &CresFile::default());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            ValidationIssue::ShapeMorphOutOfRange {
                morph: 0,
                morph_count: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_weight_issues_off_unity() {
        let mut file = quad_file();
        if let GmdcChunk::Geometry(g) = &mut file.chunks[0] {
            let group = &mut g.groups[0];
            group.bone_indices = Some(vec![
                BoneAssignment([0, NO_BONE, NO_BONE]),
                BoneAssignment([0, 1, NO_BONE]),
                BoneAssignment([NO_BONE, NO_BONE, NO_BONE]),
                BoneAssignment([1, NO_BONE, NO_BONE]),
            ]);
            group.bone_weights = Some(vec![
                [1.0, 0.0, 0.0],
                [0.4, 0.4, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
            ]);
        }
        let issues = weight_issues(&file, 1e-3);
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            ValidationIssue::WeightSumOffUnity {
                group: 0,
                vertex: 1,
                ..
            }
        ));
    }
}
