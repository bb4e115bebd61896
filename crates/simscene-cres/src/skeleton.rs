//! Skeletons: an ordered bone hierarchy with transforms and rig references.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use simscene_common::{BinaryReader, BinaryWriter, Quat, Transform, Vec3};
use tracing::debug;

use crate::{Error, Result};

/// On-disk parent sentinel for root bones.
pub const ROOT_PARENT: u32 = 0xFFFF_FFFF;

/// A node in the skeletal hierarchy.
///
/// The inverse-bind transform is carried exactly as stored; a caller that
/// alters the bind pose is responsible for recomputing it before encode.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bone {
    pub name: String,
    /// Parent position in the bone table, `None` for roots.
    pub parent: Option<u32>,
    pub local: Transform,
    pub inverse_bind: Transform,
}

/// An ordered bone list plus the geometry chunk instance ids it rigs.
///
/// Invariant (enforced at decode and encode): every non-root bone's parent
/// index refers to a strictly earlier table position, so the parent graph is
/// acyclic and traversal order never needs forward references.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skeleton {
    /// Resource name carried in the chunk.
    pub name: String,
    /// Chunk version as decoded (or [`SKELETON_VERSION`](crate::SKELETON_VERSION) for new data).
    pub version: u32,
    /// Chunk instance id.
    pub instance_id: u32,
    pub bones: Vec<Bone>,
    /// Instance ids of the geometry chunks rigged by this skeleton.
    pub rigged_models: Vec<u32>,
}

impl Skeleton {
    /// Fold local transforms up the parent chain into a world transform.
    ///
    /// A pure function over the current bone data, so it stays consistent
    /// with caller-edited local transforms. Iteration is bounded by the bone
    /// count; a caller-mutated cyclic chain yields [`Error::CyclicSkeleton`]
    /// instead of hanging.
    pub fn compose_world_transform(&self, bone_index: usize) -> Result<Transform> {
        let bone = self
            .bones
            .get(bone_index)
            .ok_or(Error::DanglingBoneReference {
                bone: bone_index,
                parent: bone_index as u32,
                bone_count: self.bones.len(),
            })?;

        let mut world = bone.local;
        let mut current = bone.parent;
        let mut steps = 0;
        while let Some(parent) = current {
            let parent_bone =
                self.bones
                    .get(parent as usize)
                    .ok_or(Error::DanglingBoneReference {
                        bone: bone_index,
                        parent,
                        bone_count: self.bones.len(),
                    })?;
            world = parent_bone.local.then_local(&world);
            current = parent_bone.parent;
            steps += 1;
            if steps > self.bones.len() {
                return Err(Error::CyclicSkeleton {
                    bone: bone_index,
                    parent,
                });
            }
        }
        Ok(world)
    }

    /// Verify the parent graph: in-range indices, roots or earlier parents only.
    pub fn check_hierarchy(&self) -> Result<()> {
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent as usize >= self.bones.len() {
                    return Err(Error::DanglingBoneReference {
                        bone: i,
                        parent,
                        bone_count: self.bones.len(),
                    });
                }
                if parent as usize >= i {
                    return Err(Error::CyclicSkeleton { bone: i, parent });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let name = reader.read_str()?.to_owned();
        let bone_count = reader.read_u32()? as usize;
        debug!(bone_count, name = %name, "decoding skeleton chunk");

        let mut bones = Vec::with_capacity(bone_count.min(1024));
        for i in 0..bone_count {
            let bone_name = reader.read_str()?.to_owned();
            let parent_raw = reader.read_u32()?;
            let parent = (parent_raw != ROOT_PARENT).then_some(parent_raw);
            if let Some(parent) = parent {
                if parent as usize >= bone_count {
                    return Err(Error::DanglingBoneReference {
                        bone: i,
                        parent,
                        bone_count,
                    });
                }
                if parent as usize >= i {
                    return Err(Error::CyclicSkeleton { bone: i, parent });
                }
            }
            let local = read_transform(reader)?;
            let inverse_bind = read_transform(reader)?;
            bones.push(Bone {
                name: bone_name,
                parent,
                local,
                inverse_bind,
            });
        }

        let rig_count = reader.read_u32()? as usize;
        let mut rigged_models = Vec::with_capacity(rig_count.min(1024));
        for _ in 0..rig_count {
            rigged_models.push(reader.read_u32()?);
        }

        Ok(Self {
            name,
            version: 0,
            instance_id: 0,
            bones,
            rigged_models,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.check_hierarchy()?;

        writer.write_str(&self.name)?;
        writer.write_u32(self.bones.len() as u32)?;
        for bone in &self.bones {
            writer.write_str(&bone.name)?;
            writer.write_u32(bone.parent.unwrap_or(ROOT_PARENT))?;
            write_transform(writer, &bone.local)?;
            write_transform(writer, &bone.inverse_bind)?;
        }
        writer.write_u32(self.rigged_models.len() as u32)?;
        for id in &self.rigged_models {
            writer.write_u32(*id)?;
        }
        Ok(())
    }
}

fn read_transform(reader: &mut BinaryReader<'_>) -> Result<Transform> {
    let translation = Vec3::from_array(reader.read_f32x3()?);
    let rotation = Quat::from_array(reader.read_f32x4()?);
    let scale = reader.read_f32()?;
    Ok(Transform::new(translation, rotation, scale))
}

fn write_transform(writer: &mut BinaryWriter, t: &Transform) -> Result<()> {
    writer.write_f32x3(t.translation.to_array())?;
    writer.write_f32x4(t.rotation.to_array())?;
    writer.write_f32(t.scale)?;
    Ok(())
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Skeleton \"{}\" ({} bones, rigs {} models)",
            self.name,
            self.bones.len(),
            self.rigged_models.len()
        )?;
        // Children are printed under their parents; topological order makes
        // a single pass per root sufficient.
        fn print_subtree(
            f: &mut fmt::Formatter<'_>,
            skeleton: &Skeleton,
            parent: Option<u32>,
            indent: usize,
        ) -> fmt::Result {
            for (i, bone) in skeleton.bones.iter().enumerate() {
                if bone.parent == parent {
                    writeln!(
                        f,
                        "{:indent$}#{i} \"{}\" loc ({:.3}, {:.3}, {:.3})",
                        "",
                        bone.name,
                        bone.local.translation.x,
                        bone.local.translation.y,
                        bone.local.translation.z,
                        indent = indent
                    )?;
                    print_subtree(f, skeleton, Some(i as u32), indent + 2)?;
                }
            }
            Ok(())
        }
        print_subtree(f, self, None, 2)
    }
}
