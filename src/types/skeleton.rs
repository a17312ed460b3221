//! Skeleton lookups used by skin weight filtering and single-bone reparenting.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Read-only access to the bones of the skeleton being exported alongside the meshes.
///
/// Transforms are in the game frame, matching the axis-corrected mesh data.
pub trait BoneSet {
    /// Check whether a bone with this name exists.
    fn contains(&self, name: &str) -> bool;

    /// World-space transform of the named bone.
    fn world_transform(&self, name: &str) -> Option<Mat4>;
}

/// A single bone record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Transform as four columns of a 4x4 matrix.
    pub transform: [[f32; 4]; 4],
    #[serde(default)]
    pub parent_index: Option<usize>,
}

impl Bone {
    pub fn new(name: impl Into<String>, transform: Mat4, parent_index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            transform: transform.to_cols_array_2d(),
            parent_index,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform)
    }
}

/// An ordered list of bones with world-space transforms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Create a skeleton from bones whose transforms are already in world space.
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    /// Create a skeleton from bones whose transforms are relative to their parent.
    ///
    /// Parents must come before their children. A parent index that does not point
    /// to an earlier bone is treated as a root.
    pub fn from_local_transforms(bones: Vec<Bone>) -> Self {
        let mut world: Vec<Mat4> = Vec::with_capacity(bones.len());
        let mut out = Vec::with_capacity(bones.len());

        for (i, bone) in bones.into_iter().enumerate() {
            let local = bone.matrix();
            let transform = match bone.parent_index {
                Some(parent) if parent < i => world[parent] * local,
                _ => local,
            };
            world.push(transform);
            out.push(Bone::new(bone.name, transform, bone.parent_index));
        }

        Self { bones: out }
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

impl BoneSet for Skeleton {
    fn contains(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    fn world_transform(&self, name: &str) -> Option<Mat4> {
        self.bone(name).map(Bone::matrix)
    }
}
