//! Canonical output types handed to the mesh serializer.
//!
//! [`ExportedMesh`] mirrors a mesh object of the game's mesh container: strictly
//! per-vertex attributes, a triangle list, one material and either a parent bone or a
//! list of bone influences. [`ExportOutput`] bundles the meshes of one export call with
//! the final material names and everything that went wrong along the way.

use crate::diagnostics::Warning;
use crate::error::TranslatorError;
use crate::names::has_uniquifier_suffix;
use crate::types::{is_valid_color_layer_name, is_valid_uv_layer_name};
use std::collections::HashSet;

/// Largest vertex count a skinned mesh can address with 16-bit indices.
pub const MAX_SKINNED_VERTICES: usize = u16::MAX as usize + 1;

/// Maximum number of bone influences per vertex.
pub const MAX_INFLUENCES: usize = 4;

/// Tolerance on the weight sum of a skinned vertex.
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

/// A named per-vertex attribute with `N` components.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeData<const N: usize> {
    pub name: String,
    pub data: Vec<[f32; N]>,
}

impl<const N: usize> AttributeData<N> {
    pub fn new(name: impl Into<String>, data: Vec<[f32; N]>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A single vertex weighted to a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_index: u32,
    pub vertex_weight: f32,
}

/// All vertices weighted to one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneInfluence {
    pub bone_name: String,
    pub vertex_weights: Vec<VertexWeight>,
}

/// A single-material mesh object ready for serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportedMesh {
    /// Mesh object name without the `.NNN` uniquifier.
    pub group_name: String,
    /// Distinguishes mesh objects sharing `group_name`.
    pub subindex: u64,
    /// Label of the material assigned to this mesh object.
    pub material_label: String,
    pub positions: Vec<[f32; 3]>,
    /// Normals padded with a zero fourth component.
    pub normals: Vec<[f32; 4]>,
    /// Tangents with the bitangent sign in the fourth component.
    pub tangents: Vec<[f32; 4]>,
    pub uv_layers: Vec<AttributeData<2>>,
    pub color_layers: Vec<AttributeData<4>>,
    pub indices: Vec<u32>,
    /// Bone the whole mesh follows. Exclusive with `bone_influences`.
    pub parent_bone_name: Option<String>,
    pub bone_influences: Vec<BoneInfluence>,
}

impl ExportedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_skinned(&self) -> bool {
        !self.bone_influences.is_empty()
    }

    /// Per-vertex weight totals and influence counts, indexed by vertex.
    pub fn influence_stats(&self) -> Vec<(usize, f32)> {
        let mut stats = vec![(0usize, 0.0f32); self.vertex_count()];
        for influence in &self.bone_influences {
            for w in &influence.vertex_weights {
                if let Some(s) = stats.get_mut(w.vertex_index as usize) {
                    s.0 += 1;
                    s.1 += w.vertex_weight;
                }
            }
        }
        stats
    }

    /// Check the invariants the serializer relies on.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.vertex_count();

        if self.normals.len() != n || self.tangents.len() != n {
            return Err(format!(
                "{} positions but {} normals and {} tangents",
                n,
                self.normals.len(),
                self.tangents.len()
            ));
        }
        for layer in &self.uv_layers {
            if layer.data.len() != n {
                return Err(format!("UV layer {} has {} values", layer.name, layer.data.len()));
            }
            if !is_valid_uv_layer_name(&layer.name) {
                return Err(format!("invalid UV layer name {}", layer.name));
            }
        }
        for layer in &self.color_layers {
            if layer.data.len() != n {
                return Err(format!("color layer {} has {} values", layer.name, layer.data.len()));
            }
            if !is_valid_color_layer_name(&layer.name) {
                return Err(format!("invalid color layer name {}", layer.name));
            }
        }

        if self.indices.len() % 3 != 0 {
            return Err(format!("{} indices is not a triangle list", self.indices.len()));
        }
        if let Some(i) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(format!("index {} out of range for {} vertices", i, n));
        }

        if self.parent_bone_name.is_some() && self.is_skinned() {
            return Err("mesh has both a parent bone and bone influences".to_string());
        }
        if self.is_skinned() && n > MAX_SKINNED_VERTICES {
            return Err(format!("skinned mesh has {} vertices", n));
        }

        for influence in &self.bone_influences {
            if let Some(w) = influence.vertex_weights.iter().find(|w| w.vertex_weight <= 0.0) {
                return Err(format!(
                    "non-positive weight {} on vertex {} for bone {}",
                    w.vertex_weight, w.vertex_index, influence.bone_name
                ));
            }
        }
        for (vertex, (count, sum)) in self.influence_stats().into_iter().enumerate() {
            if count > MAX_INFLUENCES {
                return Err(format!("vertex {} has {} influences", vertex, count));
            }
            if count > 0 && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(format!("vertex {} weights sum to {}", vertex, sum));
            }
        }

        if has_uniquifier_suffix(&self.group_name) {
            return Err(format!("group name {} has a uniquifier suffix", self.group_name));
        }

        Ok(())
    }
}

/// Final names of a scene material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMaterial {
    pub label: String,
    pub textures: Vec<String>,
}

/// A model entry linking a mesh object to its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry<'a> {
    pub mesh_object_name: &'a str,
    pub mesh_object_subindex: u64,
    pub material_label: &'a str,
}

/// Everything produced by one export call.
#[derive(Debug, Default)]
pub struct ExportOutput {
    /// Mesh objects in input order.
    pub meshes: Vec<ExportedMesh>,
    /// Scene materials with their final names, in input order.
    pub materials: Vec<ExportedMaterial>,
    /// Warnings. Affected meshes are still exported.
    pub diagnostics: Vec<Warning>,
    /// Meshes that were dropped and why.
    pub failures: Vec<TranslatorError>,
}

impl ExportOutput {
    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(ExportedMesh::vertex_count).sum()
    }

    pub fn total_triangles(&self) -> usize {
        self.meshes.iter().map(ExportedMesh::triangle_count).sum()
    }

    /// Returns `true` if every mesh was exported.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The mesh object with this name and subindex.
    pub fn mesh(&self, group_name: &str, subindex: u64) -> Option<&ExportedMesh> {
        self.meshes
            .iter()
            .find(|m| m.group_name == group_name && m.subindex == subindex)
    }

    /// One model entry per mesh object.
    pub fn model_entries(&self) -> impl Iterator<Item = ModelEntry<'_>> {
        self.meshes.iter().map(|m| ModelEntry {
            mesh_object_name: &m.group_name,
            mesh_object_subindex: m.subindex,
            material_label: &m.material_label,
        })
    }

    /// Validate every mesh and the uniqueness of `(group_name, subindex)` pairs.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for mesh in &self.meshes {
            mesh.validate()
                .map_err(|e| format!("{}.{}: {}", mesh.group_name, mesh.subindex, e))?;
            if !seen.insert((mesh.group_name.as_str(), mesh.subindex)) {
                return Err(format!(
                    "duplicate mesh object {} subindex {}",
                    mesh.group_name, mesh.subindex
                ));
            }
        }
        Ok(())
    }
}
