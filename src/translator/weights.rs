//! Vertex group weights to normalized bone influences.

use crate::error::{Result, TranslatorError};
use crate::mesh_output::{BoneInfluence, VertexWeight, MAX_INFLUENCES};
use crate::types::{BoneSet, HostMesh};
use smallvec::SmallVec;

/// Influences of one vertex as `(bone slot, weight)` pairs.
pub type VertexInfluences = SmallVec<[(u16, f32); MAX_INFLUENCES]>;

/// Normalized skin weights of a host mesh, indexed by host vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinWeights {
    /// Deform vertex groups, indexed by bone slot.
    pub bone_names: Vec<String>,
    /// Influences summing to one, or empty for unweighted vertices.
    pub vertex_influences: Vec<VertexInfluences>,
    /// Vertices with no deform influence or a zero weight sum.
    pub unweighted_vertices: usize,
}

impl SkinWeights {
    /// Returns `true` if any vertex is weighted to a bone.
    pub fn is_skinned(&self) -> bool {
        self.vertex_influences.iter().any(|v| !v.is_empty())
    }

    pub fn influences(&self, vertex: usize) -> &[(u16, f32)] {
        self.vertex_influences
            .get(vertex)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Bucket influences of exported vertices by bone.
    ///
    /// `source_vertices[i]` is the host vertex behind exported vertex `i`. Bones that end
    /// up without vertices are left out.
    pub fn bone_influences(&self, source_vertices: &[u32]) -> Vec<BoneInfluence> {
        let mut buckets: Vec<Vec<VertexWeight>> = vec![Vec::new(); self.bone_names.len()];
        for (vertex_index, &source) in source_vertices.iter().enumerate() {
            for &(slot, weight) in self.influences(source as usize) {
                buckets[slot as usize].push(VertexWeight {
                    vertex_index: vertex_index as u32,
                    vertex_weight: weight,
                });
            }
        }

        self.bone_names
            .iter()
            .zip(buckets)
            .filter(|(_, weights)| !weights.is_empty())
            .map(|(name, vertex_weights)| BoneInfluence {
                bone_name: name.clone(),
                vertex_weights,
            })
            .collect()
    }
}

/// Keep deform groups only, reject vertices over the influence cap and normalize.
///
/// A `skin` array must be empty or hold one entry per vertex. Excess influences are
/// never dropped.
pub fn normalize_weights<B: BoneSet + ?Sized>(mesh: &HostMesh, bones: &B) -> Result<SkinWeights> {
    if !mesh.skin.is_empty() && mesh.skin.len() != mesh.vertex_count() {
        return Err(TranslatorError::AttributeLength {
            mesh: mesh.name.clone(),
            layer: "skin".to_string(),
            expected: mesh.vertex_count(),
            actual: mesh.skin.len(),
        });
    }

    let mut bone_names = Vec::new();
    let group_slots: Vec<Option<u16>> = mesh
        .vertex_groups
        .iter()
        .map(|name| {
            bones.contains(name).then(|| {
                bone_names.push(name.clone());
                (bone_names.len() - 1) as u16
            })
        })
        .collect();

    let mut vertex_influences = Vec::with_capacity(mesh.vertex_count());
    let mut unweighted_vertices = 0;

    for vertex in 0..mesh.vertex_count() {
        let mut influences = VertexInfluences::new();
        for w in mesh.vertex_weights(vertex) {
            let slot = group_slots.get(w.group as usize).ok_or_else(|| {
                TranslatorError::InvalidTopology {
                    mesh: mesh.name.clone(),
                    reason: format!("vertex {} references vertex group {}", vertex, w.group),
                }
            })?;
            if let Some(slot) = *slot {
                if w.weight != 0.0 {
                    influences.push((slot, w.weight));
                }
            }
        }

        if influences.len() > MAX_INFLUENCES {
            return Err(TranslatorError::TooManyInfluences {
                mesh: mesh.name.clone(),
                vertex,
                count: influences.len(),
            });
        }

        let sum: f32 = influences.iter().map(|(_, w)| w).sum();
        if influences.is_empty() || sum == 0.0 {
            unweighted_vertices += 1;
            influences.clear();
        } else {
            for (_, w) in influences.iter_mut() {
                *w /= sum;
            }
        }
        vertex_influences.push(influences);
    }

    Ok(SkinWeights {
        bone_names,
        vertex_influences,
        unweighted_vertices,
    })
}
