//! Split a multi-material mesh into single-material drafts.

use super::extract::ExtractedMesh;
use super::loop_split::LoopSplit;
use std::collections::BTreeMap;

/// Triangles of one material, indexed by source loop.
///
/// Each index names the loop whose attributes the exported vertex uses. Vertices are
/// only materialized by the deduplicator, so loops a draft never references do not
/// end up in its exported mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshDraft {
    pub material_slot: u32,
    /// Source loop per triangle corner.
    pub loop_indices: Vec<u32>,
}

impl MeshDraft {
    pub fn triangle_count(&self) -> usize {
        self.loop_indices.len() / 3
    }
}

/// Build one draft per material slot that has at least one triangle.
///
/// Drafts are ordered by material slot.
pub fn partition(mesh: &ExtractedMesh, split: &LoopSplit) -> Vec<MeshDraft> {
    let mut drafts: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

    for (triangle, &slot) in mesh.triangles.iter().zip(&mesh.triangle_materials) {
        let indices = drafts.entry(slot).or_default();
        indices.extend(
            triangle
                .iter()
                .map(|&l| split.source_loop(l, &mesh.loop_vertices)),
        );
    }

    drafts
        .into_iter()
        .map(|(material_slot, loop_indices)| MeshDraft {
            material_slot,
            loop_indices,
        })
        .collect()
}
