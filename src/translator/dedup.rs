//! Collapse exported vertices with identical attributes and compact the index buffer.

use super::extract::ExtractedMesh;
use super::partition::MeshDraft;
use super::weights::SkinWeights;
use crate::mesh_output::AttributeData;
use half::f16;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use xxhash_rust::xxh3::xxh3_64;

/// Per-vertex arrays of a single-material mesh after deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupedMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 4]>,
    pub tangents: Vec<[f32; 4]>,
    pub uv_layers: Vec<AttributeData<2>>,
    pub color_layers: Vec<AttributeData<4>>,
    pub indices: Vec<u32>,
    /// Host vertex behind each exported vertex.
    pub source_vertices: Vec<u32>,
}

impl DedupedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn push_floats(bytes: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
}

/// Exact attribute bytes of the vertex a loop becomes, skin influences included.
fn vertex_bytes(mesh: &ExtractedMesh, weights: &SkinWeights, loop_index: usize, bytes: &mut Vec<u8>) {
    bytes.clear();
    let vertex = mesh.loop_vertices[loop_index] as usize;
    push_floats(bytes, &mesh.positions[vertex]);
    push_floats(bytes, &mesh.normals[loop_index]);
    push_floats(bytes, &mesh.tangents[loop_index]);
    for layer in &mesh.uv_layers {
        push_floats(bytes, &layer.data[loop_index]);
    }
    for layer in &mesh.color_layers {
        push_floats(bytes, &layer.data[loop_index]);
    }
    for &(slot, weight) in weights.influences(vertex) {
        bytes.extend_from_slice(&slot.to_le_bytes());
        bytes.extend_from_slice(&weight.to_le_bytes());
    }
}

/// Walk the draft's indices and emit each distinct vertex once, in first-use order.
///
/// Vertices the draft never references are not emitted.
pub fn deduplicate(mesh: &ExtractedMesh, draft: &MeshDraft, weights: &SkinWeights) -> DedupedMesh {
    let mut by_loop: HashMap<u32, u32> = HashMap::new();
    let mut by_fingerprint: HashMap<u64, SmallVec<[u32; 1]>> = HashMap::new();
    let mut source_loops: Vec<u32> = Vec::new();
    let mut indices = Vec::with_capacity(draft.loop_indices.len());

    let mut bytes = Vec::new();
    let mut candidate_bytes = Vec::new();

    for &loop_index in &draft.loop_indices {
        if let Some(&index) = by_loop.get(&loop_index) {
            indices.push(index);
            continue;
        }

        vertex_bytes(mesh, weights, loop_index as usize, &mut bytes);
        let candidates = by_fingerprint.entry(xxh3_64(&bytes)).or_default();
        let existing = candidates.iter().copied().find(|&candidate| {
            vertex_bytes(
                mesh,
                weights,
                source_loops[candidate as usize] as usize,
                &mut candidate_bytes,
            );
            candidate_bytes == bytes
        });

        let index = existing.unwrap_or_else(|| {
            let index = source_loops.len() as u32;
            source_loops.push(loop_index);
            candidates.push(index);
            index
        });
        by_loop.insert(loop_index, index);
        indices.push(index);
    }

    let gather4 = |data: &[[f32; 4]]| -> Vec<[f32; 4]> {
        source_loops.iter().map(|&l| data[l as usize]).collect()
    };
    let source_vertices: Vec<u32> = source_loops
        .iter()
        .map(|&l| mesh.loop_vertices[l as usize])
        .collect();

    DedupedMesh {
        positions: source_vertices
            .iter()
            .map(|&v| mesh.positions[v as usize])
            .collect(),
        normals: gather4(&mesh.normals),
        tangents: gather4(&mesh.tangents),
        uv_layers: mesh
            .uv_layers
            .iter()
            .map(|layer| {
                AttributeData::new(
                    layer.name.clone(),
                    source_loops.iter().map(|&l| layer.data[l as usize]).collect(),
                )
            })
            .collect(),
        color_layers: mesh
            .color_layers
            .iter()
            .map(|layer| AttributeData::new(layer.name.clone(), gather4(&layer.data)))
            .collect(),
        indices,
        source_vertices,
    }
}

/// Count vertices that become identical once normals and tangents are stored as half floats.
pub fn count_stored_duplicates(mesh: &DedupedMesh, weights: &SkinWeights) -> usize {
    let mut seen = HashSet::with_capacity(mesh.vertex_count());
    let mut duplicates = 0;

    for i in 0..mesh.vertex_count() {
        let mut bytes = Vec::new();
        push_floats(&mut bytes, &mesh.positions[i]);
        for v in mesh.normals[i].iter().chain(&mesh.tangents[i]) {
            bytes.extend_from_slice(&f16::from_f32(*v).to_bits().to_le_bytes());
        }
        for layer in &mesh.uv_layers {
            push_floats(&mut bytes, &layer.data[i]);
        }
        for layer in &mesh.color_layers {
            push_floats(&mut bytes, &layer.data[i]);
        }
        for &(slot, weight) in weights.influences(mesh.source_vertices[i] as usize) {
            bytes.extend_from_slice(&slot.to_le_bytes());
            bytes.extend_from_slice(&weight.to_le_bytes());
        }

        if !seen.insert(bytes) {
            duplicates += 1;
        }
    }

    duplicates
}
