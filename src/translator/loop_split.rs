//! Decide which loops need their own exported vertex.
//!
//! The game stores every attribute per vertex. A host vertex whose loops disagree on any
//! per-loop attribute has to be duplicated; all other loops share one vertex.

use super::extract::ExtractedMesh;

/// Tolerance for comparing normals and tangents component-wise.
pub const DIRECTION_TOLERANCE: f32 = 1e-6;

/// Result of loop splitting for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSplit {
    /// First loop referencing each vertex, `None` for vertices no loop uses.
    pub canonical_loops: Vec<Option<u32>>,
    /// Loops that become a vertex of their own.
    pub split_loops: Vec<bool>,
}

impl LoopSplit {
    /// The loop whose attributes the exported vertex for `loop_index` uses.
    ///
    /// Loops that are not split collapse onto the canonical loop of their vertex.
    pub fn source_loop(&self, loop_index: u32, loop_vertices: &[u32]) -> u32 {
        if self.split_loops[loop_index as usize] {
            loop_index
        } else {
            let vertex = loop_vertices[loop_index as usize] as usize;
            self.canonical_loops[vertex].unwrap_or(loop_index)
        }
    }

    pub fn split_count(&self) -> usize {
        self.split_loops.iter().filter(|&&s| s).count()
    }
}

fn close<const N: usize>(a: &[f32; N], b: &[f32; N]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= DIRECTION_TOLERANCE)
}

/// Compare every per-loop attribute of two loops.
fn loops_match(mesh: &ExtractedMesh, a: usize, b: usize) -> bool {
    close(&mesh.normals[a], &mesh.normals[b])
        && close(&mesh.tangents[a], &mesh.tangents[b])
        && mesh.uv_layers.iter().all(|l| l.data[a] == l.data[b])
        && mesh.color_layers.iter().all(|l| l.data[a] == l.data[b])
}

/// Mark loops that disagree with the first loop of their vertex.
///
/// Once a vertex has a split loop, every later loop of that vertex is split as well.
/// Splitting errs on the side of too many vertices; deduplication merges the excess.
pub fn split_loops(mesh: &ExtractedMesh) -> LoopSplit {
    let mut canonical_loops: Vec<Option<u32>> = vec![None; mesh.vertex_count()];
    let mut vertex_split = vec![false; mesh.vertex_count()];
    let mut split_loops = vec![false; mesh.loop_count()];

    for (loop_index, &vertex) in mesh.loop_vertices.iter().enumerate() {
        let vertex = vertex as usize;
        match canonical_loops[vertex] {
            None => canonical_loops[vertex] = Some(loop_index as u32),
            Some(canonical) => {
                if vertex_split[vertex] || !loops_match(mesh, canonical as usize, loop_index) {
                    vertex_split[vertex] = true;
                    split_loops[loop_index] = true;
                }
            }
        }
    }

    LoopSplit {
        canonical_loops,
        split_loops,
    }
}
