//! Mikktspace tangent generation over host triangles.

use bevy_mikktspace::Geometry;

/// Triangle soup view of a host mesh for mikktspace. Tangents are written per loop.
struct LoopGeometry<'a> {
    positions: &'a [[f32; 3]],
    loop_vertices: &'a [u32],
    normals: &'a [[f32; 3]],
    uvs: &'a [[f32; 2]],
    triangles: &'a [[u32; 3]],
    tangents: Vec<[f32; 4]>,
}

impl LoopGeometry<'_> {
    fn loop_index(&self, face: usize, vert: usize) -> usize {
        self.triangles[face][vert] as usize
    }
}

impl Geometry for LoopGeometry<'_> {
    fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        let l = self.loop_index(face, vert);
        self.positions[self.loop_vertices[l] as usize]
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.normals[self.loop_index(face, vert)]
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.uvs[self.loop_index(face, vert)]
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let l = self.loop_index(face, vert);
        self.tangents[l] = tangent;
    }
}

/// Generate per-loop tangents. The fourth component is the bitangent sign.
///
/// All indices must already be validated. Returns `None` if mikktspace fails.
pub(crate) fn generate_loop_tangents(
    positions: &[[f32; 3]],
    loop_vertices: &[u32],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    triangles: &[[u32; 3]],
) -> Option<Vec<[f32; 4]>> {
    let mut geometry = LoopGeometry {
        positions,
        loop_vertices,
        normals,
        uvs,
        triangles,
        tangents: vec![[1.0, 0.0, 0.0, 1.0]; loop_vertices.len()],
    };
    if triangles.is_empty() {
        return Some(geometry.tangents);
    }
    bevy_mikktspace::generate_tangents(&mut geometry).then_some(geometry.tangents)
}
