//! Small host meshes shared by the translator tests.

use crate::types::{HostLoop, HostMesh, HostTriangle, UvLayer};

const UP: [f32; 3] = [0.0, 0.0, 1.0];

/// One triangle in the XY plane facing +Z, with a `map1` layer matching the positions.
pub fn triangle_mesh(name: &str) -> HostMesh {
    let mut mesh = HostMesh::new(name);
    mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    mesh.loops = (0..3).map(|v| HostLoop::new(v, UP)).collect();
    mesh.triangles = vec![HostTriangle::new([0, 1, 2], 0)];
    mesh.uv_layers = vec![UvLayer {
        name: "map1".to_string(),
        data: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
    }];
    mesh.material_slots = vec![Some("mat".to_string())];
    mesh
}

/// A unit quad made of triangles (v0, v1, v2) and (v1, v3, v2) sharing the edge (v1, v2).
///
/// Loops are laid out per triangle: `[v0, v1, v2, v1, v3, v2]`. UVs match the positions.
pub fn quad_mesh(name: &str) -> HostMesh {
    let mut mesh = HostMesh::new(name);
    mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
    mesh.loops = [0, 1, 2, 1, 3, 2]
        .into_iter()
        .map(|v| HostLoop::new(v, UP))
        .collect();
    mesh.triangles = vec![
        HostTriangle::new([0, 1, 2], 0),
        HostTriangle::new([3, 4, 5], 0),
    ];
    let uvs: Vec<[f32; 2]> = mesh
        .loops
        .iter()
        .map(|l| {
            let p = mesh.positions[l.vertex as usize];
            [p[0], p[1]]
        })
        .collect();
    mesh.uv_layers = vec![UvLayer {
        name: "map1".to_string(),
        data: uvs,
    }];
    mesh.material_slots = vec![Some("mat".to_string())];
    mesh
}
