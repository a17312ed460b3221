//! Move meshes rigidly weighted to a single bone into that bone's space.

use crate::mesh_output::ExportedMesh;
use glam::{Mat4, Vec3};

/// The only bone a mesh is weighted to, if every vertex is weighted to that one bone.
pub fn single_bone(mesh: &ExportedMesh) -> Option<&str> {
    match mesh.bone_influences.as_slice() {
        [influence] if influence.vertex_weights.len() == mesh.vertex_count() => {
            Some(&influence.bone_name)
        }
        _ => None,
    }
}

/// Transform a mesh into the local frame of `bone_world` and parent it to `bone_name`.
///
/// Positions get the full inverse transform. Normals and tangents only get its rotation,
/// keeping their fourth component.
pub fn reparent_to_bone(mesh: &mut ExportedMesh, bone_name: &str, bone_world: Mat4) {
    let inverse = bone_world.inverse();
    let (_, rotation, _) = inverse.to_scale_rotation_translation();

    for p in &mut mesh.positions {
        *p = inverse.transform_point3(Vec3::from_array(*p)).to_array();
    }
    for v in mesh.normals.iter_mut().chain(mesh.tangents.iter_mut()) {
        let [x, y, z] = (rotation * Vec3::new(v[0], v[1], v[2])).to_array();
        *v = [x, y, z, v[3]];
    }

    mesh.bone_influences.clear();
    mesh.parent_bone_name = Some(bone_name.to_string());
}
