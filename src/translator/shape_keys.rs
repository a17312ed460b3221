//! Shape key expansion into additional mesh objects.
//!
//! Keys whose name contains a marker (`_VIS` by default) become mesh objects of their own,
//! used by the game to swap geometry visibility instead of blending it.

use crate::error::{Result, TranslatorError};
use crate::types::HostMesh;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Default substring marking shape keys that become separate mesh objects.
pub const DEFAULT_SHAPE_KEY_MARKER: &str = "_VIS";

/// How shape keys are turned into exported meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKeyMode {
    /// Export one mesh per marked key and the base mesh.
    ExpandAndKeepBase,
    /// Export one mesh per marked key only.
    ExpandAndDropBase,
    /// Export the base mesh with all keys mixed in at their current values.
    #[default]
    Ignore,
}

/// A mesh to extract: the host topology with a possibly different set of positions.
#[derive(Debug, Clone)]
pub struct MeshVariant<'a> {
    /// Name used for grouping, before trimming.
    pub name: Cow<'a, str>,
    /// Positions in the host frame.
    pub positions: Cow<'a, [[f32; 3]]>,
    pub mesh: &'a HostMesh,
}

impl<'a> MeshVariant<'a> {
    /// The mesh as stored, without any shape key applied.
    pub fn basis(mesh: &'a HostMesh) -> Self {
        Self {
            name: Cow::Borrowed(&mesh.name),
            positions: Cow::Borrowed(&mesh.positions),
            mesh,
        }
    }
}

fn add_scaled(base: &[[f32; 3]], offsets: &[[f32; 3]], scale: f32) -> Vec<[f32; 3]> {
    base.iter()
        .zip(offsets)
        .map(|(p, o)| [p[0] + o[0] * scale, p[1] + o[1] * scale, p[2] + o[2] * scale])
        .collect()
}

/// The basis with every key applied at its current value.
fn current_mix(mesh: &HostMesh) -> Cow<'_, [[f32; 3]]> {
    let mut positions = Cow::Borrowed(mesh.positions.as_slice());
    for key in mesh.shape_keys.iter().filter(|k| k.value != 0.0) {
        positions = Cow::Owned(add_scaled(&positions, &key.offsets, key.value));
    }
    positions
}

/// Produce the meshes to export for one host mesh.
///
/// Meshes without any marked key are exported once with the current mix regardless of
/// `mode`.
pub fn expand_shape_keys<'a>(
    mesh: &'a HostMesh,
    mode: ShapeKeyMode,
    marker: &str,
) -> Result<Vec<MeshVariant<'a>>> {
    for key in &mesh.shape_keys {
        if key.offsets.len() != mesh.vertex_count() {
            return Err(TranslatorError::AttributeLength {
                mesh: mesh.name.clone(),
                layer: key.name.clone(),
                expected: mesh.vertex_count(),
                actual: key.offsets.len(),
            });
        }
    }

    let marked: Vec<_> = mesh
        .shape_keys
        .iter()
        .filter(|k| k.name.contains(marker))
        .collect();

    if mode == ShapeKeyMode::Ignore || marked.is_empty() {
        return Ok(vec![MeshVariant {
            name: Cow::Borrowed(&mesh.name),
            positions: current_mix(mesh),
            mesh,
        }]);
    }

    let mut variants = Vec::with_capacity(marked.len() + 1);
    if mode == ShapeKeyMode::ExpandAndKeepBase {
        variants.push(MeshVariant::basis(mesh));
    }
    for key in marked {
        tracing::debug!("Expanding shape key {} of mesh {}", key.name, mesh.name);
        variants.push(MeshVariant {
            name: Cow::Borrowed(&key.name),
            positions: Cow::Owned(add_scaled(&mesh.positions, &key.offsets, 1.0)),
            mesh,
        });
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeKey;

    fn keyed_mesh() -> HostMesh {
        let mut mesh = HostMesh::new("Face");
        mesh.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        mesh.shape_keys = vec![
            ShapeKey {
                name: "Smile".to_string(),
                offsets: vec![[0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
                value: 0.5,
            },
            ShapeKey {
                name: "Blink_VIS".to_string(),
                offsets: vec![[0.0, 2.0, 0.0], [0.0, 2.0, 0.0]],
                value: 0.0,
            },
            ShapeKey {
                name: "Angry_VIS".to_string(),
                offsets: vec![[3.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
                value: 1.0,
            },
        ];
        mesh
    }

    #[test]
    fn test_ignore_flattens_current_mix() {
        let mesh = keyed_mesh();
        let variants = expand_shape_keys(&mesh, ShapeKeyMode::Ignore, "_VIS").unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].name, "Face");
        assert_eq!(
            variants[0].positions.as_ref(),
            &[[3.0, 0.0, 0.5], [1.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_expand_and_keep_base() {
        let mesh = keyed_mesh();
        let variants =
            expand_shape_keys(&mesh, ShapeKeyMode::ExpandAndKeepBase, "_VIS").unwrap();
        let names: Vec<_> = variants.iter().map(|v| v.name.as_ref()).collect();
        assert_eq!(names, vec!["Face", "Blink_VIS", "Angry_VIS"]);

        // Base has every key at zero, marked keys are fully applied on their own.
        assert_eq!(variants[0].positions.as_ref(), mesh.positions.as_slice());
        assert_eq!(variants[1].positions.as_ref(), &[[0.0, 2.0, 0.0], [1.0, 2.0, 0.0]]);
        assert_eq!(variants[2].positions.as_ref(), &[[3.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_expand_and_drop_base() {
        let mesh = keyed_mesh();
        let variants =
            expand_shape_keys(&mesh, ShapeKeyMode::ExpandAndDropBase, "_VIS").unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].name, "Blink_VIS");
    }

    #[test]
    fn test_custom_marker_and_unmarked_mesh() {
        let mesh = keyed_mesh();
        let variants =
            expand_shape_keys(&mesh, ShapeKeyMode::ExpandAndDropBase, "_HIDE").unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].name, "Face");
    }

    #[test]
    fn test_key_length_mismatch() {
        let mut mesh = keyed_mesh();
        mesh.shape_keys[0].offsets.pop();
        let result = expand_shape_keys(&mesh, ShapeKeyMode::Ignore, "_VIS");
        assert!(matches!(
            result,
            Err(TranslatorError::AttributeLength { expected: 2, actual: 1, .. })
        ));
    }
}
