//! Mesh object naming and material/texture name trimming.
//!
//! The editor keeps names unique by appending `.001`, `.002`, ... to duplicates. The game
//! instead expects the original name and tells mesh objects apart by subindex.

use crate::diagnostics::Warning;
use crate::mesh_output::ExportedMaterial;
use crate::types::HostMaterial;
use std::collections::{BTreeSet, HashMap};

/// Check for a trailing `.NNN` (a dot followed by exactly three decimal digits).
pub fn has_uniquifier_suffix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && {
        let tail = &bytes[bytes.len() - 4..];
        tail[0] == b'.' && tail[1..].iter().all(u8::is_ascii_digit)
    }
}

/// Remove trailing `.NNN` uniquifiers.
///
/// Duplicating an already numbered name stacks suffixes (`Head.001.002`), so all of
/// them are removed.
pub fn trim_uniquifier(name: &str) -> &str {
    let mut trimmed = name;
    while has_uniquifier_suffix(trimmed) {
        trimmed = &trimmed[..trimmed.len() - 4];
    }
    trimmed
}

/// Assign `(group_name, subindex)` pairs to names in input order.
///
/// Names are grouped by their trimmed form and numbered from zero within each group.
pub fn assign_subindices<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut next: HashMap<&str, u64> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let group = trim_uniquifier(name);
            let counter = next.entry(group).or_insert(0);
            let subindex = *counter;
            *counter += 1;
            (group.to_string(), subindex)
        })
        .collect()
}

/// Distinct names that trim to the same name as some other distinct name, sorted.
fn trimming_collisions<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = names.into_iter().collect();
    let mut by_trimmed: HashMap<&str, Vec<&str>> = HashMap::new();
    for &name in &distinct {
        by_trimmed.entry(trim_uniquifier(name)).or_default().push(name);
    }

    let mut collisions: Vec<String> = by_trimmed
        .into_values()
        .filter(|originals| originals.len() > 1)
        .flatten()
        .map(str::to_string)
        .collect();
    collisions.sort();
    collisions
}

/// Final material labels and texture names for a scene.
#[derive(Debug, Clone, Default)]
pub struct MaterialNames {
    trim_labels: bool,
    trim_textures: bool,
    /// Materials in input order with their final names.
    pub materials: Vec<ExportedMaterial>,
}

impl MaterialNames {
    /// Decide whether trimming keeps labels and texture names unique and apply the result.
    pub fn resolve(materials: &[HostMaterial], diagnostics: &mut Vec<Warning>) -> Self {
        let label_collisions = trimming_collisions(materials.iter().map(|m| m.label.as_str()));
        let trim_labels = label_collisions.is_empty();
        if !trim_labels {
            Warning::NonUniqueTrimmedMaterialLabel {
                names: label_collisions,
            }
            .emit(diagnostics);
        }

        let texture_collisions = trimming_collisions(
            materials
                .iter()
                .flat_map(|m| m.textures.iter().map(String::as_str)),
        );
        let trim_textures = texture_collisions.is_empty();
        if !trim_textures {
            Warning::NonUniqueTrimmedTextureName {
                names: texture_collisions,
            }
            .emit(diagnostics);
        }

        let mut names = Self {
            trim_labels,
            trim_textures,
            materials: Vec::with_capacity(materials.len()),
        };
        let exported: Vec<ExportedMaterial> = materials
            .iter()
            .map(|m| ExportedMaterial {
                label: names.label(&m.label).to_string(),
                textures: m.textures.iter().map(|t| names.texture(t).to_string()).collect(),
            })
            .collect();
        names.materials = exported;
        names
    }

    /// Final form of a material label.
    pub fn label<'a>(&self, label: &'a str) -> &'a str {
        if self.trim_labels {
            trim_uniquifier(label)
        } else {
            label
        }
    }

    /// Final form of a texture name.
    pub fn texture<'a>(&self, texture: &'a str) -> &'a str {
        if self.trim_textures {
            trim_uniquifier(texture)
        } else {
            texture
        }
    }
}
