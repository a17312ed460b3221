//! Non-fatal findings collected during an export.

use thiserror::Error;

/// A problem worth reporting that does not stop a mesh from being exported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// Some vertices of a skinned mesh have no deform influence.
    #[error("Mesh {mesh} has {count} vertices without weights to any bone in the skeleton")]
    UnweightedVertices { mesh: String, count: usize },

    /// Trimming `.NNN` suffixes would give different textures the same name.
    #[error("Texture names {names:?} are not unique without their numbered suffix; texture names are kept as is")]
    NonUniqueTrimmedTextureName { names: Vec<String> },

    /// Trimming `.NNN` suffixes would give different materials the same label.
    #[error("Material labels {names:?} are not unique without their numbered suffix; material labels are kept as is")]
    NonUniqueTrimmedMaterialLabel { names: Vec<String> },

    /// Distinct vertices that become identical at the on-disk precision.
    #[error("Mesh {mesh} has {count} vertices that duplicate another vertex once stored")]
    DuplicateExportedVertex { mesh: String, count: usize },
}

impl Warning {
    /// Record the warning in the log and append it to `diagnostics`.
    pub(crate) fn emit(self, diagnostics: &mut Vec<Warning>) {
        tracing::warn!("{}", self);
        diagnostics.push(self);
    }
}
