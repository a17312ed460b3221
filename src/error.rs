//! Error types for the mesh translator.

use crate::types::AttributeDomain;
use thiserror::Error;

/// Result type alias using TranslatorError.
pub type Result<T> = std::result::Result<T, TranslatorError>;

/// Main error type for mesh translation.
///
/// Every mesh-level variant names the offending mesh. A mesh-level error drops
/// only that mesh; the rest of the export continues.
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// I/O error while reading a scene dump.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a JSON scene dump.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The mesh has no vertices.
    #[error("Mesh {mesh} has no vertices")]
    EmptyMesh { mesh: String },

    /// Tangent generation needs at least one UV layer.
    #[error("Mesh {mesh} has no UV layer to generate tangents from")]
    NoUvLayer { mesh: String },

    /// A UV layer name outside the fixed name set.
    #[error("Mesh {mesh} has UV layer {name:?}, expected one of map1, bake1, uvSet, uvSet1, uvSet2")]
    BadUvLayerName { mesh: String, name: String },

    /// A color layer name outside the fixed name set.
    #[error("Mesh {mesh} has color layer {name:?}, expected colorSet1..colorSet7 or colorSet2_1..colorSet2_3")]
    BadColorLayerName { mesh: String, name: String },

    /// A color layer stored on a domain other than vertices or face corners.
    #[error("Mesh {mesh} stores color layer {layer} on the {domain:?} domain, expected vertex or face corner")]
    UnsupportedAttributeDomain {
        mesh: String,
        layer: String,
        domain: AttributeDomain,
    },

    /// An attribute layer or shape key whose length does not match its domain.
    #[error("Mesh {mesh} layer {layer} has {actual} elements, expected {expected}")]
    AttributeLength {
        mesh: String,
        layer: String,
        expected: usize,
        actual: usize,
    },

    /// A loop or triangle references an element that does not exist.
    #[error("Mesh {mesh} has invalid topology: {reason}")]
    InvalidTopology { mesh: String, reason: String },

    /// A vertex has more than four non-zero deform influences.
    #[error("Vertex {vertex} in mesh {mesh} has {count} influences, the limit is 4")]
    TooManyInfluences {
        mesh: String,
        vertex: usize,
        count: usize,
    },

    /// A skinned mesh needs more vertices than 16-bit indices can address.
    #[error("Skinned mesh {mesh} has {vertex_count} vertices, the limit is 65536")]
    SkinnedIndexOverflow { mesh: String, vertex_count: usize },

    /// A triangle uses a material slot that is missing or empty.
    #[error("Triangle {triangle} in mesh {mesh} uses material slot {slot}, which has no material")]
    MissingMaterialSlot {
        mesh: String,
        triangle: usize,
        slot: usize,
    },

    /// Mikktspace could not produce tangents.
    #[error("Failed to generate tangents for mesh {mesh}")]
    TangentGeneration { mesh: String },
}

impl TranslatorError {
    /// The mesh this error belongs to, if it is a mesh-level error.
    pub fn mesh_name(&self) -> Option<&str> {
        match self {
            Self::Io(_) | Self::Json(_) => None,
            Self::EmptyMesh { mesh }
            | Self::NoUvLayer { mesh }
            | Self::BadUvLayerName { mesh, .. }
            | Self::BadColorLayerName { mesh, .. }
            | Self::UnsupportedAttributeDomain { mesh, .. }
            | Self::AttributeLength { mesh, .. }
            | Self::InvalidTopology { mesh, .. }
            | Self::TooManyInfluences { mesh, .. }
            | Self::SkinnedIndexOverflow { mesh, .. }
            | Self::MissingMaterialSlot { mesh, .. }
            | Self::TangentGeneration { mesh } => Some(mesh),
        }
    }
}
