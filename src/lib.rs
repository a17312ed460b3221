//! # SSBH Mesh Export
//!
//! A Rust library for turning editor meshes into game-ready mesh objects.
//!
//! ## Overview
//!
//! This library takes a scene of editor meshes (Z-up, per-loop attributes, arbitrary
//! vertex groups, multiple materials per mesh) and a skeleton as input, and produces
//! single-material, Y-up, per-vertex mesh objects with normalized bone influences,
//! ready to be written as mesh, skin and model-entry data.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ssbh_mesh_export::{load_scene, Skeleton, Translator};
//!
//! // Load an editor scene
//! let scene = load_scene("path/to/scene.json")?;
//!
//! // Create a translator against the target skeleton
//! let skeleton = Skeleton::new(bones);
//! let translator = Translator::new(&skeleton);
//!
//! // Translate every mesh, collecting warnings and per-mesh failures
//! let output = translator.translate(&scene);
//! for entry in output.model_entries() {
//!     println!("{}.{} -> {}", entry.mesh_object_name, entry.mesh_object_subindex, entry.material_label);
//! }
//! ```
//!
//! ## Library Integration
//!
//! For integrating with an existing skeleton representation, implement the
//! `BoneSet` trait instead of building a [`Skeleton`]:
//!
//! ```ignore
//! use ssbh_mesh_export::{BoneSet, Translator, TranslatorConfig};
//!
//! let config = TranslatorConfig::default().with_single_bone_reparenting(true);
//! let output = Translator::with_config(&my_bones, config).translate(&scene);
//! ```

pub mod diagnostics;
pub mod error;
pub mod mesh_output;
pub mod names;
pub mod translator;
pub mod types;

// Re-export main types for convenience
pub use diagnostics::Warning;
pub use error::{Result, TranslatorError};
pub use mesh_output::{
    AttributeData, BoneInfluence, ExportOutput, ExportedMaterial, ExportedMesh, ModelEntry,
    VertexWeight,
};
pub use translator::{translate, ShapeKeyMode, Translator, TranslatorConfig};
pub use types::{
    AttributeDomain, Bone, BoneSet, ColorLayer, GroupWeight, HostLoop, HostMaterial, HostMesh,
    HostScene, HostTriangle, ShapeKey, Skeleton, UvLayer,
};

/// Load an editor scene from a JSON file.
pub fn load_scene<P: AsRef<std::path::Path>>(path: P) -> Result<HostScene> {
    let bytes = std::fs::read(path.as_ref())?;
    tracing::debug!("Loading scene from {}", path.as_ref().display());
    load_scene_from_bytes(&bytes)
}

/// Load an editor scene from JSON bytes.
pub fn load_scene_from_bytes(data: &[u8]) -> Result<HostScene> {
    let scene: HostScene = serde_json::from_slice(data)?;
    tracing::debug!(
        "Loaded scene with {} meshes and {} materials",
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}
