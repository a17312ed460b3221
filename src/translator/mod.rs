//! Translation of editor meshes into single-material mesh objects.
//!
//! Each host mesh goes through the same stages:
//! shape key expansion, attribute extraction, loop splitting, material partitioning,
//! weight normalization, optional single-bone reparenting and vertex deduplication.
//! Names are disambiguated once all meshes of a scene are done.

pub mod dedup;
pub mod extract;
pub mod loop_split;
pub mod partition;
pub mod reparent;
pub mod shape_keys;
mod tangents;
pub mod weights;

#[cfg(test)]
pub(crate) mod test_support;

pub use shape_keys::{ShapeKeyMode, DEFAULT_SHAPE_KEY_MARKER};

use crate::diagnostics::Warning;
use crate::error::{Result, TranslatorError};
use crate::mesh_output::{ExportOutput, ExportedMesh, MAX_SKINNED_VERTICES};
use crate::names::{assign_subindices, MaterialNames};
use crate::types::{BoneSet, HostMesh, HostScene};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Translator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Parent meshes weighted to exactly one bone to that bone instead of skinning them.
    /// Breaks meshes that are meant to deform.
    pub reparent_single_bone: bool,
    /// How shape keys become meshes.
    pub shape_keys: ShapeKeyMode,
    /// Substring marking shape keys that become separate meshes.
    pub shape_key_marker: String,
    /// Multiplier per color layer name. Missing layers are not scaled.
    pub color_scales: HashMap<String, f32>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            reparent_single_bone: false,
            shape_keys: ShapeKeyMode::default(),
            shape_key_marker: DEFAULT_SHAPE_KEY_MARKER.to_string(),
            color_scales: HashMap::new(),
        }
    }
}

impl TranslatorConfig {
    /// Enable or disable single-bone reparenting.
    pub fn with_single_bone_reparenting(mut self, enabled: bool) -> Self {
        self.reparent_single_bone = enabled;
        self
    }

    /// Set the shape key handling mode.
    pub fn with_shape_keys(mut self, mode: ShapeKeyMode) -> Self {
        self.shape_keys = mode;
        self
    }

    /// Set the substring marking shape keys that become separate meshes.
    pub fn with_shape_key_marker(mut self, marker: impl Into<String>) -> Self {
        self.shape_key_marker = marker.into();
        self
    }

    /// Scale a color layer on export.
    pub fn with_color_scale(mut self, layer: impl Into<String>, scale: f32) -> Self {
        self.color_scales.insert(layer.into(), scale);
        self
    }

    /// Multiplier for a color layer, `1.0` if none is configured.
    pub fn color_scale(&self, layer: &str) -> f32 {
        self.color_scales.get(layer).copied().unwrap_or(1.0)
    }
}

/// Converts host scenes to exported mesh objects against a fixed skeleton.
pub struct Translator<'a, B: BoneSet + ?Sized> {
    bones: &'a B,
    config: TranslatorConfig,
}

impl<'a, B: BoneSet + ?Sized> Translator<'a, B> {
    /// Create a translator with default configuration.
    pub fn new(bones: &'a B) -> Self {
        Self {
            bones,
            config: TranslatorConfig::default(),
        }
    }

    /// Create a translator with custom configuration.
    pub fn with_config(bones: &'a B, config: TranslatorConfig) -> Self {
        Self { bones, config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate every mesh of a scene.
    ///
    /// A mesh that fails is dropped and recorded in [`ExportOutput::failures`]; the
    /// others are still exported. Output meshes keep input order.
    pub fn translate(&self, scene: &HostScene) -> ExportOutput {
        let mut diagnostics = Vec::new();
        let mut failures = Vec::new();
        let names = MaterialNames::resolve(&scene.materials, &mut diagnostics);

        let mut meshes = Vec::new();
        for host in &scene.meshes {
            match self.translate_mesh(host, &mut diagnostics) {
                Ok(translated) => meshes.extend(translated),
                Err(e) => {
                    tracing::warn!("Skipping mesh {}: {}", host.name, e);
                    failures.push(e);
                }
            }
        }

        let assigned = assign_subindices(meshes.iter().map(|m| m.group_name.as_str()));
        for (mesh, (group_name, subindex)) in meshes.iter_mut().zip(assigned) {
            mesh.group_name = group_name;
            mesh.subindex = subindex;
            mesh.material_label = names.label(&mesh.material_label).to_string();
            debug_assert_eq!(mesh.validate(), Ok(()));
        }

        let output = ExportOutput {
            meshes,
            materials: names.materials,
            diagnostics,
            failures,
        };
        tracing::info!(
            "Translated {} mesh objects ({} vertices, {} triangles), {} meshes failed",
            output.meshes.len(),
            output.total_vertices(),
            output.total_triangles(),
            output.failures.len()
        );
        output
    }

    /// Translate one host mesh into one mesh object per material and marked shape key.
    ///
    /// Group names are the untrimmed host or shape key names and every subindex is zero;
    /// [`translate`](Self::translate) assigns the final names.
    pub fn translate_mesh(
        &self,
        mesh: &HostMesh,
        diagnostics: &mut Vec<Warning>,
    ) -> Result<Vec<ExportedMesh>> {
        let variants = shape_keys::expand_shape_keys(
            mesh,
            self.config.shape_keys,
            &self.config.shape_key_marker,
        )?;

        let weights = weights::normalize_weights(mesh, self.bones)?;
        if weights.is_skinned() && weights.unweighted_vertices > 0 {
            Warning::UnweightedVertices {
                mesh: mesh.name.clone(),
                count: weights.unweighted_vertices,
            }
            .emit(diagnostics);
        }

        let mut exported = Vec::new();
        for variant in &variants {
            let extracted = extract::extract(variant, &self.config)?;
            let split = loop_split::split_loops(&extracted);
            tracing::debug!("{}: {} split loops", extracted.name, split.split_count());

            for draft in partition::partition(&extracted, &split) {
                let deduped = dedup::deduplicate(&extracted, &draft, &weights);

                let duplicates = dedup::count_stored_duplicates(&deduped, &weights);
                if duplicates > 0 {
                    Warning::DuplicateExportedVertex {
                        mesh: extracted.name.clone(),
                        count: duplicates,
                    }
                    .emit(diagnostics);
                }

                let material_label = mesh
                    .material_slots
                    .get(draft.material_slot as usize)
                    .cloned()
                    .flatten()
                    .unwrap_or_default();

                let mut object = ExportedMesh {
                    group_name: extracted.name.clone(),
                    subindex: 0,
                    material_label,
                    bone_influences: weights.bone_influences(&deduped.source_vertices),
                    positions: deduped.positions,
                    normals: deduped.normals,
                    tangents: deduped.tangents,
                    uv_layers: deduped.uv_layers,
                    color_layers: deduped.color_layers,
                    indices: deduped.indices,
                    parent_bone_name: None,
                };

                if self.config.reparent_single_bone {
                    self.reparent(&mut object);
                }

                if object.is_skinned() && object.vertex_count() > MAX_SKINNED_VERTICES {
                    return Err(TranslatorError::SkinnedIndexOverflow {
                        mesh: extracted.name.clone(),
                        vertex_count: object.vertex_count(),
                    });
                }

                tracing::info!(
                    "Exported {} ({}): {} vertices, {} triangles, {} bones",
                    object.group_name,
                    object.material_label,
                    object.vertex_count(),
                    object.triangle_count(),
                    object.bone_influences.len()
                );
                exported.push(object);
            }
        }

        Ok(exported)
    }

    fn reparent(&self, object: &mut ExportedMesh) {
        let Some(bone) = reparent::single_bone(object).map(str::to_string) else {
            return;
        };
        match self.bones.world_transform(&bone) {
            Some(world) => {
                tracing::debug!("Parenting {} to bone {}", object.group_name, bone);
                reparent::reparent_to_bone(object, &bone, world);
            }
            None => tracing::warn!(
                "Bone {} has no transform, keeping {} skinned",
                bone,
                object.group_name
            ),
        }
    }
}

/// Translate a scene with the given skeleton and configuration.
pub fn translate<B: BoneSet + ?Sized>(
    scene: &HostScene,
    bones: &B,
    config: TranslatorConfig,
) -> ExportOutput {
    Translator::with_config(bones, config).translate(scene)
}

#[cfg(test)]
mod tests {
    use super::test_support::{quad_mesh, triangle_mesh};
    use super::*;
    use crate::types::{
        to_game_frame, Bone, GroupWeight, HostLoop, HostMaterial, HostTriangle, ShapeKey,
        Skeleton, UvLayer,
    };
    use glam::{Mat4, Vec3};

    fn scene(meshes: Vec<HostMesh>) -> HostScene {
        HostScene {
            meshes,
            materials: vec![HostMaterial::new("mat")],
        }
    }

    fn skeleton(bones: &[(&str, Mat4)]) -> Skeleton {
        Skeleton::new(
            bones
                .iter()
                .map(|(name, transform)| Bone::new(*name, *transform, None))
                .collect(),
        )
    }

    fn weight_all(mesh: &mut HostMesh, group: &str) {
        mesh.vertex_groups = vec![group.to_string()];
        mesh.skin = vec![vec![GroupWeight::new(0, 1.0)]; mesh.vertex_count()];
    }

    #[test]
    fn test_single_triangle() {
        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![triangle_mesh("Tri")]));
        assert!(output.is_complete());
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.meshes.len(), 1);

        let mesh = &output.meshes[0];
        assert_eq!(mesh.group_name, "Tri");
        assert_eq!(mesh.subindex, 0);
        assert_eq!(mesh.material_label, "mat");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(
            mesh.uv_layers[0].data,
            vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]
        );
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 1.0, 0.0, 0.0]));
        assert!(mesh.parent_bone_name.is_none());
        assert!(mesh.bone_influences.is_empty());
        assert_eq!(output.validate(), Ok(()));
    }

    #[test]
    fn test_shared_vertex_with_split_uv() {
        let mut mesh = quad_mesh("Quad");
        // v1 is loop 1 in the first triangle and loop 3 in the second.
        mesh.uv_layers[0].data[1] = [0.5, 0.0];
        mesh.uv_layers[0].data[3] = [1.0, 0.0];

        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![mesh.clone()]));
        let exported = &output.meshes[0];

        let v1 = to_game_frame(mesh.positions[1]);
        let copies = exported.positions.iter().filter(|p| **p == v1).count();
        assert_eq!(copies, 2);
        assert_eq!(exported.vertex_count(), 5);
        assert_eq!(exported.triangle_count(), 2);
    }

    #[test]
    fn test_smooth_quad_shares_vertices() {
        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![quad_mesh("Quad")]));
        assert_eq!(output.meshes[0].vertex_count(), 4);
        assert_eq!(output.meshes[0].indices.len(), 6);
    }

    #[test]
    fn test_two_materials() {
        let mut mesh = quad_mesh("Quad");
        mesh.material_slots = vec![Some("skin".to_string()), Some("cloth.001".to_string())];
        mesh.triangles[1].material_index = 1;
        let scene = HostScene {
            meshes: vec![mesh],
            materials: vec![HostMaterial::new("skin"), HostMaterial::new("cloth.001")],
        };

        let output = Translator::new(&Skeleton::default()).translate(&scene);
        assert_eq!(output.meshes.len(), 2);
        assert_eq!(output.total_triangles(), 2);

        let entries: Vec<_> = output
            .model_entries()
            .map(|e| (e.mesh_object_name, e.mesh_object_subindex, e.material_label))
            .collect();
        assert_eq!(entries, vec![("Quad", 0, "skin"), ("Quad", 1, "cloth")]);
        assert_eq!(output.materials[1].label, "cloth");

        // Each partition only keeps the vertices its triangle uses.
        assert!(output.meshes.iter().all(|m| m.vertex_count() == 3));
    }

    #[test]
    fn test_weight_normalization() {
        let mut mesh = triangle_mesh("Body");
        mesh.vertex_groups = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        mesh.skin = vec![
            vec![GroupWeight::new(0, 0.4), GroupWeight::new(1, 0.4), GroupWeight::new(2, 0.3)],
            vec![GroupWeight::new(0, 1.0)],
            vec![GroupWeight::new(1, 0.25)],
        ];
        let bones = skeleton(&[("A", Mat4::IDENTITY), ("B", Mat4::IDENTITY)]);

        let output = Translator::new(&bones).translate(&scene(vec![mesh]));
        let exported = &output.meshes[0];
        assert_eq!(output.validate(), Ok(()));

        let stats = exported.influence_stats();
        assert!(stats.iter().all(|&(count, sum)| count > 0 && (sum - 1.0).abs() <= 1e-4));
        let a = &exported.bone_influences[0];
        assert_eq!(a.bone_name, "A");
        assert_eq!(a.vertex_weights[0].vertex_weight, 0.5);
    }

    #[test]
    fn test_too_many_influences_drops_only_that_mesh() {
        let names = ["A", "B", "C", "D", "E"];
        let mut bad = triangle_mesh("Bad");
        bad.vertex_groups = names.iter().map(|n| n.to_string()).collect();
        bad.skin = vec![(0..5).map(|g| GroupWeight::new(g, 0.2)).collect(); 3];
        let good = triangle_mesh("Good");
        let bones = skeleton(&names.map(|n| (n, Mat4::IDENTITY)));

        let output = Translator::new(&bones).translate(&scene(vec![bad, good]));
        assert_eq!(output.meshes.len(), 1);
        assert_eq!(output.meshes[0].group_name, "Good");
        assert_eq!(output.failures.len(), 1);
        assert!(matches!(
            output.failures[0],
            TranslatorError::TooManyInfluences { count: 5, .. }
        ));
        assert_eq!(output.failures[0].mesh_name(), Some("Bad"));
    }

    #[test]
    fn test_name_disambiguation() {
        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![
            triangle_mesh("Head"),
            triangle_mesh("Head.001"),
            triangle_mesh("Head.002"),
        ]));

        let names: Vec<_> = output
            .meshes
            .iter()
            .map(|m| (m.group_name.as_str(), m.subindex))
            .collect();
        assert_eq!(names, vec![("Head", 0), ("Head", 1), ("Head", 2)]);
        assert_eq!(output.validate(), Ok(()));
    }

    #[test]
    fn test_stacked_name_suffixes() {
        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![
            triangle_mesh("Head.001.002"),
            triangle_mesh("Head"),
        ]));

        assert!(output.is_complete());
        assert_eq!(output.meshes[0].group_name, "Head");
        assert_eq!(output.meshes[0].subindex, 0);
        assert_eq!(output.meshes[1].group_name, "Head");
        assert_eq!(output.meshes[1].subindex, 1);
        assert_eq!(output.validate(), Ok(()));
    }

    #[test]
    fn test_partially_weighted_mesh_stays_skinned() {
        let mut mesh = quad_mesh("Hat");
        mesh.vertex_groups = vec!["B".to_string()];
        mesh.skin = vec![vec![GroupWeight::new(0, 1.0)], vec![], vec![], vec![]];
        let bones = skeleton(&[("B", Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))]);
        let config = TranslatorConfig::default().with_single_bone_reparenting(true);

        let output = Translator::with_config(&bones, config).translate(&scene(vec![mesh]));
        let exported = &output.meshes[0];
        assert!(exported.parent_bone_name.is_none());
        assert_eq!(exported.bone_influences.len(), 1);
        assert_eq!(exported.bone_influences[0].vertex_weights.len(), 1);
        assert_eq!(
            output.diagnostics,
            vec![Warning::UnweightedVertices {
                mesh: "Hat".to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_single_bone_reparent() {
        let mut mesh = quad_mesh("Hat");
        weight_all(&mut mesh, "B");
        let bones = skeleton(&[("B", Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))]);
        let config = TranslatorConfig::default().with_single_bone_reparenting(true);

        let output = Translator::with_config(&bones, config).translate(&scene(vec![mesh.clone()]));
        let exported = &output.meshes[0];

        assert_eq!(exported.parent_bone_name.as_deref(), Some("B"));
        assert!(exported.bone_influences.is_empty());
        for p in &exported.positions {
            let host = mesh
                .positions
                .iter()
                .map(|&h| Vec3::from_array(to_game_frame(h)) - Vec3::new(1.0, 2.0, 3.0))
                .find(|h| h.abs_diff_eq(Vec3::from_array(*p), 1e-5));
            assert!(host.is_some(), "unexpected position {:?}", p);
        }
    }

    #[test]
    fn test_single_bone_kept_skinned_without_opt_in() {
        let mut mesh = quad_mesh("Hat");
        weight_all(&mut mesh, "B");
        let bones = skeleton(&[("B", Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))]);

        let output = Translator::new(&bones).translate(&scene(vec![mesh]));
        let exported = &output.meshes[0];
        assert!(exported.parent_bone_name.is_none());
        assert_eq!(exported.bone_influences.len(), 1);
        assert_eq!(exported.bone_influences[0].vertex_weights.len(), 4);
    }

    #[test]
    fn test_multi_bone_mesh_is_not_reparented() {
        let mut mesh = quad_mesh("Arm");
        mesh.vertex_groups = vec!["A".to_string(), "B".to_string()];
        mesh.skin = vec![
            vec![GroupWeight::new(0, 1.0)],
            vec![GroupWeight::new(0, 1.0)],
            vec![GroupWeight::new(1, 1.0)],
            vec![GroupWeight::new(1, 1.0)],
        ];
        let bones = skeleton(&[("A", Mat4::IDENTITY), ("B", Mat4::IDENTITY)]);
        let config = TranslatorConfig::default().with_single_bone_reparenting(true);

        let output = Translator::with_config(&bones, config).translate(&scene(vec![mesh]));
        assert!(output.meshes[0].parent_bone_name.is_none());
        assert_eq!(output.meshes[0].bone_influences.len(), 2);
    }

    #[test]
    fn test_unweighted_vertices_warn() {
        let mut mesh = triangle_mesh("Body");
        mesh.vertex_groups = vec!["A".to_string()];
        mesh.skin = vec![vec![GroupWeight::new(0, 1.0)], vec![], vec![]];
        let bones = skeleton(&[("A", Mat4::IDENTITY)]);

        let output = Translator::new(&bones).translate(&scene(vec![mesh]));
        assert_eq!(output.meshes.len(), 1);
        assert_eq!(
            output.diagnostics,
            vec![Warning::UnweightedVertices {
                mesh: "Body".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_loop_split_adds_vertices() {
        // Hard edge: both triangles share v1 and v2 but disagree on their normals.
        let mut mesh = quad_mesh("Crease");
        for l in &mut mesh.loops[3..] {
            l.normal = [0.0, 0.6, 0.8];
        }
        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![mesh.clone()]));
        assert!(output.meshes[0].vertex_count() > mesh.vertex_count());
        assert_eq!(output.meshes[0].vertex_count(), 6);
    }

    #[test]
    fn test_shape_key_expansion() {
        let mut mesh = triangle_mesh("Face");
        mesh.shape_keys = vec![ShapeKey {
            name: "Blink_VIS".to_string(),
            offsets: vec![[0.0, 0.0, 1.0]; 3],
            value: 0.0,
        }];
        let config = TranslatorConfig::default().with_shape_keys(ShapeKeyMode::ExpandAndKeepBase);

        let output = Translator::with_config(&Skeleton::default(), config)
            .translate(&scene(vec![mesh]));
        assert_eq!(output.meshes.len(), 2);
        assert_eq!(output.meshes[0].group_name, "Face");
        assert_eq!(output.meshes[1].group_name, "Blink_VIS");
        assert_eq!(output.meshes[1].subindex, 0);
        // Host +Z is game +Y.
        assert!(output.meshes[1].positions.iter().all(|p| p[1] == 1.0));
    }

    #[test]
    fn test_failure_kinds_are_reported_per_mesh() {
        let mut no_uv = triangle_mesh("NoUv");
        no_uv.uv_layers.clear();
        let mut bad_slot = triangle_mesh("BadSlot");
        bad_slot.triangles[0].material_index = 4;
        let empty = HostMesh::new("Empty");

        let output = Translator::new(&Skeleton::default()).translate(&scene(vec![
            no_uv,
            bad_slot,
            empty,
            triangle_mesh("Ok"),
        ]));
        assert_eq!(output.meshes.len(), 1);
        let failed: Vec<_> = output.failures.iter().filter_map(|e| e.mesh_name()).collect();
        assert_eq!(failed, vec!["NoUv", "BadSlot", "Empty"]);
    }

    #[test]
    fn test_skinned_index_overflow() {
        let triangles = MAX_SKINNED_VERTICES / 3 + 1;
        let mut mesh = HostMesh::new("Huge");
        mesh.positions = (0..triangles)
            .flat_map(|t| {
                let x = 2.0 * t as f32;
                [[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]]
            })
            .collect();
        mesh.loops = (0..mesh.positions.len() as u32)
            .map(|v| HostLoop::new(v, [0.0, 0.0, 1.0]))
            .collect();
        mesh.triangles = (0..triangles as u32)
            .map(|t| HostTriangle::new([t * 3, t * 3 + 1, t * 3 + 2], 0))
            .collect();
        mesh.uv_layers = vec![UvLayer {
            name: "map1".to_string(),
            data: mesh.positions.iter().map(|p| [p[0], p[1]]).collect(),
        }];
        mesh.material_slots = vec![Some("mat".to_string())];
        weight_all(&mut mesh, "A");
        let bones = skeleton(&[("A", Mat4::IDENTITY)]);

        let output = Translator::new(&bones).translate(&scene(vec![mesh]));
        assert!(output.meshes.is_empty());
        assert!(matches!(
            output.failures[0],
            TranslatorError::SkinnedIndexOverflow { .. }
        ));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = TranslatorConfig::default()
            .with_shape_keys(ShapeKeyMode::ExpandAndDropBase)
            .with_shape_key_marker("_HIDE")
            .with_color_scale("colorSet1", 2.0);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TranslatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let partial: TranslatorConfig =
            serde_json::from_str(r#"{"reparent_single_bone": true}"#).unwrap();
        assert!(partial.reparent_single_bone);
        assert_eq!(partial.shape_key_marker, "_VIS");
        assert_eq!(partial.color_scale("colorSet5"), 1.0);
    }
}
