//! Host-side input types shared throughout the library.

mod skeleton;
mod transform;

pub use skeleton::{Bone, BoneSet, Skeleton};
pub use transform::{flip_v, to_game_frame, AXIS_CORRECTION};

use serde::{Deserialize, Serialize};

/// UV layer names the game's shaders know about.
pub const UV_LAYER_NAMES: [&str; 5] = ["map1", "bake1", "uvSet", "uvSet1", "uvSet2"];

/// Color layer names the game's shaders know about.
pub const COLOR_LAYER_NAMES: [&str; 10] = [
    "colorSet1",
    "colorSet2",
    "colorSet2_1",
    "colorSet2_2",
    "colorSet2_3",
    "colorSet3",
    "colorSet4",
    "colorSet5",
    "colorSet6",
    "colorSet7",
];

/// Check a UV layer name against [`UV_LAYER_NAMES`].
pub fn is_valid_uv_layer_name(name: &str) -> bool {
    UV_LAYER_NAMES.contains(&name)
}

/// Check a color layer name against [`COLOR_LAYER_NAMES`].
pub fn is_valid_color_layer_name(name: &str) -> bool {
    COLOR_LAYER_NAMES.contains(&name)
}

/// The element an attribute value is stored on in the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDomain {
    /// One value per vertex.
    PerVertex,
    /// One value per face corner (loop).
    PerLoop,
    /// One value per face.
    PerFace,
    /// One value per edge.
    PerEdge,
}

/// A face corner: a reference to a vertex plus its split normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostLoop {
    /// Index into [`HostMesh::positions`].
    pub vertex: u32,
    /// Custom split normal in the host frame.
    pub normal: [f32; 3],
}

impl HostLoop {
    pub fn new(vertex: u32, normal: [f32; 3]) -> Self {
        Self { vertex, normal }
    }
}

/// A triangle referencing three loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTriangle {
    /// Indices into [`HostMesh::loops`].
    pub loops: [u32; 3],
    /// Index into [`HostMesh::material_slots`].
    #[serde(default)]
    pub material_index: u32,
}

impl HostTriangle {
    pub fn new(loops: [u32; 3], material_index: u32) -> Self {
        Self {
            loops,
            material_index,
        }
    }
}

/// A per-loop UV layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvLayer {
    pub name: String,
    /// One UV per loop.
    pub data: Vec<[f32; 2]>,
}

/// A color layer stored on either vertices or loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorLayer {
    pub name: String,
    pub domain: AttributeDomain,
    /// RGBA values, one per element of `domain`.
    pub data: Vec<[f32; 4]>,
}

/// Membership of a vertex in a vertex group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupWeight {
    /// Index into [`HostMesh::vertex_groups`].
    pub group: u32,
    pub weight: f32,
}

impl GroupWeight {
    pub fn new(group: u32, weight: f32) -> Self {
        Self { group, weight }
    }
}

/// A shape key stored as per-vertex displacements from the basis positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    pub name: String,
    /// Displacement per vertex in the host frame.
    pub offsets: Vec<[f32; 3]>,
    /// Current mix value in the editor.
    #[serde(default)]
    pub value: f32,
}

/// An evaluated editor mesh. Modifiers are expected to be applied already.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMesh {
    /// Object name, possibly carrying a `.NNN` uniquifier suffix.
    pub name: String,
    /// Vertex positions in the host frame (Z-up).
    pub positions: Vec<[f32; 3]>,
    pub loops: Vec<HostLoop>,
    pub triangles: Vec<HostTriangle>,
    pub uv_layers: Vec<UvLayer>,
    pub color_layers: Vec<ColorLayer>,
    /// Optional precomputed per-loop tangents: xyz plus the host bitangent sign.
    /// Generated with mikktspace when absent.
    pub tangents: Option<Vec<[f32; 4]>>,
    /// Vertex group names, indexed by [`GroupWeight::group`].
    pub vertex_groups: Vec<String>,
    /// Per-vertex group memberships. Empty or one list per vertex.
    pub skin: Vec<Vec<GroupWeight>>,
    /// Material labels by slot. `None` is an empty slot.
    pub material_slots: Vec<Option<String>>,
    pub shape_keys: Vec<ShapeKey>,
}

impl HostMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Group memberships of a vertex, empty if the mesh has no skin data for it.
    pub fn vertex_weights(&self, vertex: usize) -> &[GroupWeight] {
        self.skin.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A material as referenced by mesh material slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMaterial {
    /// Material label, possibly carrying a `.NNN` uniquifier suffix.
    pub label: String,
    /// Names of the textures the material samples.
    pub textures: Vec<String>,
}

impl HostMaterial {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            textures: Vec::new(),
        }
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.textures.push(texture.into());
        self
    }
}

/// Everything selected for export in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostScene {
    pub meshes: Vec<HostMesh>,
    pub materials: Vec<HostMaterial>,
}
