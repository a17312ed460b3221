//! Pull dense per-vertex and per-loop arrays out of a host mesh.
//!
//! Topology is left untouched. Positions, normals and tangents are moved into the game
//! frame, UVs are V-flipped and per-vertex colors are broadcast to loops.

use super::shape_keys::MeshVariant;
use super::tangents::generate_loop_tangents;
use super::TranslatorConfig;
use crate::error::{Result, TranslatorError};
use crate::mesh_output::AttributeData;
use crate::types::{
    flip_v, is_valid_color_layer_name, is_valid_uv_layer_name, to_game_frame, AttributeDomain,
    HostMesh,
};

/// UV layer preferred for tangent generation.
const TANGENT_UV_LAYER: &str = "map1";

/// Host mesh data in the game frame, still indexed by host vertex and loop.
#[derive(Debug, Clone)]
pub struct ExtractedMesh {
    pub name: String,
    /// Per vertex.
    pub positions: Vec<[f32; 3]>,
    /// Vertex index of each loop.
    pub loop_vertices: Vec<u32>,
    /// Per loop, padded with a zero fourth component.
    pub normals: Vec<[f32; 4]>,
    /// Per loop, bitangent sign in the fourth component.
    pub tangents: Vec<[f32; 4]>,
    /// Per loop.
    pub uv_layers: Vec<AttributeData<2>>,
    /// Per loop.
    pub color_layers: Vec<AttributeData<4>>,
    /// Loop indices of each triangle.
    pub triangles: Vec<[u32; 3]>,
    /// Material slot of each triangle.
    pub triangle_materials: Vec<u32>,
}

impl ExtractedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loop_vertices.len()
    }
}

fn length_error(mesh: &HostMesh, layer: &str, expected: usize, actual: usize) -> TranslatorError {
    TranslatorError::AttributeLength {
        mesh: mesh.name.clone(),
        layer: layer.to_string(),
        expected,
        actual,
    }
}

/// Check indices and material slots before anything reads through them.
fn validate_topology(mesh: &HostMesh, vertex_count: usize) -> Result<()> {
    let topology = |reason: String| TranslatorError::InvalidTopology {
        mesh: mesh.name.clone(),
        reason,
    };

    if let Some((i, l)) = mesh
        .loops
        .iter()
        .enumerate()
        .find(|(_, l)| l.vertex as usize >= vertex_count)
    {
        return Err(topology(format!(
            "loop {} references vertex {} of {}",
            i,
            l.vertex,
            vertex_count
        )));
    }

    for (i, tri) in mesh.triangles.iter().enumerate() {
        if let Some(l) = tri.loops.iter().find(|&&l| l as usize >= mesh.loop_count()) {
            return Err(topology(format!(
                "triangle {} references loop {} of {}",
                i,
                l,
                mesh.loop_count()
            )));
        }

        let slot = tri.material_index as usize;
        if !matches!(mesh.material_slots.get(slot), Some(Some(_))) {
            return Err(TranslatorError::MissingMaterialSlot {
                mesh: mesh.name.clone(),
                triangle: i,
                slot,
            });
        }
    }

    Ok(())
}

/// Pick the UV layer tangents are generated from.
fn tangent_uv_layer(mesh: &HostMesh) -> Result<usize> {
    mesh.uv_layers
        .iter()
        .position(|l| l.name == TANGENT_UV_LAYER)
        .or_else(|| (!mesh.uv_layers.is_empty()).then_some(0))
        .ok_or_else(|| TranslatorError::NoUvLayer {
            mesh: mesh.name.clone(),
        })
}

fn extract_uv_layers(mesh: &HostMesh) -> Result<Vec<AttributeData<2>>> {
    mesh.uv_layers
        .iter()
        .map(|layer| {
            if !is_valid_uv_layer_name(&layer.name) {
                return Err(TranslatorError::BadUvLayerName {
                    mesh: mesh.name.clone(),
                    name: layer.name.clone(),
                });
            }
            if layer.data.len() != mesh.loop_count() {
                return Err(length_error(mesh, &layer.name, mesh.loop_count(), layer.data.len()));
            }
            Ok(AttributeData::new(
                layer.name.clone(),
                layer.data.iter().copied().map(flip_v).collect(),
            ))
        })
        .collect()
}

fn extract_color_layers(
    mesh: &HostMesh,
    vertex_count: usize,
    config: &TranslatorConfig,
) -> Result<Vec<AttributeData<4>>> {
    mesh.color_layers
        .iter()
        .map(|layer| {
            if !is_valid_color_layer_name(&layer.name) {
                return Err(TranslatorError::BadColorLayerName {
                    mesh: mesh.name.clone(),
                    name: layer.name.clone(),
                });
            }

            let scale = config.color_scale(&layer.name);
            let scaled = |c: [f32; 4]| c.map(|x| x * scale);

            let data: Vec<[f32; 4]> = match layer.domain {
                AttributeDomain::PerLoop => {
                    if layer.data.len() != mesh.loop_count() {
                        return Err(length_error(
                            mesh,
                            &layer.name,
                            mesh.loop_count(),
                            layer.data.len(),
                        ));
                    }
                    layer.data.iter().copied().map(scaled).collect()
                }
                AttributeDomain::PerVertex => {
                    if layer.data.len() != vertex_count {
                        return Err(length_error(mesh, &layer.name, vertex_count, layer.data.len()));
                    }
                    mesh.loops
                        .iter()
                        .map(|l| scaled(layer.data[l.vertex as usize]))
                        .collect()
                }
                domain => {
                    return Err(TranslatorError::UnsupportedAttributeDomain {
                        mesh: mesh.name.clone(),
                        layer: layer.name.clone(),
                        domain,
                    })
                }
            };
            Ok(AttributeData::new(layer.name.clone(), data))
        })
        .collect()
}

/// Extract a mesh variant into dense arrays in the game frame.
pub fn extract(variant: &MeshVariant<'_>, config: &TranslatorConfig) -> Result<ExtractedMesh> {
    let mesh = variant.mesh;
    let vertex_count = variant.positions.len();

    if vertex_count == 0 {
        return Err(TranslatorError::EmptyMesh {
            mesh: mesh.name.clone(),
        });
    }
    if vertex_count != mesh.vertex_count() {
        return Err(length_error(mesh, "positions", mesh.vertex_count(), vertex_count));
    }
    validate_topology(mesh, vertex_count)?;

    let uv_layers = extract_uv_layers(mesh)?;
    let color_layers = extract_color_layers(mesh, vertex_count, config)?;
    let tangent_layer = tangent_uv_layer(mesh)?;

    let triangles: Vec<[u32; 3]> = mesh.triangles.iter().map(|t| t.loops).collect();
    let loop_vertices: Vec<u32> = mesh.loops.iter().map(|l| l.vertex).collect();
    let host_normals: Vec<[f32; 3]> = mesh.loops.iter().map(|l| l.normal).collect();

    let host_tangents = match &mesh.tangents {
        Some(tangents) => {
            if tangents.len() != mesh.loop_count() {
                return Err(length_error(mesh, "tangents", mesh.loop_count(), tangents.len()));
            }
            tangents.clone()
        }
        None => generate_loop_tangents(
            &variant.positions,
            &loop_vertices,
            &host_normals,
            &mesh.uv_layers[tangent_layer].data,
            &triangles,
        )
        .ok_or_else(|| TranslatorError::TangentGeneration {
            mesh: mesh.name.clone(),
        })?,
    };

    let positions = variant.positions.iter().copied().map(to_game_frame).collect();
    let normals = host_normals
        .iter()
        .map(|&n| {
            let [x, y, z] = to_game_frame(n);
            [x, y, z, 0.0]
        })
        .collect();
    // Flipping V mirrors the bitangent, so the sign flips with it.
    let tangents = host_tangents
        .iter()
        .map(|&[x, y, z, sign]| {
            let [x, y, z] = to_game_frame([x, y, z]);
            [x, y, z, -sign]
        })
        .collect();

    tracing::debug!(
        "Extracted {}: {} vertices, {} loops, {} triangles",
        variant.name,
        vertex_count,
        loop_vertices.len(),
        triangles.len()
    );

    Ok(ExtractedMesh {
        name: variant.name.to_string(),
        positions,
        loop_vertices,
        normals,
        tangents,
        uv_layers,
        color_layers,
        triangles,
        triangle_materials: mesh.triangles.iter().map(|t| t.material_index).collect(),
    })
}
