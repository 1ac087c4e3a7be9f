use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{
    common::NONE_INDEX,
    geometry::{RenderGeometry, RenderGeometryCompression, RenderMaterial},
};
use crate::cache::{StringId, TagDefinition, TagGroup};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderModelNode {
    pub name: StringId,
    pub parent_node: i16,
    pub first_child_node: i16,
    pub next_sibling_node: i16,
    pub default_translation: Vec3,
    pub default_rotation: Quat,
    pub default_scale: f32,
    pub inverse_forward: Vec3,
    pub inverse_left: Vec3,
    pub inverse_up: Vec3,
    pub inverse_position: Vec3,
    pub distance_from_parent: f32,
}

impl Default for RenderModelNode {
    fn default() -> Self {
        Self {
            name: StringId::INVALID,
            parent_node: NONE_INDEX,
            first_child_node: NONE_INDEX,
            next_sibling_node: NONE_INDEX,
            default_translation: Vec3::ZERO,
            default_rotation: Quat::IDENTITY,
            default_scale: 1.0,
            inverse_forward: Vec3::X,
            inverse_left: Vec3::Y,
            inverse_up: Vec3::Z,
            inverse_position: Vec3::ZERO,
            distance_from_parent: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderModelPermutation {
    pub name: StringId,
    pub mesh_index: i16,
    pub mesh_count: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderModelRegion {
    pub name: StringId,
    pub node_map_offset: i16,
    pub node_map_size: i16,
    pub permutations: Vec<RenderModelPermutation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeNodeOrientation {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderModel {
    pub name: StringId,
    pub instance_starting_mesh_index: i16,
    pub nodes: Vec<RenderModelNode>,
    pub regions: Vec<RenderModelRegion>,
    /// Local materials; mesh parts index into this block.
    pub materials: Vec<RenderMaterial>,
    /// Model-level copy of `geometry.compression`; the loader decompresses
    /// vertices from this block.
    pub compression: Vec<RenderGeometryCompression>,
    pub geometry: RenderGeometry,
    pub runtime_node_orientations: Vec<RuntimeNodeOrientation>,
}

impl TagDefinition for RenderModel {
    const GROUP: TagGroup = TagGroup::from_code(b"mode");
}
