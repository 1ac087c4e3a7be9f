use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::common::{NONE_INDEX, RealMatrix4x3};
use crate::cache::{CachedTag, StringId, TagDefinition, TagGroup};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: StringId,
    pub parent_node: i16,
    pub first_child_node: i16,
    pub next_sibling_node: i16,
    pub import_node_index: i16,
    pub default_translation: Vec3,
    pub default_rotation: Quat,
    pub default_scale: f32,
    pub inverse: RealMatrix4x3,
    pub distance_from_parent: f32,
}

impl Default for ModelNode {
    fn default() -> Self {
        Self {
            name: StringId::INVALID,
            parent_node: NONE_INDEX,
            first_child_node: NONE_INDEX,
            next_sibling_node: NONE_INDEX,
            import_node_index: NONE_INDEX,
            default_translation: Vec3::ZERO,
            default_rotation: Quat::IDENTITY,
            default_scale: 1.0,
            inverse: RealMatrix4x3::IDENTITY,
            distance_from_parent: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCollisionPermutation {
    pub name: StringId,
    pub flags: u8,
    pub collision_permutation_index: i8,
    pub physics_permutation_index: i8,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCollisionRegion {
    pub name: StringId,
    pub collision_region_index: i8,
    pub physics_region_index: i8,
    pub permutations: Vec<ModelCollisionPermutation>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    #[default]
    Dirt,
    Sand,
    Stone,
    Snow,
    Wood,
    MetalHollow,
    MetalThin,
    MetalThick,
    Rubber,
    Glass,
    ForceField,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMaterial {
    pub name: StringId,
    pub material_type: MaterialType,
    pub damage_section_index: i16,
    pub runtime_collision_material_index: i16,
    pub runtime_damager_material_index: i16,
    pub material_name: StringId,
    pub global_material_index: i16,
}

impl Default for ModelMaterial {
    fn default() -> Self {
        Self {
            name: StringId::INVALID,
            material_type: MaterialType::Dirt,
            damage_section_index: NONE_INDEX,
            runtime_collision_material_index: 0,
            runtime_damager_material_index: NONE_INDEX,
            material_name: StringId::INVALID,
            global_material_index: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub render_model: Option<CachedTag>,
    pub collision_model: Option<CachedTag>,
    pub reduce_to_l1_super_low: f32,
    pub reduce_to_l2_low: f32,
    pub nodes: Vec<ModelNode>,
    pub collision_regions: Vec<ModelCollisionRegion>,
    /// Local collision materials; collision surfaces index into this block.
    pub materials: Vec<ModelMaterial>,
}

impl TagDefinition for Model {
    const GROUP: TagGroup = TagGroup::from_code(b"hlmt");
}
