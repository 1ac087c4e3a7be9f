use serde::{Deserialize, Serialize};

use super::collision::{CollisionBspPhysicsDefinition, CollisionGeometry, TagHkpMoppCode};
use crate::cache::{StringId, TagDefinition, TagGroup};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionBsp {
    pub node_index: i16,
    pub geometry: CollisionGeometry,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionPermutation {
    pub name: StringId,
    pub flags: u8,
    pub bsps: Vec<CollisionBsp>,
    pub bsp_physics: Vec<CollisionBspPhysicsDefinition>,
    pub bsp_mopp_codes: Vec<TagHkpMoppCode>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionRegion {
    pub name: StringId,
    pub permutations: Vec<CollisionPermutation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionModel {
    pub flags: u32,
    pub regions: Vec<CollisionRegion>,
}

impl TagDefinition for CollisionModel {
    const GROUP: TagGroup = TagGroup::from_code(b"coll");
}
