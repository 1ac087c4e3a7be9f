use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::cache::{CachedTag, TagDefinition, TagGroup};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameObjectType {
    Biped,
    Vehicle,
    Weapon,
    Equipment,
    Crate,
    #[default]
    Scenery,
    Machine,
    Control,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweetenerSize {
    #[default]
    Small,
    Medium,
    Large,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SceneryFlags: u16 {
        /// Lighting updates as the object moves.
        const PHYSICALLY_SIMULATES = 1 << 0;
        const USE_COMPLEX_ACTIVATION = 1 << 1;
        const NOT_PATHFINDING_OBSTACLE = 1 << 2;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiplayerObjectBlock {
    /// Seconds before the object respawns.
    pub spawn_time: i16,
    /// Seconds an untouched object is left lying around.
    pub abandon_time: i16,
}

/// Object header of a placeable, physically simulated world object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenery {
    pub object_type: GameObjectType,
    pub bounding_radius: f32,
    pub acceleration_scale: f32,
    pub sweetener_size: SweetenerSize,
    pub model: Option<CachedTag>,
    pub multiplayer_object: Vec<MultiplayerObjectBlock>,
    pub scenery_flags: SceneryFlags,
}

impl TagDefinition for Scenery {
    const GROUP: TagGroup = TagGroup::from_code(b"scen");
}
