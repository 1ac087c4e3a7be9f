use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION_NAME: &str = "default";
pub const DEFAULT_PERMUTATION_NAME: &str = "default";
pub const DEFAULT_NODE_NAME: &str = "default";

pub const DEFAULT_REDUCE_TO_L1_SUPER_LOW: f32 = 300.0;
pub const DEFAULT_REDUCE_TO_L2_LOW: f32 = 280.0;
pub const DEFAULT_SPAWN_TIME: i16 = 30;
pub const DEFAULT_ABANDON_TIME: i16 = 60;
pub const DEFAULT_ACCELERATION_SCALE: f32 = 1.0;

fn default_reduce_to_l1_super_low() -> f32 {
    DEFAULT_REDUCE_TO_L1_SUPER_LOW
}

fn default_reduce_to_l2_low() -> f32 {
    DEFAULT_REDUCE_TO_L2_LOW
}

fn default_spawn_time() -> i16 {
    DEFAULT_SPAWN_TIME
}

fn default_abandon_time() -> i16 {
    DEFAULT_ABANDON_TIME
}

fn default_acceleration_scale() -> f32 {
    DEFAULT_ACCELERATION_SCALE
}

/// Policy values stamped onto every promoted object. None of them can be
/// recovered from the source geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefaults {
    #[serde(default = "default_reduce_to_l1_super_low")]
    pub reduce_to_l1_super_low: f32,
    #[serde(default = "default_reduce_to_l2_low")]
    pub reduce_to_l2_low: f32,
    #[serde(default = "default_spawn_time")]
    pub spawn_time: i16,
    #[serde(default = "default_abandon_time")]
    pub abandon_time: i16,
    #[serde(default = "default_acceleration_scale")]
    pub acceleration_scale: f32,
}

impl Default for ObjectDefaults {
    fn default() -> Self {
        Self {
            reduce_to_l1_super_low: default_reduce_to_l1_super_low(),
            reduce_to_l2_low: default_reduce_to_l2_low(),
            spawn_time: default_spawn_time(),
            abandon_time: default_abandon_time(),
            acceleration_scale: default_acceleration_scale(),
        }
    }
}
