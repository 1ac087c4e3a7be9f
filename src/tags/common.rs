use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sentinel stored in 16-bit block index fields that reference nothing.
pub const NONE_INDEX: i16 = -1;

/// Closed range along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f32,
    pub upper: f32,
}

impl Bounds {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn length(&self) -> f32 {
        self.upper - self.lower
    }
}

/// Affine transform stored as three basis rows plus a translation row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealMatrix4x3 {
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
    pub position: Vec3,
}

impl RealMatrix4x3 {
    pub const IDENTITY: Self = Self {
        forward: Vec3::X,
        left: Vec3::Y,
        up: Vec3::Z,
        position: Vec3::ZERO,
    };

    pub fn new(forward: Vec3, left: Vec3, up: Vec3, position: Vec3) -> Self {
        Self {
            forward,
            left,
            up,
            position,
        }
    }
}

impl Default for RealMatrix4x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
