use super::InstancedGeometryToObjectConverter;
use crate::{
    error::{ForgeError, block_element},
    tags::{GameObjectType, MultiplayerObjectBlock, RenderModel, SceneryFlags, Scenery, SweetenerSize},
};

/// Diameter of the largest axis of the render model's compression bounds.
pub fn enclosing_radius(render_model: &RenderModel) -> Result<f32, ForgeError> {
    let bounds = block_element(&render_model.geometry.compression, 0i16, "compression")?;
    Ok(bounds.x.length().max(bounds.y.length().max(bounds.z.length())) * 2.0)
}

impl InstancedGeometryToObjectConverter<'_> {
    pub(super) fn generate_object(&self, bounding_radius: f32) -> Scenery {
        Scenery {
            object_type: GameObjectType::Scenery,
            bounding_radius,
            acceleration_scale: self.defaults.acceleration_scale,
            sweetener_size: SweetenerSize::Large,
            model: None,
            multiplayer_object: vec![MultiplayerObjectBlock {
                spawn_time: self.defaults.spawn_time,
                abandon_time: self.defaults.abandon_time,
            }],
            scenery_flags: SceneryFlags::PHYSICALLY_SIMULATES,
        }
    }
}
