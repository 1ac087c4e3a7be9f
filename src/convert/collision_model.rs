use tracing::debug;

use super::InstancedGeometryToObjectConverter;
use crate::{
    cache::CachedTag,
    defaults::{DEFAULT_PERMUTATION_NAME, DEFAULT_REGION_NAME},
    error::{ForgeError, block_element, block_index},
    remap::IndexRemapper,
    tags::{
        CollisionBsp, CollisionBspPhysicsDefinition, CollisionGeometry, CollisionModel,
        CollisionPermutation, CollisionRegion, InstancedGeometryInstance, NONE_INDEX,
    },
};

/// Points a cloned physics block at the promoted model instead of the
/// structure BSP it was compiled against.
fn retarget_physics(
    physics: &CollisionBspPhysicsDefinition,
    model: CachedTag,
) -> CollisionBspPhysicsDefinition {
    let mut physics = physics.clone();
    let shape = &mut physics.geometry_shape;
    shape.model = Some(model);
    shape.bsp_index = NONE_INDEX;
    shape.collision_geometry_shape_key = 0xFFFF;
    shape.collision_geometry_shape_type = 0;
    physics
}

/// Rewrites surface material indices through `mapping`. Surfaces with no
/// material keep `-1`.
pub(super) fn remap_surface_materials(
    geometry: &mut CollisionGeometry,
    mapping: &mut IndexRemapper,
) -> Result<(), ForgeError> {
    for surface in &mut geometry.surfaces {
        if surface.material_index == NONE_INDEX {
            continue;
        }
        let slot = mapping.remap(surface.material_index);
        surface.material_index = block_index(slot.index, "collision materials")?;
    }
    Ok(())
}

impl InstancedGeometryToObjectConverter<'_> {
    pub(super) fn generate_collision_model(
        &mut self,
        model: CachedTag,
        instance: &InstancedGeometryInstance,
    ) -> Result<CollisionModel, ForgeError> {
        if instance.bsp_physics.is_empty() {
            debug!(resource = "collision_model", "instance has no physics");
            return Ok(CollisionModel::default());
        }

        let definition = block_element(
            &self.bsp_resources.instanced_geometry,
            instance.mesh_index,
            "instanced geometry",
        )?;

        let bsp_physics = instance
            .bsp_physics
            .iter()
            .map(|physics| retarget_physics(physics, model))
            .collect();

        let mut geometry = definition.collision_info.clone();
        remap_surface_materials(&mut geometry, &mut self.collision_material_mapping)?;

        debug!(
            resource = "collision_model",
            surfaces = geometry.surfaces.len(),
            collision_materials = self.collision_material_mapping.len(),
            mopp_codes = definition.collision_mopp_codes.len(),
            "cloned instance collision"
        );

        let strings = self.dest_cache.string_table_mut();
        Ok(CollisionModel {
            flags: 0,
            regions: vec![CollisionRegion {
                name: strings.intern(DEFAULT_REGION_NAME),
                permutations: vec![CollisionPermutation {
                    name: strings.intern(DEFAULT_PERMUTATION_NAME),
                    flags: 0,
                    bsps: vec![CollisionBsp {
                        node_index: 0,
                        geometry,
                    }],
                    bsp_physics,
                    bsp_mopp_codes: definition.collision_mopp_codes.clone(),
                }],
            }],
        })
    }
}
