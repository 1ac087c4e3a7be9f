use super::InstancedGeometryToObjectConverter;
use crate::{
    cache::StringTable,
    defaults::{DEFAULT_PERMUTATION_NAME, DEFAULT_REGION_NAME},
    error::{ForgeError, block_element},
    remap::IndexRemapper,
    tags::{
        CollisionModel, Model, ModelCollisionPermutation, ModelCollisionRegion, ModelMaterial,
        ModelNode, NONE_INDEX, RealMatrix4x3, RenderModel, RenderModelNode,
        StructureCollisionMaterial,
    },
};

fn region_index(position: usize, table: &'static str) -> Result<i8, ForgeError> {
    i8::try_from(position).map_err(|_| ForgeError::IndexOverflow {
        table,
        len: position + 1,
    })
}

fn model_node(node: &RenderModelNode) -> ModelNode {
    ModelNode {
        name: node.name,
        parent_node: node.parent_node,
        first_child_node: node.first_child_node,
        next_sibling_node: node.next_sibling_node,
        import_node_index: NONE_INDEX,
        default_translation: node.default_translation,
        default_rotation: node.default_rotation,
        default_scale: node.default_scale,
        inverse: RealMatrix4x3::new(
            node.inverse_forward,
            node.inverse_left,
            node.inverse_up,
            node.inverse_position,
        ),
        distance_from_parent: node.distance_from_parent,
    }
}

/// Mirrors the collision model's regions, numbering collision and physics
/// indices by position.
fn transplant_regions(
    collision_model: &CollisionModel,
) -> Result<Vec<ModelCollisionRegion>, ForgeError> {
    collision_model
        .regions
        .iter()
        .enumerate()
        .map(|(region_position, region)| {
            let region_position = region_index(region_position, "collision regions")?;
            let permutations = region
                .permutations
                .iter()
                .enumerate()
                .map(|(position, permutation)| {
                    let position = region_index(position, "collision permutations")?;
                    Ok(ModelCollisionPermutation {
                        name: permutation.name,
                        flags: permutation.flags,
                        collision_permutation_index: position,
                        physics_permutation_index: position,
                    })
                })
                .collect::<Result<_, ForgeError>>()?;

            Ok(ModelCollisionRegion {
                name: region.name,
                collision_region_index: region_position,
                physics_region_index: region_position,
                permutations,
            })
        })
        .collect()
}

fn default_collision_region(strings: &mut StringTable) -> ModelCollisionRegion {
    ModelCollisionRegion {
        name: strings.intern(DEFAULT_REGION_NAME),
        collision_region_index: -1,
        physics_region_index: 0,
        permutations: vec![ModelCollisionPermutation {
            name: strings.intern(DEFAULT_PERMUTATION_NAME),
            flags: 0,
            collision_permutation_index: -1,
            physics_permutation_index: 0,
        }],
    }
}

/// One model material per mapped collision material, in mapped order.
pub(super) fn model_materials(
    mapping: &IndexRemapper,
    collision_materials: &[StructureCollisionMaterial],
) -> Result<Vec<ModelMaterial>, ForgeError> {
    mapping
        .iter()
        .map(|(old, _)| {
            let source = block_element(collision_materials, old, "collision materials")?;
            Ok(ModelMaterial {
                global_material_index: source.runtime_global_material_index,
                ..Default::default()
            })
        })
        .collect()
}

impl InstancedGeometryToObjectConverter<'_> {
    pub(super) fn generate_model(
        &mut self,
        render_model: &RenderModel,
        collision_model: &CollisionModel,
    ) -> Result<Model, ForgeError> {
        let collision_regions = if collision_model.regions.is_empty() {
            vec![default_collision_region(self.dest_cache.string_table_mut())]
        } else {
            transplant_regions(collision_model)?
        };

        Ok(Model {
            render_model: None,
            collision_model: None,
            reduce_to_l1_super_low: self.defaults.reduce_to_l1_super_low,
            reduce_to_l2_low: self.defaults.reduce_to_l2_low,
            nodes: render_model.nodes.iter().map(model_node).collect(),
            collision_regions,
            materials: model_materials(
                &self.collision_material_mapping,
                &self.structure_bsp.collision_materials,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::{
        cache::StringId,
        tags::{CollisionPermutation, CollisionRegion, MaterialType},
    };

    fn collision_material(global: i16) -> StructureCollisionMaterial {
        StructureCollisionMaterial {
            runtime_global_material_index: global,
            ..Default::default()
        }
    }

    #[test]
    fn materials_follow_the_mapping_order() {
        let source: Vec<StructureCollisionMaterial> =
            (0..8).map(|i| collision_material(100 + i)).collect();
        let mut mapping = IndexRemapper::<i16>::new();
        mapping.remap(7);
        mapping.remap(3);

        let materials = model_materials(&mapping, &source).unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].global_material_index, 107);
        assert_eq!(materials[1].global_material_index, 103);
        for material in &materials {
            assert_eq!(material.material_type, MaterialType::Dirt);
            assert_eq!(material.name, StringId::INVALID);
            assert_eq!(material.material_name, StringId::INVALID);
            assert_eq!(material.damage_section_index, -1);
            assert_eq!(material.runtime_damager_material_index, -1);
            assert_eq!(material.runtime_collision_material_index, 0);
        }
    }

    #[test]
    fn empty_collision_model_gets_a_default_region() {
        let mut strings = StringTable::new();
        let region = default_collision_region(&mut strings);

        assert_eq!(strings.get_string(region.name), Some(DEFAULT_REGION_NAME));
        assert_eq!(region.collision_region_index, -1);
        assert_eq!(region.physics_region_index, 0);
        assert_eq!(region.permutations.len(), 1);
        assert_eq!(region.permutations[0].collision_permutation_index, -1);
        assert_eq!(region.permutations[0].physics_permutation_index, 0);
    }

    #[test]
    fn transplanted_regions_are_numbered_by_position() {
        let permutation = |n| CollisionPermutation {
            name: StringId(n),
            ..Default::default()
        };
        let collision_model = CollisionModel {
            flags: 0,
            regions: vec![
                CollisionRegion {
                    name: StringId(1),
                    permutations: vec![permutation(2)],
                },
                CollisionRegion {
                    name: StringId(3),
                    permutations: vec![permutation(4), permutation(5)],
                },
            ],
        };

        let regions = transplant_regions(&collision_model).unwrap();

        assert_eq!(regions[1].name, StringId(3));
        assert_eq!(regions[1].collision_region_index, 1);
        assert_eq!(regions[1].physics_region_index, 1);
        assert_eq!(regions[1].permutations[1].name, StringId(5));
        assert_eq!(regions[1].permutations[1].collision_permutation_index, 1);
        assert_eq!(regions[1].permutations[1].physics_permutation_index, 1);
    }

    #[test]
    fn nodes_carry_their_inverse_as_one_matrix() {
        let node = RenderModelNode {
            name: StringId(1),
            default_rotation: Quat::from_xyzw(0.0, 0.0, 0.0, -1.0),
            inverse_position: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };

        let copied = model_node(&node);

        assert_eq!(copied.import_node_index, -1);
        assert_eq!(copied.default_rotation, node.default_rotation);
        assert_eq!(copied.inverse.forward, Vec3::X);
        assert_eq!(copied.inverse.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
