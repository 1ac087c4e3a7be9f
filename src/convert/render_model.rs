use glam::{Quat, Vec3};
use tracing::debug;

use super::{InstancedGeometryToObjectConverter, resource::single_mesh_resource_definition};
use crate::{
    defaults::{DEFAULT_NODE_NAME, DEFAULT_PERMUTATION_NAME, DEFAULT_REGION_NAME},
    error::{ForgeError, block_element},
    remap::IndexRemapper,
    cache::StringId,
    tags::{
        BoundingSphere, Mesh, NONE_INDEX, RenderGeometry, RenderMaterial, RenderModel,
        RenderModelNode, RenderModelPermutation, RenderModelRegion, RuntimeNodeOrientation,
    },
};

/// The runtime stores the identity rotation with a negative w.
const ROOT_ROTATION: Quat = Quat::from_xyzw(0.0, 0.0, 0.0, -1.0);

/// Rewrites part material indices into a local materials block holding one
/// copy of each distinct global material the mesh uses.
pub(super) fn localize_materials(
    mesh: &mut Mesh,
    global: &[RenderMaterial],
) -> Result<Vec<RenderMaterial>, ForgeError> {
    let mut mapping: IndexRemapper = IndexRemapper::new();
    let mut materials = Vec::new();
    for part in &mut mesh.parts {
        part.material_index =
            mapping.remap_into(part.material_index, global, &mut materials, "materials")?;
    }
    Ok(materials)
}

/// Same scheme as [`localize_materials`] for transparent sorting spheres.
/// Parts without a sorting sphere keep `-1`.
pub(super) fn localize_bounding_spheres(
    mesh: &mut Mesh,
    global: &[BoundingSphere],
) -> Result<Vec<BoundingSphere>, ForgeError> {
    let mut mapping: IndexRemapper = IndexRemapper::new();
    let mut spheres = Vec::new();
    for part in &mut mesh.parts {
        if part.transparent_sorting_index == NONE_INDEX {
            continue;
        }
        part.transparent_sorting_index = mapping.remap_into(
            part.transparent_sorting_index,
            global,
            &mut spheres,
            "bounding spheres",
        )?;
    }
    Ok(spheres)
}

impl InstancedGeometryToObjectConverter<'_> {
    pub(super) fn generate_render_model(
        &mut self,
        instanced_geometry_index: i16,
    ) -> Result<RenderModel, ForgeError> {
        let definition = block_element(
            &self.bsp_resources.instanced_geometry,
            instanced_geometry_index,
            "instanced geometry",
        )?;
        let source_geometry = &self.lightmap_bsp.geometry;

        let mut mesh =
            block_element(&source_geometry.meshes, definition.mesh_index, "meshes")?.clone();
        let compression = block_element(
            &source_geometry.compression,
            definition.compression_index,
            "compression",
        )?
        .clone();

        let resource_definition = single_mesh_resource_definition(&self.geometry_resource, &mut mesh)?;
        let materials = localize_materials(&mut mesh, &self.structure_bsp.materials)?;
        let bounding_spheres = localize_bounding_spheres(&mut mesh, &source_geometry.bounding_spheres)?;

        debug!(
            resource = "render_model",
            mesh = definition.mesh_index,
            vertex_buffers = resource_definition.vertex_buffers.len(),
            index_buffers = resource_definition.index_buffers.len(),
            materials = materials.len(),
            bounding_spheres = bounding_spheres.len(),
            "extracted instanced mesh"
        );

        let resource = self
            .dest_cache
            .resource_cache_mut()
            .create(&resource_definition)?;

        let strings = self.dest_cache.string_table_mut();
        let node_name = strings.intern(DEFAULT_NODE_NAME);
        let region_name = strings.intern(DEFAULT_REGION_NAME);
        let permutation_name = strings.intern(DEFAULT_PERMUTATION_NAME);

        let root = RenderModelNode {
            name: node_name,
            parent_node: NONE_INDEX,
            first_child_node: NONE_INDEX,
            next_sibling_node: NONE_INDEX,
            default_translation: Vec3::ZERO,
            default_rotation: ROOT_ROTATION,
            default_scale: 1.0,
            inverse_forward: Vec3::X,
            inverse_left: Vec3::Y,
            inverse_up: Vec3::Z,
            inverse_position: Vec3::ZERO,
            distance_from_parent: 0.0,
        };

        Ok(RenderModel {
            name: StringId::INVALID,
            instance_starting_mesh_index: NONE_INDEX,
            nodes: vec![root],
            regions: vec![RenderModelRegion {
                name: region_name,
                node_map_offset: 0,
                node_map_size: 1,
                permutations: vec![RenderModelPermutation {
                    name: permutation_name,
                    mesh_index: 0,
                    mesh_count: 1,
                }],
            }],
            materials,
            compression: vec![compression.clone()],
            geometry: RenderGeometry {
                runtime_flags: source_geometry.runtime_flags,
                meshes: vec![mesh],
                compression: vec![compression],
                bounding_spheres,
                resource: Some(resource),
            },
            runtime_node_orientations: vec![RuntimeNodeOrientation {
                rotation: ROOT_ROTATION,
                translation: Vec3::ZERO,
                scale: 1.0,
            }],
        })
    }
}
