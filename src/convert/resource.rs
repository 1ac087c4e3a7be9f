use crate::{
    error::{ForgeError, block_element, block_index},
    tags::{
        CacheAddressType, Mesh, MeshFlags, NONE_INDEX, RenderGeometryApiResourceDefinition,
        ResourceBlock,
    },
};

fn extract_slot<T: Clone>(
    old: i16,
    shared: &[T],
    local: &mut Vec<T>,
    table: &'static str,
) -> Result<i16, ForgeError> {
    if old == NONE_INDEX {
        return Ok(NONE_INDEX);
    }

    local.push(block_element(shared, old, table)?.clone());
    block_index(local.len() - 1, table)
}

/// Copies the buffers `mesh` references out of a resource shared by many
/// meshes, rewriting the mesh's slot indices to point into the new resource.
pub fn single_mesh_resource_definition(
    shared: &RenderGeometryApiResourceDefinition,
    mesh: &mut Mesh,
) -> Result<RenderGeometryApiResourceDefinition, ForgeError> {
    // The runtime reads buffer blocks back through the definition itself.
    let mut result = RenderGeometryApiResourceDefinition {
        vertex_buffers: ResourceBlock::new(CacheAddressType::Definition),
        index_buffers: ResourceBlock::new(CacheAddressType::Definition),
    };

    for slot in mesh.vertex_buffer_indices.iter_mut() {
        *slot = extract_slot(
            *slot,
            &shared.vertex_buffers.elements,
            &mut result.vertex_buffers.elements,
            "vertex buffers",
        )?;
    }

    for slot in mesh.index_buffer_indices.iter_mut() {
        *slot = extract_slot(
            *slot,
            &shared.index_buffers.elements,
            &mut result.index_buffers.elements,
            "index buffers",
        )?;
    }

    // Unindexed meshes still point both index slots at 0 even though no
    // buffer backs them; the loader expects exactly that.
    if mesh.flags.contains(MeshFlags::MESH_IS_UNINDEXED) {
        mesh.index_buffer_indices[0] = 0;
        mesh.index_buffer_indices[1] = 0;
    }

    Ok(result)
}
