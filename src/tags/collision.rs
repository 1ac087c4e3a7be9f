use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::common::NONE_INDEX;
use crate::cache::CachedTag;

// Collision geometry and physics payloads are carried through conversion
// untouched, apart from surface material indices and shape addressing.

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bsp3dNode {
    pub plane: i16,
    pub back_child: i32,
    pub front_child: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub value: Vec4,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub flags: u8,
    pub bsp2d_reference_count: u16,
    pub first_bsp2d_reference: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub plane: i16,
    pub first_edge: i16,
    /// Index into the owning partition's collision materials, or `-1`.
    pub material_index: i16,
    pub breakable_surface_set: i16,
    pub breakable_surface_index: i16,
    pub flags: u8,
    pub best_plane_calculation_vertex_index: u8,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            plane: 0,
            first_edge: 0,
            material_index: NONE_INDEX,
            breakable_surface_set: NONE_INDEX,
            breakable_surface_index: NONE_INDEX,
            flags: 0,
            best_plane_calculation_vertex_index: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start_vertex: i16,
    pub end_vertex: i16,
    pub forward_edge: i16,
    pub reverse_edge: i16,
    pub left_surface: i16,
    pub right_surface: i16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionVertex {
    pub point: Vec3,
    pub first_edge: i16,
    pub sink: i16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionGeometry {
    pub bsp3d_nodes: Vec<Bsp3dNode>,
    pub planes: Vec<Plane>,
    pub leaves: Vec<Leaf>,
    pub surfaces: Vec<Surface>,
    pub edges: Vec<Edge>,
    pub vertices: Vec<CollisionVertex>,
}

/// Compiled physics acceleration data, copied byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TagHkpMoppCode {
    pub info: Vec4,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionGeometryShape {
    /// Model that owns this shape, when the shape is addressed by handle.
    pub model: Option<CachedTag>,
    /// Structure BSP the shape lives in, or `-1`.
    pub bsp_index: i16,
    pub collision_geometry_shape_key: u16,
    pub collision_geometry_shape_type: i16,
    pub aabb_center: Vec4,
    pub aabb_half_extents: Vec4,
}

impl Default for CollisionGeometryShape {
    fn default() -> Self {
        Self {
            model: None,
            bsp_index: NONE_INDEX,
            collision_geometry_shape_key: 0xFFFF,
            collision_geometry_shape_type: 0,
            aabb_center: Vec4::ZERO,
            aabb_half_extents: Vec4::ZERO,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionBspPhysicsDefinition {
    pub geometry_shape: CollisionGeometryShape,
    pub mopp_bv_tree_shape: Vec<u8>,
}

/// Per-mesh record of a structure BSP's instanced geometry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancedGeometryDefinition {
    pub checksum: i32,
    pub bounding_sphere_offset: Vec3,
    pub bounding_sphere_radius: f32,
    pub collision_info: CollisionGeometry,
    pub collision_mopp_codes: Vec<TagHkpMoppCode>,
    /// Index into the lightmap geometry's meshes.
    pub mesh_index: i16,
    /// Index into the lightmap geometry's compression entries.
    pub compression_index: i16,
}

/// Collision resource of a structure BSP.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureBspTagResources {
    pub collision_bsps: Vec<CollisionGeometry>,
    pub instanced_geometry: Vec<InstancedGeometryDefinition>,
}
