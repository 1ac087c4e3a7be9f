use bitflags::bitflags;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::common::{Bounds, NONE_INDEX};
use crate::cache::{CachedTag, ResourceHandle};

pub const VERTEX_BUFFER_SLOTS: usize = 8;
pub const INDEX_BUFFER_SLOTS: usize = 2;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MeshFlags: u8 {
        const HAS_VERTEX_COLORS = 1 << 0;
        const USE_REGION_INDEX_FOR_SORTING = 1 << 1;
        const CAN_BE_RENDERED_IN_DRAW_BUNDLES = 1 << 2;
        const IS_CUSTOM_SHADOW_CASTER = 1 << 3;
        /// The mesh draws without an index buffer.
        const MESH_IS_UNINDEXED = 1 << 4;
        const SHOULD_RENDER_IN_Z_PREPASS = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexType {
    #[default]
    World,
    Rigid,
    Skinned,
    ParticleModel,
    FlatWorld,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleFan,
    #[default]
    TriangleStrip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartType {
    NotDrawn,
    OpaqueShadowOnly,
    OpaqueShadowCasting,
    OpaqueNonshadowing,
    #[default]
    Transparent,
    LightmapOnly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Index into the owning record's materials block.
    pub material_index: i16,
    /// Index into the owning geometry's bounding spheres, or `-1`.
    pub transparent_sorting_index: i16,
    pub first_index: u32,
    pub index_count: u32,
    pub first_subpart_index: i16,
    pub subpart_count: i16,
    pub part_type: PartType,
    pub flags: u8,
    pub vertex_count: u16,
}

impl Default for Part {
    fn default() -> Self {
        Self {
            material_index: 0,
            transparent_sorting_index: NONE_INDEX,
            first_index: 0,
            index_count: 0,
            first_subpart_index: 0,
            subpart_count: 0,
            part_type: PartType::default(),
            flags: 0,
            vertex_count: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubPart {
    pub first_index: u32,
    pub index_count: u32,
    pub part_index: i16,
    pub vertex_count: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub parts: Vec<Part>,
    pub subparts: Vec<SubPart>,
    /// Per-slot indices into the geometry resource's vertex buffers, `-1` if unused.
    pub vertex_buffer_indices: [i16; VERTEX_BUFFER_SLOTS],
    /// Per-slot indices into the geometry resource's index buffers, `-1` if unused.
    pub index_buffer_indices: [i16; INDEX_BUFFER_SLOTS],
    pub flags: MeshFlags,
    pub rigid_node_index: i8,
    pub vertex_type: VertexType,
    pub index_buffer_type: PrimitiveType,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            parts: Vec::new(),
            subparts: Vec::new(),
            vertex_buffer_indices: [NONE_INDEX; VERTEX_BUFFER_SLOTS],
            index_buffer_indices: [NONE_INDEX; INDEX_BUFFER_SLOTS],
            flags: MeshFlags::empty(),
            rigid_node_index: -1,
            vertex_type: VertexType::default(),
            index_buffer_type: PrimitiveType::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGeometryCompression {
    pub flags: u16,
    pub x: Bounds,
    pub y: Bounds,
    pub z: Bounds,
    pub u: Bounds,
    pub v: Bounds,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub plane: Vec4,
    pub position: Vec3,
    pub radius: f32,
    pub node_indices: [i8; 4],
    pub node_weights: [f32; 3],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMaterialProperty {
    pub property_type: i16,
    pub int_value: i16,
    pub real_value: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMaterial {
    pub render_method: Option<CachedTag>,
    pub properties: Vec<RenderMaterialProperty>,
    pub imported_material_index: i32,
    pub breakable_surface_index: i16,
    pub lightmap_resolution_scale: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGeometry {
    pub runtime_flags: u32,
    pub meshes: Vec<Mesh>,
    pub compression: Vec<RenderGeometryCompression>,
    pub bounding_spheres: Vec<BoundingSphere>,
    pub resource: Option<ResourceHandle>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexBufferFormat {
    #[default]
    World,
    Rigid,
    Skinned,
    StaticPerPixel,
    StaticPerVertex,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexBufferDefinition {
    pub count: u32,
    pub format: VertexBufferFormat,
    pub vertex_size: i16,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexBufferDefinition {
    pub format: PrimitiveType,
    pub data: Vec<u8>,
}

/// Where a runtime loader resolves a resource block's elements from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheAddressType {
    #[default]
    Memory,
    Definition,
    Data,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlock<T> {
    pub address_type: CacheAddressType,
    pub elements: Vec<T>,
}

impl<T> ResourceBlock<T> {
    pub fn new(address_type: CacheAddressType) -> Self {
        Self {
            address_type,
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Vertex and index buffers backing a [`RenderGeometry`]. Meshes address the
/// buffers through their per-slot indices.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGeometryApiResourceDefinition {
    pub vertex_buffers: ResourceBlock<VertexBufferDefinition>,
    pub index_buffers: ResourceBlock<IndexBufferDefinition>,
}
