use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{
    collision::CollisionBspPhysicsDefinition,
    geometry::{RenderGeometry, RenderMaterial},
};
use crate::cache::{CachedTag, ResourceHandle, StringId, TagDefinition, TagGroup};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureBspBlock {
    pub structure_bsp: Option<CachedTag>,
    pub flags: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub structure_bsps: Vec<StructureBspBlock>,
    pub lightmap: Option<CachedTag>,
}

impl TagDefinition for Scenario {
    const GROUP: TagGroup = TagGroup::from_code(b"scnr");
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancedGeometryInstance {
    pub name: StringId,
    pub scale: f32,
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
    pub position: Vec3,
    /// Index into the structure BSP resource's instanced geometry.
    pub mesh_index: i16,
    pub flags: u16,
    pub world_bounding_sphere_center: Vec3,
    pub world_bounding_sphere_radius: f32,
    pub bsp_physics: Vec<CollisionBspPhysicsDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureCollisionMaterial {
    pub shader: Option<CachedTag>,
    pub global_material_name: StringId,
    pub runtime_global_material_index: i16,
    pub conveyor_surface_index: i16,
    pub seam_mapping_index: i16,
}

/// A world partition. Its material and collision-material tables are shared by
/// every mesh and instance inside it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStructureBsp {
    pub materials: Vec<RenderMaterial>,
    pub collision_materials: Vec<StructureCollisionMaterial>,
    pub instanced_geometry_instances: Vec<InstancedGeometryInstance>,
    pub collision_bsp_resource: Option<ResourceHandle>,
}

impl TagDefinition for ScenarioStructureBsp {
    const GROUP: TagGroup = TagGroup::from_code(b"sbsp");
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLightmap {
    /// One lightmap data tag per structure BSP, in structure BSP order.
    pub lightmap_data_references: Vec<Option<CachedTag>>,
}

impl TagDefinition for ScenarioLightmap {
    const GROUP: TagGroup = TagGroup::from_code(b"sLdT");
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLightmapBspData {
    pub bsp_index: i16,
    /// Render geometry for the BSP, including every instanced mesh.
    pub geometry: RenderGeometry,
}

impl TagDefinition for ScenarioLightmapBspData {
    const GROUP: TagGroup = TagGroup::from_code(b"Lbsp");
}
