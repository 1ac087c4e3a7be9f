pub mod collision_model;
pub mod model;
pub mod object;
pub mod render_model;
pub mod resource;

pub use object::enclosing_radius;
pub use resource::single_mesh_resource_definition;

use tracing::{debug, info};

use crate::{
    cache::{CachedTag, GameCache, StringId, TagStream},
    defaults::ObjectDefaults,
    error::{ForgeError, block_element},
    remap::IndexRemapper,
    tags::{
        CollisionModel, Model, RenderGeometryApiResourceDefinition, RenderModel, Scenario,
        ScenarioLightmap, ScenarioLightmapBspData, ScenarioStructureBsp, Scenery,
        StructureBspTagResources,
    },
};

/// Keeps ASCII letters, digits and underscores.
pub fn sanitize_instance_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Directory part of a tag name, with either separator accepted and `/`
/// written back.
pub fn scenario_folder(tag_name: &str) -> String {
    let parts: Vec<&str> = tag_name.split(['/', '\\']).collect();
    match parts.split_last() {
        Some((_, dirs)) => dirs.join("/"),
        None => String::new(),
    }
}

/// Tag name every record of a promoted instance is stored under.
pub fn object_tag_name(folder: &str, structure_bsp_index: usize, instance_name: &str) -> String {
    let name = sanitize_instance_name(instance_name);
    if folder.is_empty() {
        format!("objects/instanced/{structure_bsp_index:02}_{name}")
    } else {
        format!("objects/{folder}/instanced/{structure_bsp_index:02}_{name}")
    }
}

////////////////////////////////////////////////
/// InstancedGeometryToObjectConverter
/// * Promotes instanced geometry instances of one structure BSP into
///   standalone scenery objects in a destination cache.
///
/// * Each promoted instance becomes four linked records (scenery, model,
///   render model, collision model) sharing one tag name. Converting the
///   same instance twice returns the scenery written the first time.
///
/// * Source records are read once in `new`; the destination cache and stream
///   are borrowed mutably for the converter's lifetime.
////////////////////////////////////////////////
pub struct InstancedGeometryToObjectConverter<'a> {
    dest_cache: &'a mut GameCache,
    dest_stream: &'a mut TagStream,
    source_cache: &'a GameCache,
    structure_bsp_index: usize,
    structure_bsp_name: String,
    structure_bsp: ScenarioStructureBsp,
    lightmap_bsp: ScenarioLightmapBspData,
    geometry_resource: RenderGeometryApiResourceDefinition,
    bsp_resources: StructureBspTagResources,
    /// Source collision material index -> model material index. Reset per
    /// converted instance.
    collision_material_mapping: IndexRemapper,
    defaults: ObjectDefaults,
}

impl<'a> InstancedGeometryToObjectConverter<'a> {
    pub fn new(
        dest_cache: &'a mut GameCache,
        dest_stream: &'a mut TagStream,
        source_cache: &'a GameCache,
        source_stream: &TagStream,
        scenario: &Scenario,
        structure_bsp_index: usize,
    ) -> Result<Self, ForgeError> {
        let bsp_block = block_element(
            &scenario.structure_bsps,
            structure_bsp_index as i64,
            "structure bsps",
        )?;
        let bsp_tag = bsp_block
            .structure_bsp
            .ok_or(ForgeError::NullReference("structure_bsp"))?;
        let structure_bsp: ScenarioStructureBsp =
            source_cache.deserialize(source_stream, bsp_tag)?;
        let structure_bsp_name = source_cache.tag_name(bsp_tag)?.to_string();

        let lightmap_tag = scenario
            .lightmap
            .ok_or(ForgeError::NullReference("lightmap"))?;
        let lightmap: ScenarioLightmap = source_cache.deserialize(source_stream, lightmap_tag)?;
        let lightmap_bsp_tag = block_element(
            &lightmap.lightmap_data_references,
            structure_bsp_index as i64,
            "lightmap data references",
        )?
        .ok_or(ForgeError::NullReference("lightmap_data_reference"))?;
        let lightmap_bsp: ScenarioLightmapBspData =
            source_cache.deserialize(source_stream, lightmap_bsp_tag)?;

        let resources = source_cache.resource_cache();
        let geometry_resource = resources.get(
            lightmap_bsp
                .geometry
                .resource
                .ok_or(ForgeError::NullReference("lightmap geometry resource"))?,
        )?;
        let bsp_resources = resources.get(
            structure_bsp
                .collision_bsp_resource
                .ok_or(ForgeError::NullReference("collision_bsp_resource"))?,
        )?;

        info!(
            resource = "structure_bsp",
            entry = %structure_bsp_name,
            instances = structure_bsp.instanced_geometry_instances.len(),
            source = "cache",
            "opened structure bsp for promotion"
        );

        Ok(Self {
            dest_cache,
            dest_stream,
            source_cache,
            structure_bsp_index,
            structure_bsp_name,
            structure_bsp,
            lightmap_bsp,
            geometry_resource,
            bsp_resources,
            collision_material_mapping: IndexRemapper::new(),
            defaults: ObjectDefaults::default(),
        })
    }

    pub fn with_defaults(mut self, defaults: ObjectDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &ObjectDefaults {
        &self.defaults
    }

    /// Promotes the instance called `name`. A name the source cache never
    /// interned, or no instance by that name, yields `Ok(None)`.
    pub fn convert(&mut self, name: &str) -> Result<Option<CachedTag>, ForgeError> {
        match self.source_cache.string_table().get_string_id(name) {
            Some(id) => self.convert_instance_named(id),
            None => {
                debug!(entry = %name, "name not interned in source cache");
                Ok(None)
            }
        }
    }

    pub fn convert_instance_named(&mut self, name: StringId) -> Result<Option<CachedTag>, ForgeError> {
        let position = self
            .structure_bsp
            .instanced_geometry_instances
            .iter()
            .position(|instance| instance.name == name);

        match position {
            Some(index) => self.convert_instance(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn convert_instance(&mut self, index: usize) -> Result<CachedTag, ForgeError> {
        let tag_name = self.object_tag_name(index)?;

        if let Some(existing) = self.dest_cache.try_get_tag::<Scenery>(&tag_name) {
            // Left behind by a conversion that failed after allocating.
            if !self.dest_cache.tag_instance(existing)?.defined {
                return Err(ForgeError::UndefinedTag(tag_name));
            }
            info!(resource = "scenery", entry = %tag_name, source = "existing");
            return Ok(existing);
        }

        let instance = block_element(
            &self.structure_bsp.instanced_geometry_instances,
            index as i64,
            "instanced geometry instances",
        )?
        .clone();

        self.collision_material_mapping.clear();

        let scenery_tag = self.dest_cache.allocate_tag::<Scenery>(&tag_name);
        let collision_model_tag = self.dest_cache.allocate_tag::<CollisionModel>(&tag_name);
        let render_model_tag = self.dest_cache.allocate_tag::<RenderModel>(&tag_name);
        let model_tag = self.dest_cache.allocate_tag::<Model>(&tag_name);

        let render_model = self.generate_render_model(instance.mesh_index)?;
        let collision_model = self.generate_collision_model(model_tag, &instance)?;
        let mut model = self.generate_model(&render_model, &collision_model)?;
        let mut scenery = self.generate_object(enclosing_radius(&render_model)?);

        model.render_model = Some(render_model_tag);
        model.collision_model = Some(collision_model_tag);
        scenery.model = Some(model_tag);

        let stream = &mut *self.dest_stream;
        self.dest_cache
            .serialize(stream, collision_model_tag, &collision_model)?;
        self.dest_cache.serialize(stream, model_tag, &model)?;
        self.dest_cache
            .serialize(stream, render_model_tag, &render_model)?;
        self.dest_cache.serialize(stream, scenery_tag, &scenery)?;

        info!(
            resource = "scenery",
            entry = %tag_name,
            materials = render_model.materials.len(),
            collision_materials = model.materials.len(),
            source = "instanced_geometry"
        );

        Ok(scenery_tag)
    }

    /// Promotes every instance of the structure BSP, in order.
    pub fn convert_all(&mut self) -> Result<Vec<CachedTag>, ForgeError> {
        (0..self.structure_bsp.instanced_geometry_instances.len())
            .map(|index| self.convert_instance(index))
            .collect()
    }

    pub fn instance_names(&self) -> Result<Vec<String>, ForgeError> {
        self.structure_bsp
            .instanced_geometry_instances
            .iter()
            .map(|instance| self.instance_name(instance.name).map(str::to_string))
            .collect()
    }

    pub fn object_tag_name(&self, index: usize) -> Result<String, ForgeError> {
        let instance = block_element(
            &self.structure_bsp.instanced_geometry_instances,
            index as i64,
            "instanced geometry instances",
        )?;
        Ok(object_tag_name(
            &scenario_folder(&self.structure_bsp_name),
            self.structure_bsp_index,
            self.instance_name(instance.name)?,
        ))
    }

    fn instance_name(&self, id: StringId) -> Result<&str, ForgeError> {
        self.source_cache
            .string_table()
            .get_string(id)
            .ok_or(ForgeError::UnknownStringId(id))
    }
}
