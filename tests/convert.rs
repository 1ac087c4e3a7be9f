use glam::{Vec3, Vec4};
use tagforge::{
    ForgeError, GameCache, InstancedGeometryToObjectConverter, ObjectDefaults, RDBView,
    StringId, TagDefinition, TagStream,
    tags::*,
};

const SCENARIO_NAME: &str = "levels/test/box/box";
const ROCK_TAG: &str = "objects/levels/test/box/instanced/00_Rock01";
const BARE_TAG: &str = "objects/levels/test/box/instanced/00_bare";

struct Source {
    cache: GameCache,
    stream: TagStream,
    scenario: Scenario,
}

fn vertex_buffer(tag: u8) -> VertexBufferDefinition {
    VertexBufferDefinition {
        count: 3,
        format: VertexBufferFormat::World,
        vertex_size: 28,
        data: vec![tag; 84],
    }
}

fn index_buffer(tag: u8) -> IndexBufferDefinition {
    IndexBufferDefinition {
        format: PrimitiveType::TriangleList,
        data: vec![tag; 6],
    }
}

fn part(material_index: i16, transparent_sorting_index: i16) -> Part {
    Part {
        material_index,
        transparent_sorting_index,
        ..Default::default()
    }
}

fn surface(material_index: i16) -> Surface {
    Surface {
        material_index,
        ..Default::default()
    }
}

fn compression(x: f32, y: f32, z: f32) -> RenderGeometryCompression {
    RenderGeometryCompression {
        x: Bounds::new(-x / 2.0, x / 2.0),
        y: Bounds::new(-y / 2.0, y / 2.0),
        z: Bounds::new(0.0, z),
        ..Default::default()
    }
}

/// One structure BSP with two instances: "Rock 01!" (indexed mesh, shared
/// material, collision and physics) and "bare" (unindexed mesh, no physics).
fn build_source() -> Source {
    let mut cache = GameCache::new();
    let mut stream = TagStream::new();

    let rock_name = cache.string_table_mut().intern("Rock 01!");
    let bare_name = cache.string_table_mut().intern("bare");
    cache.string_table_mut().intern("not_an_instance");

    let geometry_resource = RenderGeometryApiResourceDefinition {
        vertex_buffers: ResourceBlock {
            address_type: CacheAddressType::Memory,
            elements: (0..4).map(vertex_buffer).collect(),
        },
        index_buffers: ResourceBlock {
            address_type: CacheAddressType::Memory,
            elements: (0..2).map(index_buffer).collect(),
        },
    };
    let geometry_handle = cache
        .resource_cache_mut()
        .create(&geometry_resource)
        .unwrap();

    let mut rock_mesh = Mesh {
        parts: vec![part(5, -1), part(5, 1)],
        ..Default::default()
    };
    rock_mesh.vertex_buffer_indices[0] = 2;
    rock_mesh.index_buffer_indices[0] = 1;

    let mut bare_mesh = Mesh {
        parts: vec![part(2, -1)],
        flags: MeshFlags::MESH_IS_UNINDEXED,
        ..Default::default()
    };
    bare_mesh.vertex_buffer_indices[0] = 0;
    bare_mesh.vertex_buffer_indices[1] = 3;

    let lightmap_bsp = ScenarioLightmapBspData {
        bsp_index: 0,
        geometry: RenderGeometry {
            runtime_flags: 0,
            meshes: vec![bare_mesh, rock_mesh],
            compression: vec![compression(1.0, 1.0, 1.0), compression(10.0, 4.0, 6.0)],
            bounding_spheres: (0..3)
                .map(|i| BoundingSphere {
                    radius: i as f32,
                    ..Default::default()
                })
                .collect(),
            resource: Some(geometry_handle),
        },
    };

    let bsp_resources = StructureBspTagResources {
        collision_bsps: Vec::new(),
        instanced_geometry: vec![
            InstancedGeometryDefinition {
                mesh_index: 1,
                compression_index: 1,
                collision_info: CollisionGeometry {
                    surfaces: vec![surface(7), surface(3), surface(7), surface(-1)],
                    ..Default::default()
                },
                collision_mopp_codes: vec![TagHkpMoppCode {
                    info: Vec4::ONE,
                    data: vec![0x11, 0x22, 0x33],
                }],
                ..Default::default()
            },
            InstancedGeometryDefinition {
                mesh_index: 0,
                compression_index: 0,
                ..Default::default()
            },
        ],
    };
    let bsp_resource_handle = cache.resource_cache_mut().create(&bsp_resources).unwrap();

    let structure_bsp = ScenarioStructureBsp {
        materials: (0..8)
            .map(|i| RenderMaterial {
                imported_material_index: i,
                ..Default::default()
            })
            .collect(),
        collision_materials: (0..8)
            .map(|i| StructureCollisionMaterial {
                runtime_global_material_index: 100 + i,
                ..Default::default()
            })
            .collect(),
        instanced_geometry_instances: vec![
            InstancedGeometryInstance {
                name: rock_name,
                scale: 1.0,
                forward: Vec3::X,
                left: Vec3::Y,
                up: Vec3::Z,
                mesh_index: 0,
                bsp_physics: vec![CollisionBspPhysicsDefinition {
                    geometry_shape: CollisionGeometryShape {
                        model: None,
                        bsp_index: 0,
                        collision_geometry_shape_key: 5,
                        collision_geometry_shape_type: 2,
                        ..Default::default()
                    },
                    mopp_bv_tree_shape: vec![1, 2, 3, 4],
                }],
                ..Default::default()
            },
            InstancedGeometryInstance {
                name: bare_name,
                scale: 1.0,
                mesh_index: 1,
                ..Default::default()
            },
        ],
        collision_bsp_resource: Some(bsp_resource_handle),
    };

    let sbsp_tag = cache.allocate_tag::<ScenarioStructureBsp>("levels/test/box/box_bsp_000");
    cache.serialize(&mut stream, sbsp_tag, &structure_bsp).unwrap();

    let lbsp_tag = cache.allocate_tag::<ScenarioLightmapBspData>("levels/test/box/box_bsp_000");
    cache.serialize(&mut stream, lbsp_tag, &lightmap_bsp).unwrap();

    let lightmap_tag = cache.allocate_tag::<ScenarioLightmap>("levels/test/box/box_faux");
    cache
        .serialize(
            &mut stream,
            lightmap_tag,
            &ScenarioLightmap {
                lightmap_data_references: vec![Some(lbsp_tag)],
            },
        )
        .unwrap();

    let scenario = Scenario {
        structure_bsps: vec![StructureBspBlock {
            structure_bsp: Some(sbsp_tag),
            flags: 0,
        }],
        lightmap: Some(lightmap_tag),
    };
    let scenario_tag = cache.allocate_tag::<Scenario>(SCENARIO_NAME);
    cache.serialize(&mut stream, scenario_tag, &scenario).unwrap();

    Source {
        cache,
        stream,
        scenario,
    }
}

fn fetch<T: TagDefinition>(cache: &GameCache, stream: &TagStream, name: &str) -> T {
    let tag = cache
        .try_get_tag::<T>(name)
        .unwrap_or_else(|| panic!("no {} tag named {name}", T::GROUP));
    cache.deserialize::<T>(stream, tag).unwrap()
}

#[test]
fn promotes_instance_into_four_linked_records() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();

    let scenery_tag = {
        let mut converter = InstancedGeometryToObjectConverter::new(
            &mut dest,
            &mut stream,
            &source.cache,
            &source.stream,
            &source.scenario,
            0,
        )
        .unwrap();
        assert_eq!(converter.object_tag_name(0).unwrap(), ROCK_TAG);
        converter.convert("Rock 01!").unwrap().expect("rock promoted")
    };

    assert_eq!(dest.tag_count(), 4);
    assert_eq!(dest.tag_name(scenery_tag).unwrap(), ROCK_TAG);
    assert!(dest.tags().all(|(_, instance)| instance.defined));

    let scenery: Scenery = dest.deserialize(&stream, scenery_tag).unwrap();
    let model_tag = dest.try_get_tag::<Model>(ROCK_TAG).unwrap();
    assert_eq!(scenery.model, Some(model_tag));
    assert_eq!(scenery.bounding_radius, 20.0);
    assert_eq!(scenery.sweetener_size, SweetenerSize::Large);
    assert_eq!(scenery.multiplayer_object.len(), 1);
    assert_eq!(scenery.multiplayer_object[0].spawn_time, 30);
    assert_eq!(scenery.multiplayer_object[0].abandon_time, 60);
    assert!(scenery.scenery_flags.contains(SceneryFlags::PHYSICALLY_SIMULATES));

    let model: Model = fetch(&dest, &stream, ROCK_TAG);
    assert_eq!(model.render_model, dest.try_get_tag::<RenderModel>(ROCK_TAG));
    assert_eq!(
        model.collision_model,
        dest.try_get_tag::<CollisionModel>(ROCK_TAG)
    );
    assert_eq!(model.reduce_to_l1_super_low, 300.0);
    assert_eq!(model.reduce_to_l2_low, 280.0);
    assert_eq!(model.nodes.len(), 1);
    assert_eq!(model.collision_regions.len(), 1);
    assert_eq!(model.collision_regions[0].collision_region_index, 0);
    assert_eq!(model.collision_regions[0].permutations[0].physics_permutation_index, 0);
    let globals: Vec<i16> = model.materials.iter().map(|m| m.global_material_index).collect();
    assert_eq!(globals, vec![107, 103]);

    let render_model: RenderModel = fetch(&dest, &stream, ROCK_TAG);
    assert_eq!(render_model.instance_starting_mesh_index, -1);
    assert_eq!(render_model.name, StringId::INVALID);
    assert_eq!(render_model.compression.len(), 1);
    assert_eq!(render_model.compression, render_model.geometry.compression);
    assert_eq!(render_model.materials.len(), 1);
    assert_eq!(render_model.materials[0].imported_material_index, 5);
    let mesh = &render_model.geometry.meshes[0];
    assert!(mesh.parts.iter().all(|p| p.material_index == 0));
    assert_eq!(mesh.parts[0].transparent_sorting_index, -1);
    assert_eq!(mesh.parts[1].transparent_sorting_index, 0);
    assert_eq!(render_model.geometry.bounding_spheres.len(), 1);
    assert_eq!(render_model.geometry.bounding_spheres[0].radius, 1.0);
    assert_eq!(mesh.vertex_buffer_indices, [0, -1, -1, -1, -1, -1, -1, -1]);
    assert_eq!(mesh.index_buffer_indices, [0, -1]);
    assert_eq!(render_model.geometry.compression.len(), 1);
    assert_eq!(render_model.geometry.compression[0].x.length(), 10.0);

    let resource: RenderGeometryApiResourceDefinition = dest
        .resource_cache()
        .get(render_model.geometry.resource.unwrap())
        .unwrap();
    assert_eq!(resource.vertex_buffers.elements, vec![vertex_buffer(2)]);
    assert_eq!(resource.index_buffers.elements, vec![index_buffer(1)]);
    assert_eq!(resource.vertex_buffers.address_type, CacheAddressType::Definition);

    let collision: CollisionModel = fetch(&dest, &stream, ROCK_TAG);
    let permutation = &collision.regions[0].permutations[0];
    let surfaces: Vec<i16> = permutation.bsps[0]
        .geometry
        .surfaces
        .iter()
        .map(|s| s.material_index)
        .collect();
    assert_eq!(surfaces, vec![0, 1, 0, -1]);
    assert_eq!(permutation.bsps[0].node_index, 0);
    assert_eq!(permutation.bsp_mopp_codes[0].data, vec![0x11, 0x22, 0x33]);
    let shape = &permutation.bsp_physics[0].geometry_shape;
    assert_eq!(shape.model, Some(model_tag));
    assert_eq!(shape.bsp_index, -1);
    assert_eq!(shape.collision_geometry_shape_key, 0xFFFF);
    assert_eq!(shape.collision_geometry_shape_type, 0);
}

#[test]
fn second_conversion_returns_existing_scenery() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    let mut converter = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap();

    let first = converter.convert_instance(0).unwrap();
    let second = converter.convert_instance(0).unwrap();
    let by_name = converter.convert("Rock 01!").unwrap();
    drop(converter);

    assert_eq!(first, second);
    assert_eq!(by_name, Some(first));
    assert_eq!(dest.tag_count(), 4);
    assert_eq!(stream.revision(), 4);
    assert_eq!(dest.resource_cache().len(), 1);
}

#[test]
fn undefined_scenery_from_a_failed_conversion_is_an_error() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    // A failed conversion leaves its scenery handle allocated but undefined.
    dest.allocate_tag::<Scenery>(ROCK_TAG);

    let result = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap()
    .convert_instance(0);

    match result {
        Err(ForgeError::UndefinedTag(name)) => assert_eq!(name, ROCK_TAG),
        other => panic!("expected an undefined tag error, got {other:?}"),
    }
    assert_eq!(dest.tag_count(), 1);
    assert_eq!(stream.revision(), 0);
}

#[test]
fn instance_without_physics_gets_default_collision() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap()
    .convert("bare")
    .unwrap()
    .expect("bare promoted");

    let collision: CollisionModel = fetch(&dest, &stream, BARE_TAG);
    assert!(collision.regions.is_empty());

    let model: Model = fetch(&dest, &stream, BARE_TAG);
    assert_eq!(model.collision_regions.len(), 1);
    let region = &model.collision_regions[0];
    assert_eq!(region.collision_region_index, -1);
    assert_eq!(region.physics_region_index, 0);
    assert_eq!(region.permutations.len(), 1);
    assert_eq!(region.permutations[0].collision_permutation_index, -1);
    assert_eq!(region.permutations[0].physics_permutation_index, 0);
    assert_eq!(
        dest.string_table().get_string(region.name),
        Some("default")
    );
    assert!(model.materials.is_empty());

    let render_model: RenderModel = fetch(&dest, &stream, BARE_TAG);
    let mesh = &render_model.geometry.meshes[0];
    assert_eq!(mesh.index_buffer_indices, [0, 0]);
    assert_eq!(&mesh.vertex_buffer_indices[..3], &[0, 1, -1]);

    let resource: RenderGeometryApiResourceDefinition = dest
        .resource_cache()
        .get(render_model.geometry.resource.unwrap())
        .unwrap();
    assert!(resource.index_buffers.is_empty());
    assert_eq!(
        resource.vertex_buffers.elements,
        vec![vertex_buffer(0), vertex_buffer(3)]
    );
}

#[test]
fn unknown_names_are_not_found() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    let mut converter = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap();

    assert_eq!(converter.convert("missing").unwrap(), None);
    assert_eq!(converter.convert("not_an_instance").unwrap(), None);
    drop(converter);

    assert_eq!(dest.tag_count(), 0);
    assert_eq!(stream.revision(), 0);
}

#[test]
fn convert_all_promotes_every_instance_in_order() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    let mut converter = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap()
    .with_defaults(ObjectDefaults {
        spawn_time: 5,
        reduce_to_l2_low: 200.0,
        ..Default::default()
    });

    assert_eq!(converter.instance_names().unwrap(), vec!["Rock 01!", "bare"]);
    let promoted = converter.convert_all().unwrap();
    drop(converter);

    assert_eq!(promoted.len(), 2);
    assert_eq!(dest.tag_name(promoted[0]).unwrap(), ROCK_TAG);
    assert_eq!(dest.tag_name(promoted[1]).unwrap(), BARE_TAG);
    assert_eq!(dest.tag_count(), 8);

    let scenery: Scenery = dest.deserialize(&stream, promoted[1]).unwrap();
    assert_eq!(scenery.multiplayer_object[0].spawn_time, 5);
    assert_eq!(scenery.multiplayer_object[0].abandon_time, 60);
    let model: Model = fetch(&dest, &stream, BARE_TAG);
    assert_eq!(model.reduce_to_l2_low, 200.0);
}

#[test]
fn bad_structure_bsp_index_is_an_index_fault() {
    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();

    let result = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        3,
    );
    assert!(matches!(
        result,
        Err(ForgeError::IndexOutOfRange {
            table: "structure bsps",
            index: 3,
            len: 1
        })
    ));
}

#[test]
fn promoted_cache_survives_save_and_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("promoted.rdb");

    let source = build_source();
    let mut dest = GameCache::new();
    let mut stream = TagStream::new();
    let scenery_tag = InstancedGeometryToObjectConverter::new(
        &mut dest,
        &mut stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap()
    .convert("Rock 01!")
    .unwrap()
    .unwrap();
    dest.save(&stream, &path).unwrap();

    let (loaded, loaded_stream) = GameCache::load(&path).unwrap();
    assert_eq!(loaded.tag_count(), 4);
    assert_eq!(loaded.try_get_tag::<Scenery>(ROCK_TAG), Some(scenery_tag));
    let render_model: RenderModel = fetch(&loaded, &loaded_stream, ROCK_TAG);
    let resource: RenderGeometryApiResourceDefinition = loaded
        .resource_cache()
        .get(render_model.geometry.resource.unwrap())
        .unwrap();
    assert_eq!(resource.vertex_buffers.elements, vec![vertex_buffer(2)]);

    // A reloaded destination still short-circuits on existing objects.
    let mut loaded = loaded;
    let mut loaded_stream = loaded_stream;
    let again = InstancedGeometryToObjectConverter::new(
        &mut loaded,
        &mut loaded_stream,
        &source.cache,
        &source.stream,
        &source.scenario,
        0,
    )
    .unwrap()
    .convert_instance(0)
    .unwrap();
    assert_eq!(again, scenery_tag);
    assert_eq!(loaded.tag_count(), 4);

    let view = RDBView::load(&path).unwrap();
    let entry = format!("tag/{:08}", scenery_tag.index);
    assert!(view.fetch_tagged::<Scenery>(&entry, Scenery::GROUP.0).is_ok());
    assert!(view.fetch_tagged::<Scenery>(&entry, Model::GROUP.0).is_err());
}
