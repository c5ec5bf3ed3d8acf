//! Cross-store ECS scenarios: kind tags, scene classification and the
//! destroy/discard protocol

use crate::drawable::Cube;
use crate::ecs::components::{LightBuilder, LightType};
use crate::ecs::{ComponentKind, World};
use crate::engine::Engine;
use crate::foundation::math::{Mat4, Mat4Ext};

#[test]
fn test_light_build_overwrites_renderable_tag_and_keeps_record() {
    let mut engine = Engine::headless();
    let cube = Cube::builder().build(&mut engine).unwrap();
    let entity = cube.entity();

    LightBuilder::new(LightType::Point).build(engine.world_mut(), entity);

    let world = engine.world();
    assert_eq!(world.entities.kind(entity), Some(ComponentKind::Light));
    assert!(world.lights.has_component(entity));
    assert!(world.renderables.has_component(entity));
}

#[test]
fn test_scene_classifies_on_add_only() {
    let mut engine = Engine::headless();
    let scene = engine.create_scene();
    let cube = Cube::builder().build(&mut engine).unwrap();
    engine.add_to_scene(scene, cube.entity()).unwrap();

    LightBuilder::new(LightType::Directional).build(engine.world_mut(), cube.entity());

    let members = engine.scene(scene).unwrap();
    assert!(members.renderables().contains(&cube.entity()));
    assert!(!members.lights().contains(&cube.entity()));

    engine.add_to_scene(scene, cube.entity()).unwrap();
    let members = engine.scene(scene).unwrap();
    assert!(members.lights().contains(&cube.entity()));
}

#[test]
fn test_untagged_and_dead_entities_are_not_added() {
    let mut engine = Engine::headless();
    let scene = engine.create_scene();
    let bare = engine.create_entity();
    let gone = engine.create_entity();
    engine.discard_entity(gone);

    engine.add_to_scene(scene, bare).unwrap();
    engine.add_to_scene(scene, gone).unwrap();

    let members = engine.scene(scene).unwrap();
    assert!(members.renderables().is_empty());
    assert!(members.lights().is_empty());
}

#[test]
fn test_destroy_follows_current_kind() {
    let mut engine = Engine::headless();
    let cube = Cube::builder().build(&mut engine).unwrap();
    let entity = cube.entity();
    engine.world_mut().transforms.set_transform(entity, Mat4::translation(0.0, 0.0, 1.0));
    LightBuilder::new(LightType::Point).build(engine.world_mut(), entity);

    engine.destroy_entity(entity);

    let world = engine.world();
    assert!(!world.lights.has_component(entity));
    assert!(world.renderables.has_component(entity));
    assert!(!world.transforms.has_transform(entity));
    assert_eq!(world.entities.kind(entity), Some(ComponentKind::None));

    engine.destroy();
    assert!(engine.world().renderables.is_empty());
}

#[test]
fn test_destroy_then_discard() {
    let mut engine = Engine::headless();
    let cube = Cube::builder().build(&mut engine).unwrap();
    let entity = cube.entity();

    engine.destroy_entity(entity);
    assert!(!engine.world().renderables.has_component(entity));
    assert!(engine.world().entities.is_alive(entity));

    engine.discard_entity(entity);
    assert!(!engine.world().entities.is_alive(entity));
    assert_eq!(engine.world().entities.kind(entity), None);

    engine.destroy_entity(entity);
    engine.discard_entity(entity);
}

#[test]
fn test_light_build_on_dead_entity_is_ignored() {
    let mut world = World::new();
    let entity = world.create_entity();
    world.entities.discard(entity);

    LightBuilder::new(LightType::Point).build(&mut world, entity);

    assert!(!world.lights.has_component(entity));
    assert_eq!(world.lights.point_count(), 0);
}

#[test]
fn test_rebuilding_a_light_switches_variant() {
    let mut world = World::new();
    let entity = world.create_entity();
    LightBuilder::new(LightType::Directional).build(&mut world, entity);
    LightBuilder::new(LightType::Point).position(1.0, 2.0, 3.0).build(&mut world, entity);

    assert!(world.lights.directional(entity).is_none());
    assert!(world.lights.point(entity).is_some());
    assert_eq!(world.lights.directional_count(), 0);
}
