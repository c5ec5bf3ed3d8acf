//! Scene: the set of entities a view draws
//!
//! Membership is classified once, when an entity is added, from its kind tag
//! at that moment. Later kind changes do not move the entity between sets.

use std::collections::BTreeSet;

use crate::ecs::{ComponentKind, Entity, EntityManager};

/// Renderable and light entities drawn together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    renderables: BTreeSet<Entity>,
    lights: BTreeSet<Entity>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity according to its current kind
    ///
    /// Dead entities and entities with no component are ignored.
    pub fn add_entity(&mut self, entities: &EntityManager, entity: Entity) {
        match entities.kind(entity) {
            Some(ComponentKind::Renderable) => {
                self.renderables.insert(entity);
            }
            Some(ComponentKind::Light) => {
                self.lights.insert(entity);
            }
            Some(ComponentKind::None) | None => {
                log::trace!("Ignoring {entity} added to scene without a component");
            }
        }
    }

    /// Remove an entity from both sets
    pub fn remove_entity(&mut self, entity: Entity) {
        self.renderables.remove(&entity);
        self.lights.remove(&entity);
    }

    /// Whether the entity is in either set
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.renderables.contains(&entity) || self.lights.contains(&entity)
    }

    /// Renderable entities in id order
    pub fn renderables(&self) -> &BTreeSet<Entity> {
        &self.renderables
    }

    /// Light entities in id order
    pub fn lights(&self) -> &BTreeSet<Entity> {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_and_dead_entities_are_ignored() {
        let mut entities = EntityManager::new();
        let plain = entities.create();
        let dead = entities.create();
        entities.discard(dead);

        let mut scene = Scene::new();
        scene.add_entity(&entities, plain);
        scene.add_entity(&entities, dead);
        assert!(!scene.has_entity(plain));
        assert!(!scene.has_entity(dead));
    }

    #[test]
    fn test_entities_are_classified_by_kind() {
        let mut entities = EntityManager::new();
        let mesh = entities.create();
        let lamp = entities.create();
        entities.set_kind(mesh, ComponentKind::Renderable);
        entities.set_kind(lamp, ComponentKind::Light);

        let mut scene = Scene::new();
        scene.add_entity(&entities, mesh);
        scene.add_entity(&entities, lamp);
        assert!(scene.renderables().contains(&mesh));
        assert!(scene.lights().contains(&lamp));

        scene.remove_entity(mesh);
        assert!(!scene.has_entity(mesh));
        assert!(scene.has_entity(lamp));
    }
}
