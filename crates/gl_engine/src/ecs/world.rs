//! ECS World implementation
//!
//! The world is the registry that owns the entity manager and the three
//! component stores. One world belongs to one engine; tests build as many
//! independent worlds as they like.

use super::components::{LightManager, RenderableManager, TransformManager};
use super::EntityManager;

/// Registry of entities and their component stores
#[derive(Debug, Default)]
pub struct World {
    /// Entity allocation and kind tags
    pub entities: EntityManager,
    /// Model matrices
    pub transforms: TransformManager,
    /// Directional and point lights
    pub lights: LightManager,
    /// Drawable meshes
    pub renderables: RenderableManager,
}

impl World {
    /// Create a new, empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity
    pub fn create_entity(&mut self) -> super::Entity {
        self.entities.create()
    }

    /// Replace every store with a fresh, empty one
    ///
    /// GPU objects referenced by renderables are not released here; the
    /// engine drains them first.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{LightBuilder, LightType};
    use crate::foundation::math::{Mat4, Mat4Ext};

    #[test]
    fn test_reset_forgets_everything() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.transforms.set_transform(entity, Mat4::translation(1.0, 0.0, 0.0));
        LightBuilder::new(LightType::Point).build(&mut world, entity);

        world.reset();

        assert!(!world.entities.is_alive(entity));
        assert!(!world.lights.has_component(entity));
        assert!(world.transforms.is_empty());
    }

    #[test]
    fn test_worlds_are_independent() {
        let mut first = World::new();
        let second = World::new();
        let entity = first.create_entity();
        assert!(first.entities.is_alive(entity));
        assert!(!second.entities.is_alive(entity));
    }
}
