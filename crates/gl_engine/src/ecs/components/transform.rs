//! Transform component store
//!
//! Sparse map from entity to a 4x4 model matrix. Entities without an entry
//! are treated as sitting at the origin with the identity transform.

use std::collections::HashMap;

use crate::ecs::Entity;
use crate::foundation::math::Mat4;

/// Sparse entity → model matrix storage
#[derive(Debug, Default)]
pub struct TransformManager {
    transforms: HashMap<Entity, Mat4>,
}

impl TransformManager {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model matrix of an entity
    ///
    /// Not validated against the entity's kind or liveness.
    pub fn set_transform(&mut self, entity: Entity, transform: Mat4) {
        self.transforms.insert(entity, transform);
    }

    /// Model matrix of an entity, identity when none was set
    pub fn get_transform(&self, entity: Entity) -> Mat4 {
        self.transforms.get(&entity).copied().unwrap_or_else(Mat4::identity)
    }

    /// Whether a transform was explicitly set
    pub fn has_transform(&self, entity: Entity) -> bool {
        self.transforms.contains_key(&entity)
    }

    /// Drop the transform of an entity
    pub fn remove(&mut self, entity: Entity) -> Option<Mat4> {
        self.transforms.remove(&entity)
    }

    /// Number of stored transforms
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityManager;
    use crate::foundation::math::{Mat4Ext, Vec3};

    #[test]
    fn test_missing_transform_is_identity() {
        let mut entities = EntityManager::new();
        let transforms = TransformManager::new();
        let entity = entities.create();
        assert_eq!(transforms.get_transform(entity), Mat4::identity());
        assert!(!transforms.has_transform(entity));
    }

    #[test]
    fn test_set_transform_round_trips_exactly() {
        let mut entities = EntityManager::new();
        let mut transforms = TransformManager::new();
        let entity = entities.create();
        let matrix = Mat4::translation(1.5, -2.25, 3.125)
            * Mat4::rotation(Vec3::new(0.3, 1.0, -0.2), 0.7)
            * Mat4::scaling(2.0, 0.5, 1.0);

        transforms.set_transform(entity, matrix);
        assert_eq!(transforms.get_transform(entity), matrix);

        transforms.remove(entity);
        assert_eq!(transforms.get_transform(entity), Mat4::identity());
    }
}
