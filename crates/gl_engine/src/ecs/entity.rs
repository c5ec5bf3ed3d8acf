//! Entity implementation
//!
//! Entities are opaque ids with no payload. The [`EntityManager`] hands them
//! out from a monotonic counter and keeps a coarse [`ComponentKind`] tag per
//! live entity; the tag decides which component store is authoritative.

use std::collections::HashMap;

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Create a new entity with the given ID
    pub(super) const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

/// Which component store currently owns an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentKind {
    /// No component built yet, or components torn down
    #[default]
    None,
    /// Owned by the renderable store
    Renderable,
    /// Owned by one of the light stores
    Light,
}

/// Allocates entity ids and tracks their component kind
#[derive(Debug, Default)]
pub struct EntityManager {
    next_id: u32,
    entities: HashMap<Entity, ComponentKind>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity tagged [`ComponentKind::None`]
    ///
    /// Ids are never reused, even after [`discard`](Self::discard).
    pub fn create(&mut self) -> Entity {
        let entity = Entity::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(entity, ComponentKind::None);
        log::trace!("Created {entity}");
        entity
    }

    /// Whether the entity is registered
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Remove the entity from the registry
    ///
    /// Component records are not touched; tear them down first with
    /// `Engine::destroy_entity`.
    pub fn discard(&mut self, entity: Entity) {
        if self.entities.remove(&entity).is_some() {
            log::trace!("Discarded {entity}");
        }
    }

    /// Current kind tag, `None` when the entity is not alive
    pub fn kind(&self, entity: Entity) -> Option<ComponentKind> {
        self.entities.get(&entity).copied()
    }

    /// Overwrite the kind tag of a live entity
    ///
    /// Returns the previous tag; unknown entities are left unregistered.
    pub(crate) fn set_kind(&mut self, entity: Entity, kind: ComponentKind) -> Option<ComponentKind> {
        self.entities.get_mut(&entity).map(|slot| std::mem::replace(slot, kind))
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is alive
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over live entities in no particular order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_created_ids_are_distinct_and_alive() {
        let mut manager = EntityManager::new();
        let ids: Vec<_> = (0..100).map(|_| manager.create()).collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|e| manager.is_alive(*e)));
        assert!(ids.iter().all(|e| manager.kind(*e) == Some(ComponentKind::None)));
    }

    #[test]
    fn test_discard_is_final_and_ids_are_not_reused() {
        let mut manager = EntityManager::new();
        let first = manager.create();
        manager.discard(first);
        assert!(!manager.is_alive(first));
        assert_eq!(manager.kind(first), None);

        let second = manager.create();
        assert_ne!(first, second);
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_operations_on_unknown_entity_are_no_ops() {
        let mut manager = EntityManager::new();
        let entity = manager.create();
        manager.discard(entity);
        manager.discard(entity);
        assert_eq!(manager.set_kind(entity, ComponentKind::Light), None);
        assert!(!manager.is_alive(entity));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_set_kind_overwrites() {
        let mut manager = EntityManager::new();
        let entity = manager.create();
        assert_eq!(manager.set_kind(entity, ComponentKind::Renderable), Some(ComponentKind::None));
        assert_eq!(manager.set_kind(entity, ComponentKind::Light), Some(ComponentKind::Renderable));
        assert_eq!(manager.kind(entity), Some(ComponentKind::Light));
    }
}
