//! Entity-Component-System implementation
//!
//! Entities are plain ids; components live in sparse per-kind stores owned by
//! the [`World`]. A coarse kind tag per entity selects which store is
//! authoritative when the engine tears an entity down.

pub mod world;
pub mod entity;
pub mod components;

#[cfg(test)]
mod tests;

pub use world::World;
pub use entity::{ComponentKind, Entity, EntityManager};
