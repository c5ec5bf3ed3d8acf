//! Light component stores
//!
//! Directional and point lights live in two sparse maps keyed by entity. An
//! entity is held by at most one of the two maps; [`LightBuilder::build`]
//! moves it between them when the variant changes.
//!
//! Point-light falloff is chosen qualitatively through [`LightDistance`],
//! which maps to a fixed table of attenuation coefficients.

use std::collections::HashMap;

use crate::ecs::{ComponentKind, Entity, World};
use crate::foundation::math::Vec3;

/// Variant of light a builder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Parallel rays from an infinitely distant source
    Directional,
    /// Omnidirectional light at a position with distance falloff
    Point,
}

/// Approximate reach of a point light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightDistance {
    /// About 50 units
    Short,
    /// About 200 units
    #[default]
    Average,
    /// About 600 units
    Large,
    /// About 3250 units
    Massive,
    /// About 7000 units
    SuperMassive,
}

/// Constant, linear and quadratic attenuation terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl LightDistance {
    /// Attenuation coefficients for this reach
    pub const fn attenuation(self) -> Attenuation {
        let (constant, linear, quadratic) = match self {
            Self::Short => (1.0, 0.09, 0.032),
            Self::Average => (1.0, 0.022, 0.0019),
            Self::Large => (1.0, 0.007, 0.0002),
            Self::Massive => (1.0, 0.0014, 0.000_007),
            Self::SuperMassive => (1.0, 0.0007, 0.000_001_7),
        };
        Attenuation { constant, linear, quadratic }
    }
}

/// Directional light record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// World-space direction the light travels in
    pub direction: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
}

/// Point light record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Distance falloff
    pub attenuation: Attenuation,
}

/// Sparse storage for directional and point lights
#[derive(Debug, Default)]
pub struct LightManager {
    directional: HashMap<Entity, DirectionalLight>,
    point: HashMap<Entity, PointLight>,
}

impl LightManager {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the entity holds any light record
    pub fn has_component(&self, entity: Entity) -> bool {
        self.directional.contains_key(&entity) || self.point.contains_key(&entity)
    }

    /// Directional light of an entity
    pub fn directional(&self, entity: Entity) -> Option<&DirectionalLight> {
        self.directional.get(&entity)
    }

    /// Point light of an entity
    pub fn point(&self, entity: Entity) -> Option<&PointLight> {
        self.point.get(&entity)
    }

    /// Move a point light; directional lights and unknown entities are ignored
    pub fn set_position(&mut self, entity: Entity, x: f32, y: f32, z: f32) {
        if let Some(light) = self.point.get_mut(&entity) {
            light.position = Vec3::new(x, y, z);
        }
    }

    /// Remove every light record of an entity
    pub fn remove(&mut self, entity: Entity) -> bool {
        let directional = self.directional.remove(&entity).is_some();
        let point = self.point.remove(&entity).is_some();
        directional || point
    }

    /// Number of directional lights
    pub fn directional_count(&self) -> usize {
        self.directional.len()
    }

    /// Number of point lights
    pub fn point_count(&self) -> usize {
        self.point.len()
    }

    pub(crate) fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
    }
}

/// Two-phase builder for light components
///
/// ```
/// use gl_engine::ecs::{World, components::{LightBuilder, LightType, LightDistance}};
///
/// let mut world = World::new();
/// let lamp = world.entities.create();
/// LightBuilder::new(LightType::Point)
///     .position(0.0, 0.0, 5.0)
///     .distance(LightDistance::Short)
///     .build(&mut world, lamp);
/// assert!(world.lights.has_component(lamp));
/// ```
#[derive(Debug, Clone)]
pub struct LightBuilder {
    light_type: LightType,
    color: Vec3,
    direction: Vec3,
    position: Vec3,
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    distance: LightDistance,
}

impl LightBuilder {
    /// Start building a light of the given variant
    pub fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            color: Vec3::new(1.0, 1.0, 1.0),
            direction: Vec3::new(1.0, 1.0, -1.0),
            position: Vec3::zeros(),
            ambient: Vec3::new(0.02, 0.02, 0.02),
            diffuse: Vec3::new(0.5, 0.5, 0.5),
            specular: Vec3::new(1.0, 1.0, 1.0),
            distance: LightDistance::default(),
        }
    }

    /// Tint multiplied into the ambient, diffuse and specular colors
    #[must_use]
    pub fn color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Vec3::new(r, g, b);
        self
    }

    /// Direction for directional lights
    #[must_use]
    pub fn direction(mut self, x: f32, y: f32, z: f32) -> Self {
        self.direction = Vec3::new(x, y, z);
        self
    }

    /// Position for point lights
    #[must_use]
    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Ambient color
    #[must_use]
    pub fn ambient(mut self, r: f32, g: f32, b: f32) -> Self {
        self.ambient = Vec3::new(r, g, b);
        self
    }

    /// Diffuse color
    #[must_use]
    pub fn diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = Vec3::new(r, g, b);
        self
    }

    /// Specular color
    #[must_use]
    pub fn specular(mut self, r: f32, g: f32, b: f32) -> Self {
        self.specular = Vec3::new(r, g, b);
        self
    }

    /// Reach of a point light
    #[must_use]
    pub const fn distance(mut self, distance: LightDistance) -> Self {
        self.distance = distance;
        self
    }

    /// Commit the light to `world` and tag the entity as a light
    ///
    /// An entity previously tagged renderable keeps its renderable record;
    /// only the tag is overwritten. Building on a dead entity does nothing.
    pub fn build(&self, world: &mut World, entity: Entity) {
        if !world.entities.is_alive(entity) {
            log::trace!("Ignoring light build for dead {entity}");
            return;
        }

        let ambient = self.ambient.component_mul(&self.color);
        let diffuse = self.diffuse.component_mul(&self.color);
        let specular = self.specular.component_mul(&self.color);

        match self.light_type {
            LightType::Directional => {
                world.lights.point.remove(&entity);
                world.lights.directional.insert(
                    entity,
                    DirectionalLight { direction: self.direction, ambient, diffuse, specular },
                );
            }
            LightType::Point => {
                world.lights.directional.remove(&entity);
                world.lights.point.insert(
                    entity,
                    PointLight {
                        position: self.position,
                        ambient,
                        diffuse,
                        specular,
                        attenuation: self.distance.attenuation(),
                    },
                );
            }
        }

        if world.entities.set_kind(entity, ComponentKind::Light) == Some(ComponentKind::Renderable) {
            log::warn!("{entity} was renderable and is now tagged as a light; its renderable record is kept");
        }
        log::debug!("Built {:?} light for {entity}", self.light_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_attenuation_table_is_stable() {
        let all = [
            LightDistance::Short,
            LightDistance::Average,
            LightDistance::Large,
            LightDistance::Massive,
            LightDistance::SuperMassive,
        ];
        for distance in all {
            assert_eq!(distance.attenuation(), distance.attenuation());
        }
        let short = LightDistance::Short.attenuation();
        assert_relative_eq!(short.constant, 1.0);
        assert_relative_eq!(short.linear, 0.09);
        assert_relative_eq!(short.quadratic, 0.032);
        assert_relative_eq!(LightDistance::Average.attenuation().quadratic, 0.0019);
        assert_relative_eq!(LightDistance::Large.attenuation().linear, 0.007);
    }

    #[test]
    fn test_attenuation_falls_off_slower_for_larger_reach() {
        let quadratic: Vec<f32> = [
            LightDistance::Short,
            LightDistance::Average,
            LightDistance::Large,
            LightDistance::Massive,
            LightDistance::SuperMassive,
        ]
        .iter()
        .map(|d| d.attenuation().quadratic)
        .collect();
        assert!(quadratic.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_builder_defaults() {
        let mut world = World::new();
        let entity = world.entities.create();
        LightBuilder::new(LightType::Directional).build(&mut world, entity);

        let light = world.lights.directional(entity).unwrap();
        assert_relative_eq!(light.direction, Vec3::new(1.0, 1.0, -1.0));
        assert_relative_eq!(light.ambient, Vec3::new(0.02, 0.02, 0.02));
        assert_relative_eq!(light.diffuse, Vec3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(light.specular, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(world.entities.kind(entity), Some(ComponentKind::Light));
    }

    #[test]
    fn test_color_tints_all_channels() {
        let mut world = World::new();
        let entity = world.entities.create();
        LightBuilder::new(LightType::Point)
            .color(1.0, 0.5, 0.0)
            .diffuse(0.8, 0.8, 0.8)
            .build(&mut world, entity);

        let light = world.lights.point(entity).unwrap();
        assert_relative_eq!(light.diffuse, Vec3::new(0.8, 0.4, 0.0));
        assert_relative_eq!(light.specular, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(light.attenuation, LightDistance::Average.attenuation());
    }

    #[test]
    fn test_set_position_only_moves_point_lights() {
        let mut world = World::new();
        let sun = world.entities.create();
        let lamp = world.entities.create();
        LightBuilder::new(LightType::Directional).build(&mut world, sun);
        LightBuilder::new(LightType::Point).build(&mut world, lamp);

        world.lights.set_position(sun, 1.0, 2.0, 3.0);
        world.lights.set_position(lamp, 1.0, 2.0, 3.0);

        assert!(world.lights.point(sun).is_none());
        assert_relative_eq!(world.lights.directional(sun).unwrap().direction, Vec3::new(1.0, 1.0, -1.0));
        assert_relative_eq!(world.lights.point(lamp).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rebuild_switches_variant() {
        let mut world = World::new();
        let entity = world.entities.create();
        LightBuilder::new(LightType::Directional).build(&mut world, entity);
        LightBuilder::new(LightType::Point).build(&mut world, entity);

        assert!(world.lights.directional(entity).is_none());
        assert!(world.lights.point(entity).is_some());
        assert_eq!(world.lights.directional_count() + world.lights.point_count(), 1);
    }

    #[test]
    fn test_build_on_dead_entity_is_ignored() {
        let mut world = World::new();
        let entity = world.entities.create();
        world.entities.discard(entity);
        LightBuilder::new(LightType::Point).build(&mut world, entity);
        assert!(!world.lights.has_component(entity));
    }
}
