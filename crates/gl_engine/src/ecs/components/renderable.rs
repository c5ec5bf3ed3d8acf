//! Renderable component store
//!
//! A renderable entity owns an ordered list of drawable elements. Each
//! element is one indexed draw: a configured vertex array, a topology, an
//! index range and the shader used to draw it.

use std::collections::HashMap;

use crate::ecs::{ComponentKind, Entity};
use crate::engine::{Engine, EngineError, EngineResult};
use crate::foundation::collections::{IndexBufferHandle, ShaderHandle, VertexBufferHandle};
use crate::render::api::{GpuVertexArray, IndexType};

pub use crate::render::api::PrimitiveType;

/// One indexed draw of a renderable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    /// Vertex array with attributes and index buffer wired in
    pub vertex_array: GpuVertexArray,
    /// Topology of the draw
    pub topology: PrimitiveType,
    /// Number of indices drawn
    pub count: u32,
    /// Byte offset of the first index
    pub byte_offset: u32,
    /// Index element type
    pub index_type: IndexType,
}

/// Elements of a renderable with their shaders, in draw order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableMesh {
    /// Drawable elements
    pub elements: Vec<Element>,
    /// Shader of each element, same length and order as `elements`
    pub shaders: Vec<ShaderHandle>,
}

impl RenderableMesh {
    /// Iterate over elements paired with their shader
    pub fn iter(&self) -> impl Iterator<Item = (&Element, ShaderHandle)> + '_ {
        self.elements.iter().zip(self.shaders.iter().copied())
    }
}

/// Sparse entity → mesh storage
#[derive(Debug, Default)]
pub struct RenderableManager {
    meshes: HashMap<Entity, RenderableMesh>,
}

impl RenderableManager {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the entity holds a mesh
    pub fn has_component(&self, entity: Entity) -> bool {
        self.meshes.contains_key(&entity)
    }

    /// Mesh of an entity
    pub fn mesh(&self, entity: Entity) -> Option<&RenderableMesh> {
        self.meshes.get(&entity)
    }

    /// Number of renderable entities
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub(crate) fn insert(&mut self, entity: Entity, mesh: RenderableMesh) -> Option<RenderableMesh> {
        self.meshes.insert(entity, mesh)
    }

    pub(crate) fn remove(&mut self, entity: Entity) -> Option<RenderableMesh> {
        self.meshes.remove(&entity)
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (Entity, RenderableMesh)> + '_ {
        self.meshes.drain()
    }
}

#[derive(Debug, Clone, Copy)]
struct GeometrySlot {
    topology: PrimitiveType,
    vertices: VertexBufferHandle,
    indices: IndexBufferHandle,
    count: u32,
    offset: u32,
}

/// Two-phase builder for renderable components
///
/// The builder is sized for a fixed number of elements. Every slot needs a
/// shader and a geometry before [`build`](Self::build) succeeds.
#[derive(Debug, Clone)]
pub struct RenderableBuilder {
    geometries: Vec<Option<GeometrySlot>>,
    shaders: Vec<Option<ShaderHandle>>,
    out_of_range: Option<usize>,
}

impl RenderableBuilder {
    /// Start a builder for `count` elements
    pub fn new(count: usize) -> Self {
        Self {
            geometries: vec![None; count],
            shaders: vec![None; count],
            out_of_range: None,
        }
    }

    /// Shader used to draw element `index`
    ///
    /// Out-of-range indices are reported by `build`.
    #[must_use]
    pub fn shader(mut self, index: usize, shader: ShaderHandle) -> Self {
        match self.shaders.get_mut(index) {
            Some(slot) => *slot = Some(shader),
            None => self.out_of_range = Some(index),
        }
        self
    }

    /// Geometry of element `index`
    ///
    /// `count` indices are drawn starting at index `offset` (in elements,
    /// not bytes).
    #[must_use]
    pub fn geometry(
        mut self,
        index: usize,
        topology: PrimitiveType,
        vertices: VertexBufferHandle,
        indices: IndexBufferHandle,
        count: u32,
        offset: u32,
    ) -> Self {
        let slot = GeometrySlot { topology, vertices, indices, count, offset };
        match self.geometries.get_mut(index) {
            Some(entry) => *entry = Some(slot),
            None => self.out_of_range = Some(index),
        }
        self
    }

    /// Set up the vertex arrays on the device, commit the mesh and tag the
    /// entity as renderable
    ///
    /// Fails without side effects when a slot is empty, a handle is stale or
    /// the entity is not alive. A light record already held by the entity is
    /// kept; only the tag is overwritten.
    pub fn build(self, engine: &mut Engine, entity: Entity) -> EngineResult<()> {
        if !engine.world().entities.is_alive(entity) {
            return Err(EngineError::InvalidBuilder(format!("{entity} is not alive")));
        }
        if let Some(index) = self.out_of_range {
            return Err(EngineError::InvalidBuilder(format!(
                "slot {index} is out of range for a builder of {} elements",
                self.geometries.len()
            )));
        }
        if self.geometries.is_empty() {
            return Err(EngineError::InvalidBuilder("renderable has no elements".to_string()));
        }

        let mut slots = Vec::with_capacity(self.geometries.len());
        for (index, (geometry, shader)) in self.geometries.iter().zip(&self.shaders).enumerate() {
            let geometry = geometry
                .ok_or_else(|| EngineError::InvalidBuilder(format!("element {index} has no geometry")))?;
            let shader = shader
                .ok_or_else(|| EngineError::InvalidBuilder(format!("element {index} has no shader")))?;
            if !engine.has_shader(shader) {
                return Err(EngineError::StaleHandle("shader"));
            }
            slots.push((geometry, shader));
        }

        let mut elements = Vec::with_capacity(slots.len());
        let mut shaders = Vec::with_capacity(slots.len());
        for (geometry, shader) in slots {
            match engine.create_vertex_array(geometry.vertices, geometry.indices) {
                Ok((vertex_array, index_type)) => {
                    elements.push(Element {
                        vertex_array,
                        topology: geometry.topology,
                        count: geometry.count,
                        byte_offset: geometry.offset * index_type.byte_size(),
                        index_type,
                    });
                    shaders.push(shader);
                }
                Err(error) => {
                    for element in &elements {
                        engine.release_vertex_array(element.vertex_array);
                    }
                    return Err(error);
                }
            }
        }

        let mesh = RenderableMesh { elements, shaders };
        let world = engine.world_mut();
        if let Some(previous) = world.renderables.insert(entity, mesh) {
            for element in previous.elements {
                engine.release_vertex_array(element.vertex_array);
            }
        }
        let world = engine.world_mut();
        if world.entities.set_kind(entity, ComponentKind::Renderable) == Some(ComponentKind::Light) {
            log::warn!("{entity} was a light and is now tagged renderable; its light record is kept");
        }
        log::debug!("Built renderable for {entity}");
        Ok(())
    }
}
