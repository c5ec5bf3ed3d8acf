//! # Drawables
//!
//! Ready-made shapes that bundle everything needed to put geometry on screen:
//! a vertex buffer, one index buffer per element, a shader and a renderable
//! entity. Each shape only describes its mesh through [`Shape`]; the generic
//! [`DrawableBuilder`] does the uploading and wiring.
//!
//! ```ignore
//! let cube = Cube::builder()
//!     .shading_model(ShadingModel::Phong)
//!     .phong_material(material::EMERALD)
//!     .build(&mut engine)?;
//! engine.add_to_scene(scene, cube.entity())?;
//! ```

pub mod color;
pub mod cone;
pub mod cube;
pub mod material;
pub mod orbit;
pub mod plane;
pub mod pyramid;
pub mod ring;
pub mod sphere;
pub mod surface;

pub use cone::{Cone, Cylinder};
pub use cube::Cube;
pub use material::PhongMaterial;
pub use orbit::Orbit;
pub use plane::Plane;
pub use pyramid::{Pyramid, Tetrahedron};
pub use ring::Ring;
pub use sphere::{Geodesic, Polyhedron, Sphere};
pub use surface::Surface;

use crate::ecs::components::{PrimitiveType, RenderableBuilder};
use crate::ecs::Entity;
use crate::engine::{Engine, EngineError, EngineResult};
use crate::foundation::collections::{IndexBufferHandle, ShaderHandle, TextureHandle, VertexBufferHandle};
use crate::foundation::math::Mat4;
use crate::render::api::UniformValue;
use crate::render::resources::{
    uniform, AttributeType, IndexBufferBuilder, IndexType, ShaderBuilder, ShadingModel, VertexAttribute,
    VertexBufferBuilder,
};

/// Sub-buffer holding positions
pub const POSITION_BUFFER: usize = 0;
/// Sub-buffer holding normals
pub const NORMAL_BUFFER: usize = 1;
/// Sub-buffer holding colors
pub const COLOR_BUFFER: usize = 2;
/// Sub-buffer holding texture coordinates
pub const UV_BUFFER: usize = 3;

/// Indices of one element of a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshPart {
    /// Topology the indices are drawn with
    pub topology: PrimitiveType,
    /// Vertex indices
    pub indices: Vec<u32>,
}

/// CPU-side geometry of a shape
///
/// Attribute vectors are parallel: entry `i` of each belongs to vertex `i`.
/// Missing normals or texture coordinates are uploaded as zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Object-space positions
    pub positions: Vec<[f32; 3]>,
    /// Unit normals
    pub normals: Vec<[f32; 3]>,
    /// RGBA colors
    pub colors: Vec<[f32; 4]>,
    /// Texture coordinates
    pub uvs: Vec<[f32; 2]>,
    /// Elements in draw order
    pub parts: Vec<MeshPart>,
}

impl MeshData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn validate(&self) -> EngineResult<()> {
        let count = self.positions.len();
        if count == 0 {
            return Err(EngineError::InvalidBuilder("mesh has no vertices".to_string()));
        }
        for (name, len) in [("normals", self.normals.len()), ("colors", self.colors.len()), ("uvs", self.uvs.len())] {
            if len != 0 && len != count {
                return Err(EngineError::InvalidBuilder(format!("mesh has {count} positions but {len} {name}")));
            }
        }
        if self.parts.is_empty() || self.parts.iter().any(|part| part.indices.is_empty()) {
            return Err(EngineError::InvalidBuilder("mesh has an empty element".to_string()));
        }
        if let Some(index) = self.parts.iter().flat_map(|part| &part.indices).find(|&&index| index as usize >= count) {
            return Err(EngineError::InvalidBuilder(format!("index {index} is out of range for {count} vertices")));
        }
        Ok(())
    }
}

/// Geometry source of a drawable
pub trait Shape {
    /// Generate the mesh
    fn mesh(&self) -> MeshData;

    /// Whether the mesh can only be drawn unlit, as with lines that carry no normals
    fn unlit_only(&self) -> bool {
        false
    }
}

/// Textures sampled by a phong program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedMaterial {
    /// Diffuse map
    pub diffuse: TextureHandle,
    /// Specular map
    pub specular: TextureHandle,
    /// Specular exponent
    pub shininess: f32,
}

/// Objects created for one shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawable {
    entity: Entity,
    shader: ShaderHandle,
    vertex_buffer: VertexBufferHandle,
    index_buffers: Vec<IndexBufferHandle>,
}

impl Drawable {
    /// Renderable entity; add it to a scene to draw it
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Shader shared by every element
    pub const fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// Vertex buffer
    pub const fn vertex_buffer(&self) -> VertexBufferHandle {
        self.vertex_buffer
    }

    /// One index buffer per element
    pub fn index_buffers(&self) -> &[IndexBufferHandle] {
        &self.index_buffers
    }

    /// Tear down the entity and every object the drawable created
    ///
    /// Textures were supplied by the caller and are left alone.
    pub fn destroy(self, engine: &mut Engine) {
        engine.destroy_entity(self.entity);
        engine.discard_entity(self.entity);
        for buffer in self.index_buffers {
            engine.destroy_index_buffer(buffer);
        }
        engine.destroy_vertex_buffer(self.vertex_buffer);
        engine.destroy_shader(self.shader);
    }
}

/// Builder shared by every shape
#[derive(Debug, Clone)]
pub struct DrawableBuilder<S> {
    pub(crate) shape: S,
    shading_model: ShadingModel,
    material: PhongMaterial,
    unlit_texture: Option<TextureHandle>,
    textured_material: Option<TexturedMaterial>,
    transform: Option<Mat4>,
}

impl<S: Shape> DrawableBuilder<S> {
    /// Start a builder for a shape; unlit with the default phong material
    pub fn new(shape: S) -> Self {
        Self {
            shape,
            shading_model: ShadingModel::Unlit,
            material: PhongMaterial::default(),
            unlit_texture: None,
            textured_material: None,
            transform: None,
        }
    }

    /// Lighting model
    #[must_use]
    pub fn shading_model(mut self, model: ShadingModel) -> Self {
        self.shading_model = model;
        self
    }

    /// Replace the whole phong material
    #[must_use]
    pub fn phong_material(mut self, material: PhongMaterial) -> Self {
        self.material = material;
        self
    }

    /// Phong ambient reflectance
    #[must_use]
    pub fn phong_ambient(mut self, r: f32, g: f32, b: f32) -> Self {
        self.material.ambient = [r, g, b];
        self
    }

    /// Phong diffuse reflectance
    #[must_use]
    pub fn phong_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.material.diffuse = [r, g, b];
        self
    }

    /// Phong specular reflectance
    #[must_use]
    pub fn phong_specular(mut self, r: f32, g: f32, b: f32) -> Self {
        self.material.specular = [r, g, b];
        self
    }

    /// Phong specular exponent
    #[must_use]
    pub fn phong_shininess(mut self, shininess: f32) -> Self {
        self.material.shininess = shininess;
        self
    }

    /// Texture sampled by an unlit program instead of the vertex colors
    #[must_use]
    pub fn unlit_texture(mut self, texture: TextureHandle) -> Self {
        self.unlit_texture = Some(texture);
        self
    }

    /// Diffuse and specular maps sampled by a phong program
    #[must_use]
    pub fn textured_material(mut self, diffuse: TextureHandle, specular: TextureHandle, shininess: f32) -> Self {
        self.textured_material = Some(TexturedMaterial { diffuse, specular, shininess });
        self
    }

    /// Initial model matrix of the entity
    #[must_use]
    pub fn transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Upload the mesh, build the shader and create the renderable entity
    pub fn build(mut self, engine: &mut Engine) -> EngineResult<Drawable> {
        if self.shape.unlit_only() && self.shading_model == ShadingModel::Phong {
            log::warn!("Phong shading unavailable for this shape, drawing it unlit");
            self.shading_model = ShadingModel::Unlit;
        }
        let mesh = self.shape.mesh();
        mesh.validate()?;
        let vertex_count = mesh.vertex_count();

        let vertex_buffer = VertexBufferBuilder::new(4)
            .vertex_count(vertex_count as u32)
            .attribute(POSITION_BUFFER, VertexAttribute::Position, AttributeType::Float3, 0, 12)
            .attribute(NORMAL_BUFFER, VertexAttribute::Normal, AttributeType::Float3, 0, 12)
            .attribute(COLOR_BUFFER, VertexAttribute::Color, AttributeType::Float4, 0, 16)
            .attribute(UV_BUFFER, VertexAttribute::Uv0, AttributeType::Float2, 0, 8)
            .build(engine)?;
        engine.set_buffer_at(vertex_buffer, POSITION_BUFFER, &mesh.positions)?;
        engine.set_buffer_at(vertex_buffer, NORMAL_BUFFER, &or_zeros(&mesh.normals, vertex_count))?;
        engine.set_buffer_at(vertex_buffer, COLOR_BUFFER, &or_zeros(&mesh.colors, vertex_count))?;
        engine.set_buffer_at(vertex_buffer, UV_BUFFER, &or_zeros(&mesh.uvs, vertex_count))?;

        let mut index_buffers = Vec::with_capacity(mesh.parts.len());
        for part in &mesh.parts {
            let buffer = IndexBufferBuilder::new()
                .index_count(part.indices.len() as u32)
                .index_type(IndexType::U32)
                .build(engine)?;
            engine.set_index_buffer(buffer, &part.indices)?;
            index_buffers.push(buffer);
        }

        let shader = ShaderBuilder::new(self.shading_model).build(engine)?;
        self.configure_shader(engine, shader)?;

        let entity = engine.create_entity();
        let mut renderable = RenderableBuilder::new(mesh.parts.len());
        for (index, (part, buffer)) in mesh.parts.iter().zip(&index_buffers).enumerate() {
            renderable = renderable.shader(index, shader).geometry(
                index,
                part.topology,
                vertex_buffer,
                *buffer,
                part.indices.len() as u32,
                0,
            );
        }
        renderable.build(engine, entity)?;
        if let Some(transform) = self.transform {
            engine.world_mut().transforms.set_transform(entity, transform);
        }

        log::debug!(
            "Built {:?} drawable {entity}: {vertex_count} vertices, {} elements",
            self.shading_model,
            mesh.parts.len()
        );
        Ok(Drawable { entity, shader, vertex_buffer, index_buffers })
    }

    fn configure_shader(&self, engine: &mut Engine, shader: ShaderHandle) -> EngineResult<()> {
        match self.shading_model {
            ShadingModel::Unlit => {
                if self.textured_material.is_some() {
                    log::warn!("Textured material ignored by an unlit drawable");
                }
                if let Some(texture) = self.unlit_texture {
                    engine.set_shader_texture(shader, uniform::UNLIT_TEXTURE, texture)?;
                }
            }
            ShadingModel::Phong => {
                if self.unlit_texture.is_some() {
                    log::warn!("Unlit texture ignored by a phong drawable");
                }
                let material = &self.material;
                engine.set_shader_uniform(shader, uniform::MATERIAL_AMBIENT, UniformValue::Vec3(material.ambient))?;
                engine.set_shader_uniform(shader, uniform::MATERIAL_DIFFUSE, UniformValue::Vec3(material.diffuse))?;
                engine.set_shader_uniform(shader, uniform::MATERIAL_SPECULAR, UniformValue::Vec3(material.specular))?;
                engine.set_shader_uniform(shader, uniform::MATERIAL_SHININESS, UniformValue::Float(material.shininess))?;
                if let Some(textured) = self.textured_material {
                    engine.set_shader_texture(shader, uniform::TEXTURED_MATERIAL_DIFFUSE, textured.diffuse)?;
                    engine.set_shader_texture(shader, uniform::TEXTURED_MATERIAL_SPECULAR, textured.specular)?;
                    engine.set_shader_uniform(
                        shader,
                        uniform::TEXTURED_MATERIAL_SHININESS,
                        UniformValue::Float(textured.shininess),
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn or_zeros<T: Copy + Default>(values: &[T], count: usize) -> Vec<T> {
    if values.is_empty() {
        vec![T::default(); count]
    } else {
        values.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;
    use crate::render::resources::TextureBuilder;

    struct Triangle;

    impl Shape for Triangle {
        fn mesh(&self) -> MeshData {
            MeshData {
                positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                colors: vec![[1.0, 0.0, 0.0, 1.0]; 3],
                parts: vec![MeshPart { topology: PrimitiveType::Triangles, indices: vec![0, 1, 2] }],
                ..MeshData::default()
            }
        }
    }

    struct Broken;

    impl Shape for Broken {
        fn mesh(&self) -> MeshData {
            MeshData {
                positions: vec![[0.0; 3]; 2],
                parts: vec![MeshPart { topology: PrimitiveType::Triangles, indices: vec![0, 1, 2] }],
                ..MeshData::default()
            }
        }
    }

    #[test]
    fn test_build_uploads_mesh_and_tags_entity() {
        let mut engine = Engine::headless();
        let drawable = DrawableBuilder::new(Triangle).build(&mut engine).unwrap();

        assert!(engine.world().renderables.has_component(drawable.entity()));
        let normals = engine.read_buffer_at(drawable.vertex_buffer(), NORMAL_BUFFER).unwrap();
        assert_eq!(normals, vec![0; 36]);
        let colors = engine.read_buffer_at(drawable.vertex_buffer(), COLOR_BUFFER).unwrap();
        assert_eq!(colors.len(), 48);
        assert_eq!(drawable.index_buffers().len(), 1);
    }

    #[test]
    fn test_phong_material_uniforms() {
        let mut engine = Engine::headless();
        let drawable = DrawableBuilder::new(Triangle)
            .shading_model(ShadingModel::Phong)
            .phong_material(material::JADE)
            .phong_shininess(4.0)
            .build(&mut engine)
            .unwrap();

        let program = engine.shader(drawable.shader()).unwrap().program();
        let device = engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap();
        assert_eq!(
            device.uniform(program, uniform::MATERIAL_DIFFUSE),
            Some(UniformValue::Vec3(material::JADE.diffuse))
        );
        assert_eq!(device.uniform(program, uniform::MATERIAL_SHININESS), Some(UniformValue::Float(4.0)));
    }

    #[test]
    fn test_textured_material_registers_both_maps() {
        let mut engine = Engine::headless();
        let diffuse = TextureBuilder::new().width(2).height(2).build(&mut engine).unwrap();
        let specular = TextureBuilder::new().width(2).height(2).build(&mut engine).unwrap();
        let drawable = DrawableBuilder::new(Triangle)
            .shading_model(ShadingModel::Phong)
            .textured_material(diffuse, specular, 16.0)
            .build(&mut engine)
            .unwrap();

        let shader = engine.shader(drawable.shader()).unwrap();
        let bound: Vec<_> = shader.texture_bindings().iter().map(|(_, texture)| *texture).collect();
        assert_eq!(bound, vec![diffuse, specular]);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut engine = Engine::headless();
        let result = DrawableBuilder::new(Broken).build(&mut engine);
        assert!(matches!(result, Err(EngineError::InvalidBuilder(_))));
        assert!(engine.world().entities.is_empty());
    }

    #[test]
    fn test_every_shape_builds_one_index_buffer_per_element() {
        let mut engine = Engine::headless();
        let drawables = [
            (Cone::builder().segments(16).build(&mut engine).unwrap(), 2),
            (Cylinder::builder().build(&mut engine).unwrap(), 3),
            (Pyramid::builder().build(&mut engine).unwrap(), 2),
            (Tetrahedron::builder().shading_model(ShadingModel::Phong).build(&mut engine).unwrap(), 1),
            (Ring::builder().build(&mut engine).unwrap(), 1),
            (Surface::builder(|x, y| (x * x - y * y) * 0.5).segments(8).build(&mut engine).unwrap(), 8),
            (Orbit::ellipse(2.0, 1.0).segments(64).build(&mut engine).unwrap(), 1),
        ];

        for (drawable, elements) in &drawables {
            assert_eq!(drawable.index_buffers().len(), *elements);
            let mesh = engine.world().renderables.mesh(drawable.entity()).unwrap();
            assert_eq!(mesh.iter().count(), *elements);
        }
    }

    #[test]
    fn test_line_shapes_are_drawn_unlit() {
        let mut engine = Engine::headless();
        let orbit = Orbit::ellipse(2.0, 1.0)
            .shading_model(ShadingModel::Phong)
            .build(&mut engine)
            .unwrap();

        assert_eq!(engine.shader(orbit.shader()).unwrap().model(), ShadingModel::Unlit);
        let mesh = engine.world().renderables.mesh(orbit.entity()).unwrap();
        assert_eq!(mesh.iter().count(), 1);
    }

    #[test]
    fn test_destroy_releases_gpu_objects() {
        let mut engine = Engine::headless();
        let drawable = DrawableBuilder::new(Triangle).build(&mut engine).unwrap();
        let entity = drawable.entity();
        drawable.destroy(&mut engine);

        assert!(!engine.world().entities.is_alive(entity));
        let device = engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap();
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
        assert_eq!(device.live_programs(), 0);
    }
}
