//! Core engine implementation
//!
//! The [`Engine`] owns the graphics device, the [`World`] and every
//! GPU-backed object. Objects are created through builders or `create_*`
//! calls and referred to by generation-checked handles; destroying a handle
//! releases the GPU object, and any later lookup through that handle fails
//! instead of reaching freed state.
//!
//! Entity teardown is a two-step protocol:
//!
//! 1. [`Engine::destroy_entity`] removes the entity's component record and
//!    transform but keeps the id alive;
//! 2. [`Engine::discard_entity`] releases the id itself.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::ecs::{ComponentKind, Entity, World};
use crate::foundation::collections::{
    IndexBufferHandle, RendererHandle, SceneHandle, ShaderHandle, SkyboxHandle, SlotMap,
    TextureHandle, VertexBufferHandle, ViewHandle,
};
use crate::render::api::{
    Capability, DeviceError, GpuVertexArray, GraphicsDevice, IndexType, UniformValue,
    VertexArrayDescriptor, VertexAttributeBinding,
};
use crate::render::backends::HeadlessDevice;
use crate::render::camera::Camera;
use crate::render::renderer::{RenderContext, RenderError, Renderer};
use crate::render::resources::{
    IndexBuffer, IndexElement, PixelBufferDescriptor, Shader, ShaderError, Texture, VertexBuffer,
};
use crate::render::scene::Scene;
use crate::render::skybox::Skybox;
use crate::render::view::View;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A handle refers to an object that was destroyed
    #[error("Stale {0} handle")]
    StaleHandle(&'static str),

    /// A builder was used inconsistently
    #[error("Invalid builder: {0}")]
    InvalidBuilder(String),

    /// Uploaded data does not match the declared size
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Declared size
        expected: usize,
        /// Supplied size
        actual: usize,
    },

    /// The configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Device failure
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Shader loading failure
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),

    /// Rendering failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Root owner and factory of every GPU-backed object
pub struct Engine {
    device: Box<dyn GraphicsDevice>,
    config: EngineConfig,
    world: World,
    renderers: SlotMap<RendererHandle, Renderer>,
    views: SlotMap<ViewHandle, View>,
    scenes: SlotMap<SceneHandle, Scene>,
    skyboxes: SlotMap<SkyboxHandle, Skybox>,
    vertex_buffers: SlotMap<VertexBufferHandle, VertexBuffer>,
    index_buffers: SlotMap<IndexBufferHandle, IndexBuffer>,
    shaders: SlotMap<ShaderHandle, Shader>,
    textures: SlotMap<TextureHandle, Texture>,
    cameras: HashMap<Entity, Camera>,
}

impl Engine {
    /// Create an engine on a device
    ///
    /// Enables depth testing, and multisampling when configured.
    pub fn create(device: Box<dyn GraphicsDevice>, config: EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self::with_device(device, config))
    }

    /// Engine on a [`HeadlessDevice`] with default configuration
    pub fn headless() -> Self {
        Self::with_device(Box::new(HeadlessDevice::new()), EngineConfig::default())
    }

    fn with_device(mut device: Box<dyn GraphicsDevice>, config: EngineConfig) -> Self {
        log::info!("Initializing engine on {} device", device.name());
        device.enable(Capability::DepthTest);
        if config.renderer.multisample {
            device.enable(Capability::Multisample);
        }
        Self {
            device,
            config,
            world: World::new(),
            renderers: SlotMap::with_key(),
            views: SlotMap::with_key(),
            scenes: SlotMap::with_key(),
            skyboxes: SlotMap::with_key(),
            vertex_buffers: SlotMap::with_key(),
            index_buffers: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            cameras: HashMap::new(),
        }
    }

    /// Graphics device
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    /// Mutable graphics device
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Entity and component stores
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable entity and component stores
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Configuration the engine was created with
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // Entities

    /// Allocate a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.world.entities.create()
    }

    /// Remove the entity's component record and transform
    ///
    /// The record removed is the one matching the entity's current kind; a
    /// renderable's vertex arrays are deleted on the device. The id stays
    /// alive until [`discard_entity`](Self::discard_entity) is called.
    pub fn destroy_entity(&mut self, entity: Entity) {
        match self.world.entities.kind(entity) {
            Some(ComponentKind::Renderable) => {
                if let Some(mesh) = self.world.renderables.remove(entity) {
                    for element in &mesh.elements {
                        self.device.delete_vertex_array(element.vertex_array);
                    }
                }
            }
            Some(ComponentKind::Light) => {
                self.world.lights.remove(entity);
            }
            Some(ComponentKind::None) | None => {
                log::trace!("destroy_entity: {entity} holds no component");
            }
        }
        self.world.entities.set_kind(entity, ComponentKind::None);
        self.world.transforms.remove(entity);
    }

    /// Release the entity id; call after [`destroy_entity`](Self::destroy_entity)
    pub fn discard_entity(&mut self, entity: Entity) {
        self.world.entities.discard(entity);
    }

    // Renderers

    /// Create a renderer configured from the engine configuration
    pub fn create_renderer(&mut self) -> RendererHandle {
        self.renderers.insert(Renderer::new(&self.config.renderer))
    }

    /// Renderer behind a handle
    pub fn renderer(&self, handle: RendererHandle) -> Option<&Renderer> {
        self.renderers.get(handle)
    }

    /// Mutable renderer behind a handle
    pub fn renderer_mut(&mut self, handle: RendererHandle) -> Option<&mut Renderer> {
        self.renderers.get_mut(handle)
    }

    /// Destroy a renderer
    pub fn destroy_renderer(&mut self, handle: RendererHandle) {
        self.renderers.remove(handle);
    }

    // Views

    /// Create an unbound view
    pub fn create_view(&mut self) -> ViewHandle {
        self.views.insert(View::new())
    }

    /// View behind a handle
    pub fn view(&self, handle: ViewHandle) -> Option<&View> {
        self.views.get(handle)
    }

    /// Mutable view behind a handle
    pub fn view_mut(&mut self, handle: ViewHandle) -> Option<&mut View> {
        self.views.get_mut(handle)
    }

    /// Destroy a view
    pub fn destroy_view(&mut self, handle: ViewHandle) {
        self.views.remove(handle);
    }

    // Scenes

    /// Create an empty scene
    pub fn create_scene(&mut self) -> SceneHandle {
        self.scenes.insert(Scene::new())
    }

    /// Scene behind a handle
    pub fn scene(&self, handle: SceneHandle) -> Option<&Scene> {
        self.scenes.get(handle)
    }

    /// Mutable scene behind a handle
    pub fn scene_mut(&mut self, handle: SceneHandle) -> Option<&mut Scene> {
        self.scenes.get_mut(handle)
    }

    /// Add an entity to a scene according to its current kind
    pub fn add_to_scene(&mut self, scene: SceneHandle, entity: Entity) -> EngineResult<()> {
        let target = self.scenes.get_mut(scene).ok_or(EngineError::StaleHandle("scene"))?;
        target.add_entity(&self.world.entities, entity);
        Ok(())
    }

    /// Remove an entity from a scene
    pub fn remove_from_scene(&mut self, scene: SceneHandle, entity: Entity) -> EngineResult<()> {
        let target = self.scenes.get_mut(scene).ok_or(EngineError::StaleHandle("scene"))?;
        target.remove_entity(entity);
        Ok(())
    }

    /// Destroy a scene
    pub fn destroy_scene(&mut self, handle: SceneHandle) {
        self.scenes.remove(handle);
    }

    // Skyboxes

    pub(crate) fn insert_skybox(&mut self, skybox: Skybox) -> SkyboxHandle {
        self.skyboxes.insert(skybox)
    }

    /// Skybox behind a handle
    pub fn skybox(&self, handle: SkyboxHandle) -> Option<&Skybox> {
        self.skyboxes.get(handle)
    }

    /// Destroy a skybox
    pub fn destroy_skybox(&mut self, handle: SkyboxHandle) {
        self.skyboxes.remove(handle);
    }

    // Vertex buffers

    pub(crate) fn insert_vertex_buffer(&mut self, buffer: VertexBuffer) -> VertexBufferHandle {
        log::debug!("Registered vertex buffer with {} sub-buffers", buffer.buffer_count());
        self.vertex_buffers.insert(buffer)
    }

    /// Vertex buffer behind a handle
    pub fn vertex_buffer(&self, handle: VertexBufferHandle) -> Option<&VertexBuffer> {
        self.vertex_buffers.get(handle)
    }

    /// Upload the whole contents of sub-buffer `index`
    pub fn set_buffer_at<T: bytemuck::Pod>(
        &mut self,
        handle: VertexBufferHandle,
        index: usize,
        data: &[T],
    ) -> EngineResult<()> {
        let buffer = self.vertex_buffers.get(handle).ok_or(EngineError::StaleHandle("vertex buffer"))?;
        buffer.set_buffer_at(self.device.as_mut(), index, bytemuck::cast_slice(data))
    }

    /// Read back the whole contents of sub-buffer `index`
    pub fn read_buffer_at(&mut self, handle: VertexBufferHandle, index: usize) -> EngineResult<Vec<u8>> {
        let buffer = self.vertex_buffers.get(handle).ok_or(EngineError::StaleHandle("vertex buffer"))?;
        buffer.read_buffer_at(self.device.as_mut(), index)
    }

    /// Destroy a vertex buffer and its GPU buffers
    pub fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if let Some(buffer) = self.vertex_buffers.remove(handle) {
            buffer.release(self.device.as_mut());
        }
    }

    // Index buffers

    pub(crate) fn insert_index_buffer(&mut self, buffer: IndexBuffer) -> IndexBufferHandle {
        log::debug!("Registered index buffer of {} {:?} indices", buffer.index_count(), buffer.index_type());
        self.index_buffers.insert(buffer)
    }

    /// Index buffer behind a handle
    pub fn index_buffer(&self, handle: IndexBufferHandle) -> Option<&IndexBuffer> {
        self.index_buffers.get(handle)
    }

    /// Upload every index
    pub fn set_index_buffer<T: IndexElement>(&mut self, handle: IndexBufferHandle, indices: &[T]) -> EngineResult<()> {
        let buffer = self.index_buffers.get(handle).ok_or(EngineError::StaleHandle("index buffer"))?;
        buffer.set_buffer(self.device.as_mut(), indices)
    }

    /// Destroy an index buffer
    pub fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        if let Some(buffer) = self.index_buffers.remove(handle) {
            buffer.release(self.device.as_mut());
        }
    }

    // Shaders

    pub(crate) fn insert_shader(&mut self, shader: Shader) -> ShaderHandle {
        self.shaders.insert(shader)
    }

    /// Shader behind a handle
    pub fn shader(&self, handle: ShaderHandle) -> Option<&Shader> {
        self.shaders.get(handle)
    }

    /// Whether the handle names a live shader
    pub fn has_shader(&self, handle: ShaderHandle) -> bool {
        self.shaders.contains_key(handle)
    }

    /// Set a named uniform on a shader
    pub fn set_shader_uniform(&mut self, handle: ShaderHandle, name: &str, value: UniformValue) -> EngineResult<()> {
        let shader = self.shaders.get(handle).ok_or(EngineError::StaleHandle("shader"))?;
        shader.set_uniform(self.device.as_mut(), name, value);
        Ok(())
    }

    /// Register a texture on a shader under sampler `name`
    ///
    /// The texture is bound to the next free unit every time the shader draws.
    pub fn set_shader_texture(&mut self, handle: ShaderHandle, name: &str, texture: TextureHandle) -> EngineResult<()> {
        let target = self.textures.get(texture).ok_or(EngineError::StaleHandle("texture"))?.target();
        let shader = self.shaders.get_mut(handle).ok_or(EngineError::StaleHandle("shader"))?;
        shader.add_texture(self.device.as_mut(), name, target, texture);
        Ok(())
    }

    /// Destroy a shader and its GPU program
    pub fn destroy_shader(&mut self, handle: ShaderHandle) {
        if let Some(shader) = self.shaders.remove(handle) {
            shader.release(self.device.as_mut());
            log::debug!("Destroyed {:?} shader", shader.model());
        }
    }

    // Textures

    pub(crate) fn insert_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    /// Texture behind a handle
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Upload one mip level
    pub fn set_texture_image(
        &mut self,
        handle: TextureHandle,
        level: u32,
        pixels: &PixelBufferDescriptor<'_>,
    ) -> EngineResult<()> {
        let texture = self.textures.get(handle).ok_or(EngineError::StaleHandle("texture"))?;
        texture.set_image(self.device.as_mut(), level, pixels)
    }

    /// Generate the mip chain from level 0
    pub fn generate_mipmaps(&mut self, handle: TextureHandle) -> EngineResult<()> {
        let texture = self.textures.get(handle).ok_or(EngineError::StaleHandle("texture"))?;
        texture.generate_mipmaps(self.device.as_mut());
        Ok(())
    }

    /// Destroy a texture
    pub fn destroy_texture(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.textures.remove(handle) {
            texture.release(self.device.as_mut());
        }
    }

    // Cameras

    /// Attach a fresh camera to an entity, replacing any existing one
    pub fn create_camera(&mut self, entity: Entity) -> &mut Camera {
        let camera = Camera::new(entity);
        match self.cameras.entry(entity) {
            Entry::Occupied(mut slot) => {
                slot.insert(camera);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(camera),
        }
    }

    /// Camera of an entity
    pub fn camera(&self, entity: Entity) -> Option<&Camera> {
        self.cameras.get(&entity)
    }

    /// Mutable camera of an entity
    pub fn camera_mut(&mut self, entity: Entity) -> Option<&mut Camera> {
        self.cameras.get_mut(&entity)
    }

    /// Detach the camera of an entity
    pub fn destroy_camera(&mut self, entity: Entity) {
        self.cameras.remove(&entity);
    }

    // Rendering

    /// Draw a view with a renderer
    pub fn render(&mut self, renderer: RendererHandle, view: ViewHandle) -> EngineResult<()> {
        let renderer = self.renderers.get(renderer).ok_or(EngineError::StaleHandle("renderer"))?;
        let view = self.views.get(view).ok_or(EngineError::StaleHandle("view"))?;
        let context = RenderContext {
            world: &self.world,
            scenes: &self.scenes,
            cameras: &self.cameras,
            shaders: &self.shaders,
            textures: &self.textures,
        };
        renderer.render(self.device.as_mut(), view, &context)?;
        Ok(())
    }

    /// Switch a renderer between filled and wireframe rasterization
    pub fn toggle_polygon_mode(&mut self, renderer: RendererHandle) -> EngineResult<()> {
        let renderer = self.renderers.get_mut(renderer).ok_or(EngineError::StaleHandle("renderer"))?;
        renderer.toggle_polygon_mode(self.device.as_mut());
        Ok(())
    }

    /// Read RGBA8 framebuffer pixels, rows bottom-up
    pub fn read_framebuffer_rgba(&mut self, x: i32, y: i32, width: u32, height: u32, out: &mut [u8]) -> EngineResult<()> {
        Renderer::read_framebuffer_rgba(self.device.as_mut(), x, y, width, height, out)?;
        Ok(())
    }

    // Vertex arrays

    /// Wire every attribute of a vertex buffer and an index buffer into a new
    /// vertex array
    pub(crate) fn create_vertex_array(
        &mut self,
        vertices: VertexBufferHandle,
        indices: IndexBufferHandle,
    ) -> EngineResult<(GpuVertexArray, IndexType)> {
        let vertex_buffer = self
            .vertex_buffers
            .get(vertices)
            .ok_or(EngineError::StaleHandle("vertex buffer"))?;
        let index_buffer = self
            .index_buffers
            .get(indices)
            .ok_or(EngineError::StaleHandle("index buffer"))?;

        let mut attributes = Vec::new();
        for index in 0..vertex_buffer.buffer_count() {
            let (Some(buffer), Some(layout)) = (vertex_buffer.buffer(index), vertex_buffer.layout(index)) else {
                continue;
            };
            attributes.extend(layout.iter().map(|info| VertexAttributeBinding {
                location: info.attribute.location(),
                buffer,
                attribute_type: info.attribute_type,
                normalized: vertex_buffer.is_normalized(info.attribute),
                byte_offset: info.byte_offset,
                byte_stride: info.byte_stride,
            }));
        }

        let descriptor = VertexArrayDescriptor {
            attributes,
            index_buffer: index_buffer.buffer(),
        };
        let index_type = index_buffer.index_type();
        let vertex_array = self.device.create_vertex_array(&descriptor)?;
        Ok((vertex_array, index_type))
    }

    pub(crate) fn release_vertex_array(&mut self, vertex_array: GpuVertexArray) {
        self.device.delete_vertex_array(vertex_array);
    }

    // Teardown

    /// Release every remaining resource and start over with an empty world
    ///
    /// Calling it more than once is harmless.
    pub fn destroy(&mut self) {
        let device = self.device.as_mut();

        let mut vertex_arrays = 0;
        for (_, mesh) in self.world.renderables.drain() {
            for element in &mesh.elements {
                device.delete_vertex_array(element.vertex_array);
                vertex_arrays += 1;
            }
        }
        self.world.lights.clear();

        for (_, texture) in self.textures.drain() {
            texture.release(device);
        }
        self.renderers.clear();
        self.views.clear();
        self.scenes.clear();
        self.skyboxes.clear();
        for (_, buffer) in self.vertex_buffers.drain() {
            buffer.release(device);
        }
        for (_, buffer) in self.index_buffers.drain() {
            buffer.release(device);
        }
        for (_, shader) in self.shaders.drain() {
            shader.release(device);
        }
        self.cameras.clear();
        self.world.reset();

        log::debug!("Engine resources released ({vertex_arrays} vertex arrays)");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.destroy();
        log::info!("Engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RendererConfig;
    use crate::ecs::components::{LightBuilder, LightType};
    use crate::foundation::math::{Mat4, Mat4Ext};
    use crate::render::resources::{ShaderBuilder, ShadingModel, TextureBuilder};

    fn headless(engine: &Engine) -> &HeadlessDevice {
        engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap()
    }

    #[test]
    fn test_create_enables_depth_and_multisample() {
        let engine = Engine::headless();
        assert!(headless(&engine).is_enabled(Capability::DepthTest));
        assert!(headless(&engine).is_enabled(Capability::Multisample));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            renderer: RendererConfig { max_point_lights: 64, ..RendererConfig::default() },
            ..EngineConfig::default()
        };
        let result = Engine::create(Box::new(HeadlessDevice::new()), config);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_destroyed_handles_go_stale() {
        let mut engine = Engine::headless();
        let shader = ShaderBuilder::new(ShadingModel::Unlit).build(&mut engine).unwrap();
        let texture = TextureBuilder::new().width(4).height(4).build(&mut engine).unwrap();
        let scene = engine.create_scene();

        engine.destroy_shader(shader);
        engine.destroy_texture(texture);
        engine.destroy_scene(scene);
        engine.destroy_shader(shader);

        assert!(!engine.has_shader(shader));
        assert!(engine.texture(texture).is_none());
        assert!(matches!(
            engine.set_shader_uniform(shader, "model", UniformValue::Bool(true)),
            Err(EngineError::StaleHandle("shader"))
        ));
        let entity = engine.create_entity();
        assert!(matches!(engine.add_to_scene(scene, entity), Err(EngineError::StaleHandle("scene"))));
        assert_eq!(headless(&engine).live_programs(), 0);
        assert_eq!(headless(&engine).live_textures(), 0);
    }

    #[test]
    fn test_destroy_entity_drops_light_and_transform() {
        let mut engine = Engine::headless();
        let lamp = engine.create_entity();
        LightBuilder::new(LightType::Point).build(engine.world_mut(), lamp);
        engine.world_mut().transforms.set_transform(lamp, Mat4::translation(1.0, 2.0, 3.0));

        engine.destroy_entity(lamp);

        let world = engine.world();
        assert!(!world.lights.has_component(lamp));
        assert!(!world.transforms.has_transform(lamp));
        assert_eq!(world.entities.kind(lamp), Some(ComponentKind::None));
        assert!(world.entities.is_alive(lamp));

        engine.discard_entity(lamp);
        assert!(!engine.world().entities.is_alive(lamp));
    }

    #[test]
    fn test_create_camera_replaces_existing() {
        let mut engine = Engine::headless();
        let entity = engine.create_entity();
        engine.create_camera(entity).set_radius(10.0);
        engine.create_camera(entity);
        assert!((engine.camera(entity).unwrap().radius() - 4.0).abs() < f32::EPSILON);
        engine.destroy_camera(entity);
        assert!(engine.camera(entity).is_none());
    }

    #[test]
    fn test_destroy_releases_everything_and_is_repeatable() {
        let mut engine = Engine::headless();
        let shader = ShaderBuilder::new(ShadingModel::Phong).build(&mut engine).unwrap();
        TextureBuilder::new().width(2).height(2).build(&mut engine).unwrap();
        crate::drawable::Cube::builder()
            .shading_model(ShadingModel::Phong)
            .build(&mut engine)
            .unwrap();
        let lamp = engine.create_entity();
        LightBuilder::new(LightType::Directional).build(engine.world_mut(), lamp);
        engine.create_renderer();
        engine.create_view();
        engine.create_scene();
        engine.create_camera(lamp);

        engine.destroy();

        assert!(!engine.has_shader(shader));
        assert!(engine.world().entities.is_empty());
        assert!(engine.world().renderables.is_empty());
        assert!(engine.camera(lamp).is_none());
        let device = headless(&engine);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_textures(), 0);

        engine.destroy();
        assert!(engine.world().entities.is_empty());
    }
}
