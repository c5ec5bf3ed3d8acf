//! View: what to draw, from where, into which rectangle

use crate::ecs::Entity;
use crate::foundation::collections::{SceneHandle, SkyboxHandle};

/// Viewport rectangle: x, y, width, height in framebuffer pixels
pub type Viewport = [i32; 4];

/// Binding of a scene, a camera and an optional skybox to a viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct View {
    viewport: Viewport,
    camera: Option<Entity>,
    scene: Option<SceneHandle>,
    skybox: Option<SkyboxHandle>,
}

impl View {
    /// Create an unbound view with an empty viewport
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport rectangle
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the viewport rectangle
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Entity of the bound camera
    pub const fn camera(&self) -> Option<Entity> {
        self.camera
    }

    /// Bind the camera of an entity
    pub fn set_camera(&mut self, camera: Option<Entity>) {
        self.camera = camera;
    }

    /// Bound scene
    pub const fn scene(&self) -> Option<SceneHandle> {
        self.scene
    }

    /// Bind a scene
    pub fn set_scene(&mut self, scene: Option<SceneHandle>) {
        self.scene = scene;
    }

    /// Bound skybox
    pub const fn skybox(&self) -> Option<SkyboxHandle> {
        self.skybox
    }

    /// Bind a skybox
    pub fn set_skybox(&mut self, skybox: Option<SkyboxHandle>) {
        self.skybox = skybox;
    }
}
