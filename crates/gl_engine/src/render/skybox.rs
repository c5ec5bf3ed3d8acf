//! Solid-color skybox

use crate::engine::Engine;
use crate::foundation::collections::SkyboxHandle;

/// Solid background color attached to a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skybox {
    color: [f32; 4],
}

impl Skybox {
    /// RGBA color
    pub const fn color(&self) -> [f32; 4] {
        self.color
    }
}

/// Builder for [`Skybox`]
#[derive(Debug, Clone, Copy)]
pub struct SkyboxBuilder {
    color: [f32; 4],
}

impl Default for SkyboxBuilder {
    fn default() -> Self {
        Self { color: [0.0, 0.0, 0.0, 1.0] }
    }
}

impl SkyboxBuilder {
    /// Start an opaque black skybox
    pub fn new() -> Self {
        Self::default()
    }

    /// RGBA color
    #[must_use]
    pub const fn color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.color = [r, g, b, a];
        self
    }

    /// Register the skybox with the engine
    pub fn build(self, engine: &mut Engine) -> SkyboxHandle {
        engine.insert_skybox(Skybox { color: self.color })
    }
}
