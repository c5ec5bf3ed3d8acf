//! Flat rectangle facing +Z, meant for textures

use super::color::{opaque, WHITE};
use super::{DrawableBuilder, MeshData, MeshPart, Shape};
use crate::ecs::components::PrimitiveType;

/// Rectangle centered on the origin in the XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    width: f32,
    height: f32,
    uv_repeat: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self { width: 2.0, height: 2.0, uv_repeat: 1.0 }
    }
}

impl Plane {
    /// Builder for a 2 x 2 plane with the texture shown once
    pub fn builder() -> DrawableBuilder<Self> {
        DrawableBuilder::new(Self::default())
    }
}

impl DrawableBuilder<Plane> {
    /// Extent along X and Y
    #[must_use]
    pub fn size(mut self, width: f32, height: f32) -> Self {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            self.shape.width = width;
            self.shape.height = height;
        } else {
            log::warn!("Ignoring plane size {width}x{height}");
        }
        self
    }

    /// How many times the texture tiles across each side
    #[must_use]
    pub fn uv_repeat(mut self, repeat: f32) -> Self {
        if repeat.is_finite() {
            self.shape.uv_repeat = repeat;
        }
        self
    }
}

impl Shape for Plane {
    fn mesh(&self) -> MeshData {
        let (x, y) = (self.width / 2.0, self.height / 2.0);
        let r = self.uv_repeat;
        MeshData {
            positions: vec![[-x, -y, 0.0], [x, -y, 0.0], [-x, y, 0.0], [x, y, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            colors: vec![opaque(WHITE); 4],
            uvs: vec![[0.0, 0.0], [r, 0.0], [0.0, r], [r, r]],
            parts: vec![MeshPart { topology: PrimitiveType::Triangles, indices: vec![0, 1, 2, 2, 1, 3] }],
        }
    }
}
