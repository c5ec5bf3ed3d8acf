//! ECS Components module
//!
//! Sparse component stores keyed by [`Entity`](crate::ecs::Entity), with the
//! builders that populate them.

pub mod lighting;
pub mod transform;
pub mod renderable;

pub use lighting::{
    Attenuation, DirectionalLight, LightBuilder, LightDistance, LightManager, LightType, PointLight,
};
pub use transform::TransformManager;
pub use renderable::{Element, PrimitiveType, RenderableBuilder, RenderableManager, RenderableMesh};
