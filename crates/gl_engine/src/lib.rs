//! # GL Engine
//!
//! A small forward-rendering engine on top of OpenGL.
//!
//! ## Features
//!
//! - **Forward Rendering**: one pass per view with unlit and Blinn-Phong shading
//! - **Lighting**: one directional and up to eight point lights per frame
//! - **Lightweight ECS**: entities with renderable, light and transform stores
//! - **Orbit Camera**: drag and scroll controls around the origin
//! - **Headless Device**: every rendering path runs in tests without a GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     gl_engine::foundation::logging::init();
//!     let config = EngineConfig::default();
//!
//!     let mut context = Context::new(&config.window)?;
//!     let device = context.create_device();
//!     let mut engine = Engine::create(Box::new(device), config)?;
//!
//!     let cube = Cube::builder()
//!         .shading_model(ShadingModel::Phong)
//!         .phong_material(material::EMERALD)
//!         .build(&mut engine)?;
//!     let lamp = engine.create_entity();
//!     LightBuilder::new(LightType::Directional).build(engine.world_mut(), lamp);
//!
//!     let scene = engine.create_scene();
//!     engine.add_to_scene(scene, cube.entity())?;
//!     engine.add_to_scene(scene, lamp)?;
//!
//!     let camera = engine.create_entity();
//!     engine.create_camera(camera);
//!     let view = engine.create_view();
//!     if let Some(view) = engine.view_mut(view) {
//!         let (width, height) = context.framebuffer_size();
//!         view.set_viewport([0, 0, width, height]);
//!         view.set_scene(Some(scene));
//!         view.set_camera(Some(camera));
//!     }
//!     let renderer = engine.create_renderer();
//!
//!     while !context.should_close() {
//!         context.poll();
//!         engine.render(renderer, view)?;
//!         context.swap_buffers();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod ecs;
pub mod render;
pub mod assets;
pub mod drawable;

mod engine;

pub use engine::{Engine, EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError, EngineResult,
        assets::{load_texture, MediaExporter},
        core::config::{AssetConfig, Config, EngineConfig, RendererConfig, WindowConfig},
        drawable::{
            material, Cone, Cube, Cylinder, Drawable, Geodesic, Orbit, Plane, Pyramid, Ring, Sphere, Surface,
            Tetrahedron,
        },
        ecs::{
            components::{LightBuilder, LightDistance, LightType, RenderableBuilder},
            Entity, World,
        },
        foundation::math::{Mat4, Mat4Ext, Vec3},
        render::{
            resources::{ShaderBuilder, ShadingModel, TextureBuilder},
            Camera, ClearOptions, Context, FrameInput, Key, SkyboxBuilder,
        },
    };
}
