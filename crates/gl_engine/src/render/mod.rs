//! # Rendering System
//!
//! Forward rendering on top of the [`GraphicsDevice`](api::GraphicsDevice)
//! abstraction.
//!
//! ## Architecture
//!
//! - **Api**: the device trait and the plain-data types crossing it
//! - **Backends**: the `glow` device for a live GL context and a headless
//!   recording device for tests
//! - **Resources**: vertex and index buffers, shaders and textures
//! - **Renderer**: draws a [`View`] (viewport, camera, scene, skybox) in one
//!   forward pass
//! - **Window**: the GLFW context that owns the GL window and input events

pub mod api;
pub mod backends;
pub mod camera;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod skybox;
pub mod view;
pub mod window;


pub use camera::Camera;
pub use renderer::{ClearOptions, RenderContext, RenderError, RenderResult, Renderer};
pub use scene::Scene;
pub use skybox::{Skybox, SkyboxBuilder};
pub use view::{View, Viewport};
pub use window::{Context, FrameInput, Key, WindowError, WindowResult};
