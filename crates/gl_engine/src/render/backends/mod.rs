//! Backend implementations for the render module
//!
//! - `opengl`: the `glow` device used with a real GL context
//! - `headless`: a recording device for tests and offscreen tooling

pub mod headless;
pub mod opengl;

pub use headless::{DrawCall, HeadlessDevice, ProgramRecord, TextureRecord};
pub use opengl::OpenGlDevice;
