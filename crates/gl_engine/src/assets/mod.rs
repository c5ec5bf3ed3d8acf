//! Asset loading and export
//!
//! Decoding images into engine textures, and writing framebuffer captures
//! back out as PNG files.

pub mod media_exporter;
pub mod texture_loader;

pub use media_exporter::{ExportError, ExportResult, MediaExporter, MediaExporterBuilder};
pub use texture_loader::{load_texture, ImageData, TextureError, TextureResult};
