//! Image decoding for textures
//!
//! Images are decoded with the `image` crate and flipped vertically, since
//! GL expects the bottom row first. The texture format follows the channel
//! count: one channel gives `R8`, three give `Rgb8`, anything else is
//! converted to `Rgba8`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::{Engine, EngineError};
use crate::foundation::collections::TextureHandle;
use crate::render::resources::{PixelBufferDescriptor, PixelFormat, TextureBuilder, TextureFormat};

/// Texture loading errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// The file could not be opened or decoded
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// File that was requested
        path: PathBuf,
        /// Decoder error
        source: image::ImageError,
    },

    /// Creating or filling the texture failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type for texture loading
pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded pixels, bottom row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Tightly packed pixel bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel: 1, 3 or 4
    pub channels: u8,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file(path: &Path) -> TextureResult<Self> {
        let image = image::open(path).map_err(|source| TextureError::Decode { path: path.to_path_buf(), source })?;
        Ok(Self::from_dynamic(image))
    }

    /// Decode an encoded image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        image::load_from_memory(bytes).map(Self::from_dynamic)
    }

    fn from_dynamic(image: image::DynamicImage) -> Self {
        let image = image.flipv();
        let (width, height) = (image.width(), image.height());
        let (data, channels) = match image.color().channel_count() {
            1 => (image.into_luma8().into_raw(), 1),
            3 => (image.into_rgb8().into_raw(), 3),
            _ => (image.into_rgba8().into_raw(), 4),
        };
        Self { data, width, height, channels }
    }

    /// Texture and pixel formats matching the channel count
    pub const fn formats(&self) -> (TextureFormat, PixelFormat) {
        match self.channels {
            1 => (TextureFormat::R8, PixelFormat::Red),
            3 => (TextureFormat::Rgb8, PixelFormat::Rgb),
            _ => (TextureFormat::Rgba8, PixelFormat::Rgba),
        }
    }

    /// Create a texture holding this image with a full mip chain
    pub fn upload(&self, engine: &mut Engine) -> TextureResult<TextureHandle> {
        let (format, pixel_format) = self.formats();
        let texture = TextureBuilder::new()
            .width(self.width)
            .height(self.height)
            .format(format)
            .build(engine)?;
        engine.set_texture_image(texture, 0, &PixelBufferDescriptor::new(&self.data, pixel_format))?;
        engine.generate_mipmaps(texture)?;
        Ok(texture)
    }
}

/// Load an image file into a new texture
///
/// Relative paths are looked up in the configured texture directory first,
/// then relative to the working directory.
pub fn load_texture(path: impl AsRef<Path>, engine: &mut Engine) -> TextureResult<TextureHandle> {
    let path = resolve(path.as_ref(), &engine.config().assets.texture_dir);
    let image = ImageData::from_file(&path).map_err(|error| {
        log::error!("Could not load texture: {error}");
        error
    })?;
    let texture = image.upload(engine)?;
    log::debug!("Loaded {}x{} texture from {}", image.width, image.height, path.display());
    Ok(texture)
}

fn resolve(path: &Path, texture_dir: &str) -> PathBuf {
    if path.is_relative() {
        let candidate = Path::new(texture_dir).join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gl_engine_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_flips_rows_and_keeps_rgb() {
        let dir = scratch_dir("texture_loader");
        let path = dir.join("stripes.png");
        // top row red, bottom row blue
        let image = image::RgbImage::from_raw(1, 2, vec![255, 0, 0, 0, 0, 255]).unwrap();
        image.save(&path).unwrap();

        let mut engine = Engine::headless();
        let handle = load_texture(&path, &mut engine).unwrap();
        let texture = *engine.texture(handle).unwrap();
        assert_eq!(texture.format(), TextureFormat::Rgb8);
        assert_eq!((texture.width(), texture.height()), (1, 2));

        let device = engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap();
        let record = device.texture(texture.texture()).unwrap();
        assert_eq!(record.levels.get(&0).map(Vec::as_slice), Some(&[0, 0, 255, 255, 0, 0][..]));
        assert!(record.mipmaps_generated);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_channel_count_selects_format() {
        let gray = ImageData { data: vec![0], width: 1, height: 1, channels: 1 };
        assert_eq!(gray.formats(), (TextureFormat::R8, PixelFormat::Red));
        let rgba = ImageData { data: vec![0; 4], width: 1, height: 1, channels: 4 };
        assert_eq!(rgba.formats(), (TextureFormat::Rgba8, PixelFormat::Rgba));
    }

    #[test]
    fn test_missing_file_is_a_decode_error() {
        let mut engine = Engine::headless();
        let result = load_texture("/nonexistent/gl_engine/missing.png", &mut engine);
        assert!(matches!(result, Err(TextureError::Decode { .. })));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(ImageData::from_bytes(b"not an image").is_err());
    }
}
