//! Textures

use crate::engine::{Engine, EngineError, EngineResult};
use crate::foundation::collections::TextureHandle;
use crate::render::api::{GpuTexture, GraphicsDevice, TextureDescriptor};

pub use crate::render::api::{PixelFormat, PixelType, TextureFormat, TextureTarget};

/// Client-side pixel data for one mip level
#[derive(Debug, Clone, Copy)]
pub struct PixelBufferDescriptor<'a> {
    /// Tightly packed rows, bottom row first
    pub data: &'a [u8],
    /// Channel layout of `data`
    pub format: PixelFormat,
    /// Component type of `data`
    pub pixel_type: PixelType,
}

impl<'a> PixelBufferDescriptor<'a> {
    /// Describe 8-bit pixel data
    pub const fn new(data: &'a [u8], format: PixelFormat) -> Self {
        Self { data, format, pixel_type: PixelType::UnsignedByte }
    }

    /// Override the component type
    #[must_use]
    pub const fn pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }
}

/// Engine-owned texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    texture: GpuTexture,
    target: TextureTarget,
    format: TextureFormat,
    width: u32,
    height: u32,
    levels: u32,
}

impl Texture {
    /// GPU texture
    pub const fn texture(&self) -> GpuTexture {
        self.texture
    }

    /// Binding target
    pub const fn target(&self) -> TextureTarget {
        self.target
    }

    /// Internal format
    pub const fn format(&self) -> TextureFormat {
        self.format
    }

    /// Width of level 0
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of level 0
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of allocated mip levels
    pub const fn levels(&self) -> u32 {
        self.levels
    }

    /// Size of mip level `level`
    pub fn level_size(&self, level: u32) -> Option<(u32, u32)> {
        (level < self.levels).then(|| ((self.width >> level).max(1), (self.height >> level).max(1)))
    }

    pub(crate) fn set_image(
        &self,
        device: &mut dyn GraphicsDevice,
        level: u32,
        pixels: &PixelBufferDescriptor<'_>,
    ) -> EngineResult<()> {
        let (width, height) = self.level_size(level).ok_or_else(|| {
            EngineError::InvalidBuilder(format!("texture has {} levels, level {level} requested", self.levels))
        })?;
        let expected = width as usize * height as usize * pixels.format.channels() * pixels.pixel_type.byte_size();
        if pixels.data.len() != expected {
            return Err(EngineError::SizeMismatch { expected, actual: pixels.data.len() });
        }
        device.upload_texture_image(
            self.texture,
            self.target,
            level,
            (width, height),
            pixels.format,
            pixels.pixel_type,
            pixels.data,
        )?;
        Ok(())
    }

    pub(crate) fn generate_mipmaps(&self, device: &mut dyn GraphicsDevice) {
        device.generate_mipmaps(self.texture, self.target);
    }

    pub(crate) fn release(&self, device: &mut dyn GraphicsDevice) {
        device.delete_texture(self.texture);
    }
}

/// Number of levels in a full mip chain for the given size
pub fn full_mip_chain(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builder for [`Texture`]
///
/// Defaults to a 600x600 RGBA8 2D texture with a full mip chain.
#[derive(Debug, Clone, Copy)]
pub struct TextureBuilder {
    width: u32,
    height: u32,
    format: TextureFormat,
    target: TextureTarget,
    levels: Option<u32>,
}

impl Default for TextureBuilder {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            format: TextureFormat::Rgba8,
            target: TextureTarget::Texture2D,
            levels: None,
        }
    }
}

impl TextureBuilder {
    /// Start a texture with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Width in texels
    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Height in texels
    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Internal format
    #[must_use]
    pub const fn format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Binding target
    #[must_use]
    pub const fn sampler(mut self, target: TextureTarget) -> Self {
        self.target = target;
        self
    }

    /// Number of mip levels, clamped to the full chain
    #[must_use]
    pub const fn levels(mut self, levels: u32) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Allocate the texture with repeat wrapping and trilinear filtering
    pub fn build(self, engine: &mut Engine) -> EngineResult<TextureHandle> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidBuilder(format!(
                "texture size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        let full = full_mip_chain(self.width, self.height);
        let levels = self.levels.map_or(full, |levels| levels.clamp(1, full));
        let texture = engine.device_mut().create_texture(&TextureDescriptor {
            target: self.target,
            format: self.format,
            width: self.width,
            height: self.height,
            levels,
        })?;
        log::debug!(
            "Created {}x{} {:?} texture with {levels} levels",
            self.width,
            self.height,
            self.format
        );
        Ok(engine.insert_texture(Texture {
            texture,
            target: self.target,
            format: self.format,
            width: self.width,
            height: self.height,
            levels,
        }))
    }
}
