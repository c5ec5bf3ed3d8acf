//! # Unified Configuration System
//!
//! All configuration structures for the engine in one place. Every struct is
//! serde-serializable and carries defaults matching the engine's built-in
//! behavior, so a config file only needs to list the values it changes.
//!
//! ## Configuration Categories
//!
//! - **Window Config**: title, size, GL context version, MSAA samples
//! - **Renderer Config**: clear behavior, point-light capacity, multisampling
//! - **Asset Config**: shader override directory, texture and export folders

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// Upper bound on simultaneous point lights, matching the shader array size
pub const MAX_POINT_LIGHTS: usize = 8;

/// # Window Configuration
///
/// Parameters used when creating the GLFW window and its OpenGL context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in screen coordinates
    pub width: u32,
    /// Window height in screen coordinates
    pub height: u32,
    /// Requested OpenGL core profile version (major, minor)
    pub gl_version: (u32, u32),
    /// Multisample count for the default framebuffer
    pub samples: u32,
    /// Whether to synchronize buffer swaps with the display
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a window configuration with the given title and defaults
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set window size
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set multisample count
    #[must_use]
    pub const fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Aspect ratio (width / height), 1.0 for a degenerate size
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "gl_engine".to_string(),
            width: 800,
            height: 600,
            gl_version: (4, 5),
            samples: 4,
            vsync: true,
        }
    }
}

/// # Renderer Configuration
///
/// Initial state for every renderer the engine creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Whether the color buffer is cleared at the start of each render
    pub clear: bool,
    /// RGBA color used when clearing without a skybox
    pub clear_color: [f32; 4],
    /// Point lights uploaded per draw, clamped to [`MAX_POINT_LIGHTS`]
    pub max_point_lights: usize,
    /// Whether multisampling is enabled at engine creation
    pub multisample: bool,
}

impl RendererConfig {
    /// Point-light capacity after clamping to the shader limit
    pub fn point_light_capacity(&self) -> usize {
        self.max_point_lights.min(MAX_POINT_LIGHTS)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_point_lights > MAX_POINT_LIGHTS {
            return Err(format!(
                "max_point_lights {} exceeds shader limit {}",
                self.max_point_lights, MAX_POINT_LIGHTS
            ));
        }
        if self.clear_color.iter().any(|c| !c.is_finite()) {
            return Err("clear_color must be finite".to_string());
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_point_lights: MAX_POINT_LIGHTS,
            multisample: true,
        }
    }
}

/// # Asset Configuration
///
/// Where the engine looks for shader overrides and textures, and where
/// framebuffer exports are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `unlit.vert`, `unlit.frag`, `phong.vert` and
    /// `phong.frag`; the embedded sources are used when unset
    pub shader_dir: Option<String>,
    /// Base directory for texture images
    pub texture_dir: String,
    /// Directory for exported screenshots
    pub export_dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_dir: None,
            texture_dir: "res/textures".to_string(),
            export_dir: "exports".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window and context configuration
    pub window: WindowConfig,
    /// Renderer configuration
    pub renderer: RendererConfig,
    /// Asset configuration
    pub assets: AssetConfig,
}

impl EngineConfig {
    /// Create a configuration whose window carries the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig::new(title),
            ..Self::default()
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err("Window size must be non-zero".to_string());
        }
        self.renderer.validate()
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gl_engine_config_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.renderer.point_light_capacity(), MAX_POINT_LIGHTS);
        assert_eq!(config.window.samples, 4);
    }

    #[test]
    fn test_point_light_capacity_is_clamped() {
        let renderer = RendererConfig { max_point_lights: 64, ..RendererConfig::default() };
        assert_eq!(renderer.point_light_capacity(), MAX_POINT_LIGHTS);
        assert!(renderer.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("round_trip.toml");
        let mut config = EngineConfig::new("Gallery");
        config.renderer.clear_color = [0.1, 0.2, 0.3, 1.0];
        config.assets.shader_dir = Some("res/shaders".to_string());

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("round_trip.ron");
        let config = EngineConfig::new("Solar").window.with_size(1280, 720);
        let config = EngineConfig { window: config, ..EngineConfig::default() };

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.window.width, 1280);
        assert_eq!(loaded.window.height, 720);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("[renderer]\nclear = false\n").unwrap();
        assert!(!config.renderer.clear);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = EngineConfig::default().save_to_file("engine.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default(temp_path("missing.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
