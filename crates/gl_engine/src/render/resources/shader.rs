//! Shader programs and the uniform naming contract
//!
//! The renderer drives every program through a fixed set of conventionally
//! named uniforms, listed in [`uniform`]. Both shading models declare the
//! same transform, light and flag uniforms; names a program does not use are
//! ignored by the device.
//!
//! Sources are embedded in the crate and can be overridden per project by
//! pointing `AssetConfig::shader_dir` at a directory holding `unlit.vert`,
//! `unlit.frag`, `phong.vert` and `phong.frag`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::{Engine, EngineResult};
use crate::foundation::collections::{ShaderHandle, TextureHandle};
use crate::render::api::{DeviceError, GpuProgram, GraphicsDevice, TextureTarget, UniformValue};

pub use crate::core::config::MAX_POINT_LIGHTS;

/// Uniform names shared by every shading model
pub mod uniform {
    /// Model matrix
    pub const MODEL: &str = "model";
    /// View matrix
    pub const VIEW: &str = "view";
    /// Projection matrix
    pub const PROJECTION: &str = "projection";
    /// `transpose(inverse(view * model))`
    pub const NORMAL_MATRIX: &str = "normalMat";

    /// Camera-space direction of the directional light
    pub const DIRECTIONAL_LIGHT_DIRECTION: &str = "directionalLight.direction";
    /// Ambient color of the directional light
    pub const DIRECTIONAL_LIGHT_AMBIENT: &str = "directionalLight.ambient";
    /// Diffuse color of the directional light
    pub const DIRECTIONAL_LIGHT_DIFFUSE: &str = "directionalLight.diffuse";
    /// Specular color of the directional light
    pub const DIRECTIONAL_LIGHT_SPECULAR: &str = "directionalLight.specular";

    /// Whether the directional light slot is populated
    pub const ENABLED_DIRECTIONAL_LIGHT: &str = "enabledDirectionalLight";
    /// Number of populated point-light slots
    pub const POINT_LIGHT_COUNT: &str = "pointLightCount";
    /// Whether a phong program samples its material from textures
    pub const ENABLED_TEXTURED_MATERIAL: &str = "enabledTexturedMaterial";
    /// Whether an unlit program samples its color from a texture
    pub const ENABLED_UNLIT_TEXTURE: &str = "enabledUnlitTexture";

    /// Sampler of an unlit program
    pub const UNLIT_TEXTURE: &str = "unlitTexture";

    /// Ambient color of a phong material
    pub const MATERIAL_AMBIENT: &str = "material.ambient";
    /// Diffuse color of a phong material
    pub const MATERIAL_DIFFUSE: &str = "material.diffuse";
    /// Specular color of a phong material
    pub const MATERIAL_SPECULAR: &str = "material.specular";
    /// Shininess exponent of a phong material
    pub const MATERIAL_SHININESS: &str = "material.shininess";

    /// Diffuse sampler of a textured phong material
    pub const TEXTURED_MATERIAL_DIFFUSE: &str = "texturedMaterial.diffuse";
    /// Specular sampler of a textured phong material
    pub const TEXTURED_MATERIAL_SPECULAR: &str = "texturedMaterial.specular";
    /// Shininess exponent of a textured phong material
    pub const TEXTURED_MATERIAL_SHININESS: &str = "texturedMaterial.shininess";

    /// Member of a point-light array slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PointLightMember {
        /// Camera-space position
        Position,
        /// Ambient color
        Ambient,
        /// Diffuse color
        Diffuse,
        /// Specular color
        Specular,
        /// Constant attenuation
        Constant,
        /// Linear attenuation
        Linear,
        /// Quadratic attenuation
        Quadratic,
    }

    impl PointLightMember {
        const fn as_str(self) -> &'static str {
            match self {
                Self::Position => "position",
                Self::Ambient => "ambient",
                Self::Diffuse => "diffuse",
                Self::Specular => "specular",
                Self::Constant => "constant",
                Self::Linear => "linear",
                Self::Quadratic => "quadratic",
            }
        }
    }

    /// Name of a member of point-light slot `index`, e.g. `pointLights[1].position`
    pub fn point_light(index: usize, member: PointLightMember) -> String {
        format!("pointLights[{index}].{}", member.as_str())
    }
}

/// Shader loading errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// A source file could not be read
    #[error("Shader source {path} could not be read: {source}")]
    SourceNotFound {
        /// File that was requested
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Compilation or linking failed
    #[error("Shader program for {model:?} failed to build: {source}")]
    Build {
        /// Shading model being built
        model: ShadingModel,
        /// Driver diagnostic
        source: DeviceError,
    },
}

/// Lighting model implemented by a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    /// Vertex color or texture, no lighting
    Unlit,
    /// Blinn-Phong with one directional and several point lights
    Phong,
}

impl ShadingModel {
    const fn file_stem(self) -> &'static str {
        match self {
            Self::Unlit => "unlit",
            Self::Phong => "phong",
        }
    }

    const fn embedded_sources(self) -> (&'static str, &'static str) {
        match self {
            Self::Unlit => (
                include_str!("../../../shaders/unlit.vert"),
                include_str!("../../../shaders/unlit.frag"),
            ),
            Self::Phong => (
                include_str!("../../../shaders/phong.vert"),
                include_str!("../../../shaders/phong.frag"),
            ),
        }
    }

    /// Flag uniform telling the program whether textures are bound
    pub const fn texture_flag(self) -> &'static str {
        match self {
            Self::Unlit => uniform::ENABLED_UNLIT_TEXTURE,
            Self::Phong => uniform::ENABLED_TEXTURED_MATERIAL,
        }
    }
}

/// Engine-owned linked program
#[derive(Debug, Clone)]
pub struct Shader {
    program: GpuProgram,
    model: ShadingModel,
    textures: Vec<(TextureTarget, TextureHandle)>,
}

impl Shader {
    /// GPU program
    pub const fn program(&self) -> GpuProgram {
        self.program
    }

    /// Shading model
    pub const fn model(&self) -> ShadingModel {
        self.model
    }

    /// Registered textures; the position is the texture unit
    pub fn texture_bindings(&self) -> &[(TextureTarget, TextureHandle)] {
        &self.textures
    }

    /// Set a named uniform
    pub fn set_uniform(&self, device: &mut dyn GraphicsDevice, name: &str, value: UniformValue) {
        device.set_uniform(self.program, name, value);
    }

    /// Point sampler `name` at the next free texture unit and remember the
    /// texture for binding at draw time
    pub(crate) fn add_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        target: TextureTarget,
        texture: TextureHandle,
    ) {
        let unit = self.textures.len() as i32;
        device.set_uniform(self.program, name, UniformValue::Int(unit));
        self.textures.push((target, texture));
    }

    pub(crate) fn release(&self, device: &mut dyn GraphicsDevice) {
        device.delete_program(self.program);
    }
}

/// Builder for [`Shader`]
#[derive(Debug, Clone, Copy)]
pub struct ShaderBuilder {
    model: ShadingModel,
}

impl ShaderBuilder {
    /// Start a program of the given shading model
    pub const fn new(model: ShadingModel) -> Self {
        Self { model }
    }

    /// Load, compile and link the program and register it with the engine
    pub fn build(self, engine: &mut Engine) -> EngineResult<ShaderHandle> {
        let (vertex, fragment) = match engine.config().assets.shader_dir.as_deref() {
            Some(dir) => self.read_sources(Path::new(dir))?,
            None => {
                let (vertex, fragment) = self.model.embedded_sources();
                (vertex.to_string(), fragment.to_string())
            }
        };

        let program = engine
            .device_mut()
            .create_program(&vertex, &fragment)
            .map_err(|source| {
                log::error!("Failed to build {:?} shader: {source}", self.model);
                ShaderError::Build { model: self.model, source }
            })?;
        log::debug!("Built {:?} shader program {}", self.model, program.raw());

        Ok(engine.insert_shader(Shader {
            program,
            model: self.model,
            textures: Vec::new(),
        }))
    }

    fn read_sources(self, dir: &Path) -> Result<(String, String), ShaderError> {
        let read = |extension: &str| {
            let path = dir.join(format!("{}.{extension}", self.model.file_stem()));
            std::fs::read_to_string(&path).map_err(|source| {
                log::error!("Could not read shader source {}: {source}", path.display());
                ShaderError::SourceNotFound { path, source }
            })
        };
        Ok((read("vert")?, read("frag")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::engine::EngineError;
    use crate::render::backends::HeadlessDevice;

    #[test]
    fn test_point_light_uniform_names() {
        assert_eq!(uniform::point_light(0, uniform::PointLightMember::Position), "pointLights[0].position");
        assert_eq!(uniform::point_light(7, uniform::PointLightMember::Quadratic), "pointLights[7].quadratic");
    }

    #[test]
    fn test_embedded_sources_declare_the_contract() {
        for model in [ShadingModel::Unlit, ShadingModel::Phong] {
            let (vertex, fragment) = model.embedded_sources();
            assert!(vertex.contains(uniform::NORMAL_MATRIX));
            assert!(fragment.contains(model.texture_flag()));
        }
        let (_, phong) = ShadingModel::Phong.embedded_sources();
        assert!(phong.contains("pointLights[MAX_POINT_LIGHTS]"));
        assert!(phong.contains(&format!("#define MAX_POINT_LIGHTS {MAX_POINT_LIGHTS}")));
    }

    #[test]
    fn test_build_from_embedded_sources() {
        let mut engine = Engine::headless();
        let handle = ShaderBuilder::new(ShadingModel::Phong).build(&mut engine).unwrap();
        let shader = engine.shader(handle).unwrap();
        assert_eq!(shader.model(), ShadingModel::Phong);
        assert!(shader.texture_bindings().is_empty());
    }

    #[test]
    fn test_missing_shader_dir_is_reported() {
        let mut config = EngineConfig::default();
        config.assets.shader_dir = Some("/nonexistent/gl_engine/shaders".to_string());
        let mut engine = Engine::create(Box::new(HeadlessDevice::new()), config).unwrap();

        let result = ShaderBuilder::new(ShadingModel::Unlit).build(&mut engine);
        assert!(matches!(result, Err(EngineError::Shader(ShaderError::SourceNotFound { .. }))));
    }

    #[test]
    fn test_texture_units_follow_registration_order() {
        let mut engine = Engine::headless();
        let shader = ShaderBuilder::new(ShadingModel::Phong).build(&mut engine).unwrap();
        let diffuse = crate::render::resources::TextureBuilder::new().width(2).height(2).build(&mut engine).unwrap();
        let specular = crate::render::resources::TextureBuilder::new().width(2).height(2).build(&mut engine).unwrap();

        engine.set_shader_texture(shader, uniform::TEXTURED_MATERIAL_DIFFUSE, diffuse).unwrap();
        engine.set_shader_texture(shader, uniform::TEXTURED_MATERIAL_SPECULAR, specular).unwrap();

        let program = engine.shader(shader).unwrap().program();
        let device = engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap();
        assert_eq!(device.uniform(program, uniform::TEXTURED_MATERIAL_DIFFUSE), Some(UniformValue::Int(0)));
        assert_eq!(device.uniform(program, uniform::TEXTURED_MATERIAL_SPECULAR), Some(UniformValue::Int(1)));
        assert_eq!(engine.shader(shader).unwrap().texture_bindings().len(), 2);
    }
}
