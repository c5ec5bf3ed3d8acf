//! # Forward Renderer
//!
//! Draws one [`View`] per call in a single forward pass:
//!
//! 1. apply the viewport and clear (depth always, color when enabled);
//! 2. resolve the view's scene and camera;
//! 3. for every renderable entity, compute model, view, projection and
//!    normal matrices once, then for each of its elements upload them together
//!    with the scene's lights, bind the shader's textures and issue the draw.
//!
//! Light uniforms are computed once per frame. Only the last directional
//! light in scene order is visible to shaders; point lights fill the indexed
//! array in scene order until the capacity is reached and the rest are
//! dropped for the frame.

use std::collections::HashMap;

use thiserror::Error;

use crate::core::config::{RendererConfig, MAX_POINT_LIGHTS};
use crate::ecs::{Entity, World};
use crate::foundation::collections::{SceneHandle, ShaderHandle, SlotMap, TextureHandle};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::api::{ClearFlags, DeviceError, GraphicsDevice, PolygonMode, UniformValue};
use crate::render::camera::Camera;
use crate::render::resources::shader::uniform::{self, PointLightMember};
use crate::render::resources::{Shader, Texture};
use crate::render::scene::Scene;
use crate::render::view::View;

/// Errors raised while drawing a view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The view has no scene bound
    #[error("No scene was set for the view")]
    MissingScene,

    /// The view has no camera bound
    #[error("No camera was set for the view")]
    MissingCamera,

    /// A handle reachable from the view refers to a destroyed object
    #[error("View refers to a destroyed {0}")]
    StaleHandle(&'static str),

    /// The device failed
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Result type for rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// How the framebuffer is cleared before a view is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOptions {
    /// Clear the color buffer
    pub clear: bool,
    /// Color the color buffer is cleared to
    pub clear_color: [f32; 4],
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            clear: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Engine-owned objects a frame reads from
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Entity and component stores
    pub world: &'a World,
    /// Scenes
    pub scenes: &'a SlotMap<SceneHandle, Scene>,
    /// Cameras by entity
    pub cameras: &'a HashMap<Entity, Camera>,
    /// Shader programs
    pub shaders: &'a SlotMap<ShaderHandle, Shader>,
    /// Textures
    pub textures: &'a SlotMap<TextureHandle, Texture>,
}

/// Directional light slot as seen by a shader
#[derive(Debug, Clone, Copy)]
struct DirectionalUniforms {
    direction: Vec3,
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
}

/// Point light slot as seen by a shader
#[derive(Debug, Clone, Copy)]
struct PointUniforms {
    position: Vec3,
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    constant: f32,
    linear: f32,
    quadratic: f32,
}

#[derive(Debug, Default)]
struct FrameLights {
    directional: Option<DirectionalUniforms>,
    points: Vec<PointUniforms>,
}

/// Forward renderer state that persists between frames
#[derive(Debug, Clone)]
pub struct Renderer {
    clear_options: ClearOptions,
    polygon_mode: PolygonMode,
    max_point_lights: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

impl Renderer {
    /// Create a renderer from configuration
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            clear_options: ClearOptions {
                clear: config.clear,
                clear_color: config.clear_color,
            },
            polygon_mode: PolygonMode::Fill,
            max_point_lights: config.point_light_capacity(),
        }
    }

    /// Clear behavior
    pub const fn clear_options(&self) -> ClearOptions {
        self.clear_options
    }

    /// Replace the clear behavior
    pub fn set_clear_options(&mut self, options: ClearOptions) {
        self.clear_options = options;
    }

    /// Current rasterizer fill mode
    pub const fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Point lights uploaded per draw
    pub const fn max_point_lights(&self) -> usize {
        self.max_point_lights
    }

    /// Set the point-light capacity, clamped to the shader array size
    pub fn set_max_point_lights(&mut self, count: usize) {
        self.max_point_lights = count.min(MAX_POINT_LIGHTS);
    }

    /// Switch between filled and wireframe rasterization
    pub fn toggle_polygon_mode(&mut self, device: &mut dyn GraphicsDevice) {
        self.polygon_mode = match self.polygon_mode {
            PolygonMode::Fill => PolygonMode::Line,
            PolygonMode::Line => PolygonMode::Fill,
        };
        device.set_polygon_mode(self.polygon_mode);
        log::debug!("Polygon mode set to {:?}", self.polygon_mode);
    }

    /// Read RGBA8 pixels from the framebuffer
    ///
    /// Rows are returned bottom-up; flipping for image files is up to the caller.
    pub fn read_framebuffer_rgba(
        device: &mut dyn GraphicsDevice,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> RenderResult<()> {
        device.read_pixels(x, y, width, height, out)?;
        Ok(())
    }

    /// Draw a view
    pub fn render(&self, device: &mut dyn GraphicsDevice, view: &View, context: &RenderContext<'_>) -> RenderResult<()> {
        device.set_viewport(view.viewport());
        let mut flags = ClearFlags::DEPTH;
        if self.clear_options.clear {
            flags |= ClearFlags::COLOR;
        }
        device.clear(flags, self.clear_options.clear_color);

        let Some(scene_handle) = view.scene() else {
            log::error!("Renderer: no scene was set for the view");
            return Err(RenderError::MissingScene);
        };
        let Some(camera_entity) = view.camera() else {
            log::error!("Renderer: no camera was set for the view");
            return Err(RenderError::MissingCamera);
        };
        let scene = context.scenes.get(scene_handle).ok_or(RenderError::StaleHandle("scene"))?;
        let camera = context.cameras.get(&camera_entity).ok_or(RenderError::StaleHandle("camera"))?;

        let view_matrix = camera.view_matrix();
        let projection = *camera.projection();
        let lights = self.collect_lights(context.world, scene, &view_matrix);

        for &entity in scene.renderables() {
            let Some(mesh) = context.world.renderables.mesh(entity) else {
                log::trace!("Skipping {entity}: no renderable record");
                continue;
            };
            let model = context.world.transforms.get_transform(entity);
            let normal = (view_matrix * model).normal_matrix();

            for (element, shader_handle) in mesh.iter() {
                let shader = context.shaders.get(shader_handle).ok_or(RenderError::StaleHandle("shader"))?;
                let program = shader.program();
                device.use_program(Some(program));

                device.set_uniform(program, uniform::MODEL, UniformValue::Mat4(model.to_cols_array()));
                device.set_uniform(program, uniform::VIEW, UniformValue::Mat4(view_matrix.to_cols_array()));
                device.set_uniform(program, uniform::PROJECTION, UniformValue::Mat4(projection.to_cols_array()));
                device.set_uniform(program, uniform::NORMAL_MATRIX, UniformValue::Mat4(normal.to_cols_array()));

                upload_lights(device, shader, &lights);

                let bindings = shader.texture_bindings();
                for (unit, (target, texture_handle)) in bindings.iter().enumerate() {
                    let texture = context
                        .textures
                        .get(*texture_handle)
                        .ok_or(RenderError::StaleHandle("texture"))?;
                    device.bind_texture(unit as u32, *target, texture.texture());
                }
                device.set_uniform(
                    program,
                    shader.model().texture_flag(),
                    UniformValue::Bool(!bindings.is_empty()),
                );

                device.bind_vertex_array(Some(element.vertex_array));
                device.draw_elements(element.topology, element.count, element.index_type, element.byte_offset);
                device.bind_vertex_array(None);
            }
        }

        Ok(())
    }

    fn collect_lights(&self, world: &World, scene: &Scene, view_matrix: &Mat4) -> FrameLights {
        let mut lights = FrameLights::default();
        let mut dropped = 0_usize;

        for &entity in scene.lights() {
            if let Some(light) = world.lights.directional(entity) {
                let light_model = world.transforms.get_transform(entity);
                let light_normal = (view_matrix * light_model).normal_matrix();
                lights.directional = Some(DirectionalUniforms {
                    direction: light_normal.transform_direction(light.direction),
                    ambient: light.ambient,
                    diffuse: light.diffuse,
                    specular: light.specular,
                });
            } else if let Some(light) = world.lights.point(entity) {
                if lights.points.len() >= self.max_point_lights {
                    dropped += 1;
                    continue;
                }
                lights.points.push(PointUniforms {
                    position: view_matrix.transform_point_h(light.position),
                    ambient: light.ambient,
                    diffuse: light.diffuse,
                    specular: light.specular,
                    constant: light.attenuation.constant,
                    linear: light.attenuation.linear,
                    quadratic: light.attenuation.quadratic,
                });
            }
        }

        if dropped > 0 {
            log::trace!(
                "Dropped {dropped} point lights beyond the capacity of {}",
                self.max_point_lights
            );
        }
        lights
    }
}

fn vec3(v: Vec3) -> UniformValue {
    UniformValue::Vec3([v.x, v.y, v.z])
}

fn upload_lights(device: &mut dyn GraphicsDevice, shader: &Shader, lights: &FrameLights) {
    let program = shader.program();
    device.set_uniform(program, uniform::ENABLED_DIRECTIONAL_LIGHT, UniformValue::Bool(false));
    device.set_uniform(program, uniform::POINT_LIGHT_COUNT, UniformValue::Int(0));

    if let Some(light) = &lights.directional {
        device.set_uniform(program, uniform::DIRECTIONAL_LIGHT_DIRECTION, vec3(light.direction));
        device.set_uniform(program, uniform::DIRECTIONAL_LIGHT_AMBIENT, vec3(light.ambient));
        device.set_uniform(program, uniform::DIRECTIONAL_LIGHT_DIFFUSE, vec3(light.diffuse));
        device.set_uniform(program, uniform::DIRECTIONAL_LIGHT_SPECULAR, vec3(light.specular));
        device.set_uniform(program, uniform::ENABLED_DIRECTIONAL_LIGHT, UniformValue::Bool(true));
    }

    for (index, light) in lights.points.iter().enumerate() {
        let slot = |member| uniform::point_light(index, member);
        device.set_uniform(program, &slot(PointLightMember::Position), vec3(light.position));
        device.set_uniform(program, &slot(PointLightMember::Ambient), vec3(light.ambient));
        device.set_uniform(program, &slot(PointLightMember::Diffuse), vec3(light.diffuse));
        device.set_uniform(program, &slot(PointLightMember::Specular), vec3(light.specular));
        device.set_uniform(program, &slot(PointLightMember::Constant), UniformValue::Float(light.constant));
        device.set_uniform(program, &slot(PointLightMember::Linear), UniformValue::Float(light.linear));
        device.set_uniform(program, &slot(PointLightMember::Quadratic), UniformValue::Float(light.quadratic));
    }
    device.set_uniform(program, uniform::POINT_LIGHT_COUNT, UniformValue::Int(lights.points.len() as i32));
}
