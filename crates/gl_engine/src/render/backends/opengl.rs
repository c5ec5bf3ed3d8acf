//! OpenGL backend built on `glow`
//!
//! Every call into the driver is `unsafe` in glow; this module is the only
//! place in the crate allowed to make them. The device expects its GL
//! context to be current on the calling thread for its whole lifetime.

// SAFETY: every `unsafe` block below relies on that current context and only
// passes object names this device created and has not deleted.
#![allow(unsafe_code)]

use std::collections::HashMap;

use glow::HasContext;

use crate::render::api::{
    AttributeType, BufferTarget, Capability, ClearFlags, DeviceError, DeviceResult, GpuBuffer,
    GpuProgram, GpuTexture, GpuVertexArray, GraphicsDevice, IndexType, PixelFormat, PixelType,
    PolygonMode, PrimitiveType, ShaderStage, TextureDescriptor, TextureFormat, TextureTarget,
    UniformValue, VertexArrayDescriptor,
};

/// Staging target used for buffer storage, upload and read-back so that no
/// vertex array binding state is disturbed
const STAGING_TARGET: u32 = glow::COPY_WRITE_BUFFER;

/// `glow`-backed graphics device
pub struct OpenGlDevice {
    gl: glow::Context,
    buffer_sizes: HashMap<GpuBuffer, usize>,
    uniform_locations: HashMap<(GpuProgram, String), Option<glow::NativeUniformLocation>>,
    current_program: Option<GpuProgram>,
}

impl OpenGlDevice {
    /// Wrap an existing glow context
    pub fn new(gl: glow::Context) -> Self {
        // SAFETY: the context is current on this thread per the type's contract.
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        log::info!("OpenGL device ready: {version}");
        Self {
            gl,
            buffer_sizes: HashMap::new(),
            uniform_locations: HashMap::new(),
            current_program: None,
        }
    }

    /// Load GL entry points through the windowing system's loader
    pub fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        // SAFETY: the loader returns entry points for the context current on this thread.
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        Self::new(gl)
    }

    /// Access the underlying glow context
    pub const fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn uniform_location(&mut self, program: GpuProgram, name: &str) -> Option<glow::NativeUniformLocation> {
        let key = (program, name.to_string());
        if let Some(location) = self.uniform_locations.get(&key) {
            return *location;
        }
        // SAFETY: program is a live program name created by this device.
        let location = unsafe { self.gl.get_uniform_location(glow::NativeProgram(program.0), name) };
        if location.is_none() {
            log::trace!("Uniform {name} not active in program {}", program.raw());
        }
        self.uniform_locations.insert(key, location);
        location
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> DeviceResult<glow::NativeShader> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        // SAFETY: plain object creation and queries on the current context.
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(|message| DeviceError::ObjectCreation { kind: "shader", message })?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(DeviceError::ShaderCompilation { stage, log });
            }
            Ok(shader)
        }
    }
}

const fn capability_enum(capability: Capability) -> u32 {
    match capability {
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::Multisample => glow::MULTISAMPLE,
    }
}

const fn topology_enum(topology: PrimitiveType) -> u32 {
    match topology {
        PrimitiveType::LineStrip => glow::LINE_STRIP,
        PrimitiveType::Triangles => glow::TRIANGLES,
        PrimitiveType::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveType::TriangleFan => glow::TRIANGLE_FAN,
    }
}

const fn index_type_enum(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::U16 => glow::UNSIGNED_SHORT,
        IndexType::U32 => glow::UNSIGNED_INT,
    }
}

const fn attribute_type_enum(attribute_type: AttributeType) -> u32 {
    match attribute_type {
        AttributeType::UByte4 => glow::UNSIGNED_BYTE,
        AttributeType::Float2 | AttributeType::Float3 | AttributeType::Float4 => glow::FLOAT,
        AttributeType::UInt => glow::UNSIGNED_INT,
    }
}

const fn texture_target_enum(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
    }
}

const fn texture_format_enum(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::R8 => glow::R8,
        TextureFormat::Rgb8 => glow::RGB8,
        TextureFormat::Rgba8 => glow::RGBA8,
    }
}

const fn pixel_format_enum(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Red => glow::RED,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
    }
}

const fn pixel_type_enum(pixel_type: PixelType) -> u32 {
    match pixel_type {
        PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
        PixelType::UnsignedShort => glow::UNSIGNED_SHORT,
    }
}

impl GraphicsDevice for OpenGlDevice {
    fn name(&self) -> &'static str {
        "OpenGL"
    }

    fn enable(&mut self, capability: Capability) {
        // SAFETY: the enum comes from a fixed capability table.
        unsafe { self.gl.enable(capability_enum(capability)) };
    }

    fn set_viewport(&mut self, viewport: [i32; 4]) {
        // SAFETY: viewport sizes are plain integers; GL clamps them.
        unsafe { self.gl.viewport(viewport[0], viewport[1], viewport[2], viewport[3]) };
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        let mut mask = 0;
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        // SAFETY: only state setters with values taken from the caller.
        unsafe {
            if flags.contains(ClearFlags::COLOR) {
                self.gl.clear_color(color[0], color[1], color[2], color[3]);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            self.gl.clear(mask);
        }
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
        };
        // SAFETY: FRONT_AND_BACK with FILL or LINE is always valid.
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) };
    }

    fn create_buffer(&mut self, target: BufferTarget, size: usize) -> DeviceResult<GpuBuffer> {
        if size == 0 {
            return Err(DeviceError::ObjectCreation {
                kind: "buffer",
                message: "zero-sized storage".to_string(),
            });
        }
        // SAFETY: the new buffer is bound only for the storage call and unbound after.
        let buffer = unsafe {
            let raw = self
                .gl
                .create_buffer()
                .map_err(|message| DeviceError::ObjectCreation { kind: "buffer", message })?;
            self.gl.bind_buffer(STAGING_TARGET, Some(raw));
            self.gl.buffer_storage(
                STAGING_TARGET,
                size as i32,
                None,
                glow::DYNAMIC_STORAGE_BIT | glow::MAP_WRITE_BIT | glow::MAP_READ_BIT,
            );
            self.gl.bind_buffer(STAGING_TARGET, None);
            GpuBuffer(raw.0)
        };
        log::trace!("OpenGL: created {target:?} buffer {} ({size} bytes)", buffer.raw());
        self.buffer_sizes.insert(buffer, size);
        Ok(buffer)
    }

    fn write_buffer(&mut self, buffer: GpuBuffer, _target: BufferTarget, data: &[u8]) -> DeviceResult<()> {
        let size = *self
            .buffer_sizes
            .get(&buffer)
            .ok_or_else(|| DeviceError::UnknownObject(format!("{buffer:?}")))?;
        if size != data.len() {
            return Err(DeviceError::BufferSizeMismatch { buffer, expected: size, actual: data.len() });
        }
        // SAFETY: the buffer is bound to the staging target and its size was checked above.
        unsafe {
            self.gl.bind_buffer(STAGING_TARGET, Some(glow::NativeBuffer(buffer.0)));
            let mapped = self.gl.map_buffer_range(
                STAGING_TARGET,
                0,
                size as i32,
                glow::MAP_WRITE_BIT | glow::MAP_INVALIDATE_BUFFER_BIT | glow::MAP_FLUSH_EXPLICIT_BIT,
            );
            if mapped.is_null() {
                self.gl.bind_buffer(STAGING_TARGET, None);
                return Err(DeviceError::BufferMapFailed(buffer));
            }
            // SAFETY: the mapping covers `size` bytes and `data` holds exactly `size` bytes.
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped, size);
            self.gl.flush_mapped_buffer_range(STAGING_TARGET, 0, size as i32);
            self.gl.unmap_buffer(STAGING_TARGET);
            self.gl.bind_buffer(STAGING_TARGET, None);
        }
        Ok(())
    }

    fn read_buffer(&mut self, buffer: GpuBuffer, _target: BufferTarget, out: &mut [u8]) -> DeviceResult<()> {
        let size = *self
            .buffer_sizes
            .get(&buffer)
            .ok_or_else(|| DeviceError::UnknownObject(format!("{buffer:?}")))?;
        if size != out.len() {
            return Err(DeviceError::BufferSizeMismatch { buffer, expected: size, actual: out.len() });
        }
        // SAFETY: `out` holds exactly the buffer size checked above.
        unsafe {
            self.gl.bind_buffer(STAGING_TARGET, Some(glow::NativeBuffer(buffer.0)));
            self.gl.get_buffer_sub_data(STAGING_TARGET, 0, out);
            self.gl.bind_buffer(STAGING_TARGET, None);
        }
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: GpuBuffer) {
        if self.buffer_sizes.remove(&buffer).is_some() {
            // SAFETY: the name was still tracked, so it is live.
            unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) };
        }
    }

    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor) -> DeviceResult<GpuVertexArray> {
        // SAFETY: every attribute buffer and the index buffer come from this device.
        unsafe {
            let vao = self
                .gl
                .create_vertex_array()
                .map_err(|message| DeviceError::ObjectCreation { kind: "vertex array", message })?;
            self.gl.bind_vertex_array(Some(vao));

            for binding in &descriptor.attributes {
                self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(glow::NativeBuffer(binding.buffer.0)));
                self.gl.vertex_attrib_pointer_f32(
                    binding.location,
                    binding.attribute_type.components(),
                    attribute_type_enum(binding.attribute_type),
                    binding.normalized,
                    binding.byte_stride as i32,
                    binding.byte_offset as i32,
                );
                self.gl.enable_vertex_attrib_array(binding.location);
                self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            }

            self.gl
                .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(glow::NativeBuffer(descriptor.index_buffer.0)));
            self.gl.bind_vertex_array(None);
            Ok(GpuVertexArray(vao.0))
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<GpuVertexArray>) {
        // SAFETY: `None` unbinds; `Some` names a vertex array from this device.
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(|vao| glow::NativeVertexArray(vao.0)));
        };
    }

    fn delete_vertex_array(&mut self, vertex_array: GpuVertexArray) {
        // SAFETY: vertex arrays are deleted once by their owning renderable.
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) };
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<GpuProgram> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = match self.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(error) => {
                // SAFETY: the vertex stage is no longer referenced.
                unsafe { self.gl.delete_shader(vertex) };
                return Err(error);
            }
        };

        // SAFETY: both stages compiled successfully and are deleted on every path.
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(message) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(DeviceError::ObjectCreation { kind: "program", message });
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);

            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !linked {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(DeviceError::ShaderLink(log));
            }
            Ok(GpuProgram(program.0))
        }
    }

    fn use_program(&mut self, program: Option<GpuProgram>) {
        if self.current_program != program {
            // SAFETY: the program was created by this device.
            unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) };
            self.current_program = program;
        }
    }

    fn delete_program(&mut self, program: GpuProgram) {
        self.uniform_locations.retain(|(owner, _), _| *owner != program);
        if self.current_program == Some(program) {
            self.use_program(None);
        }
        // SAFETY: the program is unbound before deletion when current.
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) };
    }

    fn set_uniform(&mut self, program: GpuProgram, name: &str, value: UniformValue) {
        let Some(location) = self.uniform_location(program, name) else {
            return;
        };
        self.use_program(Some(program));
        let location = Some(&location);
        // SAFETY: the location was queried from this program, which is now current.
        unsafe {
            match value {
                UniformValue::Bool(flag) => self.gl.uniform_1_i32(location, i32::from(flag)),
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> DeviceResult<GpuTexture> {
        let target = texture_target_enum(descriptor.target);
        // SAFETY: storage is allocated once on a freshly created texture.
        unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(|message| DeviceError::ObjectCreation { kind: "texture", message })?;
            self.gl.bind_texture(target, Some(texture));
            self.gl.tex_storage_2d(
                target,
                descriptor.levels.max(1) as i32,
                texture_format_enum(descriptor.format),
                descriptor.width as i32,
                descriptor.height as i32,
            );
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl.bind_texture(target, None);
            Ok(GpuTexture(texture.0))
        }
    }

    fn upload_texture_image(
        &mut self,
        texture: GpuTexture,
        target: TextureTarget,
        level: u32,
        size: (u32, u32),
        format: PixelFormat,
        pixel_type: PixelType,
        data: &[u8],
    ) -> DeviceResult<()> {
        let target = texture_target_enum(target);
        // SAFETY: `data` was sized against the level extent by the texture wrapper.
        unsafe {
            self.gl.bind_texture(target, Some(glow::NativeTexture(texture.0)));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_sub_image_2d(
                target,
                level as i32,
                0,
                0,
                size.0 as i32,
                size.1 as i32,
                pixel_format_enum(format),
                pixel_type_enum(pixel_type),
                glow::PixelUnpackData::Slice(data),
            );
            self.gl.bind_texture(target, None);
        }
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: GpuTexture, target: TextureTarget) {
        let target = texture_target_enum(target);
        // SAFETY: the texture has immutable storage for every level.
        unsafe {
            self.gl.bind_texture(target, Some(glow::NativeTexture(texture.0)));
            self.gl.generate_mipmap(target);
            self.gl.bind_texture(target, None);
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: GpuTexture) {
        // SAFETY: units stay below the shader binding count.
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(texture_target_enum(target), Some(glow::NativeTexture(texture.0)));
        }
    }

    fn delete_texture(&mut self, texture: GpuTexture) {
        // SAFETY: textures are deleted once by the engine.
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) };
    }

    fn draw_elements(&mut self, topology: PrimitiveType, count: u32, index_type: IndexType, byte_offset: u32) {
        // SAFETY: the bound vertex array carries an index buffer covering `count` from `byte_offset`.
        unsafe {
            self.gl.draw_elements(
                topology_enum(topology),
                count as i32,
                index_type_enum(index_type),
                byte_offset as i32,
            );
        }
    }

    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, out: &mut [u8]) -> DeviceResult<()> {
        let needed = width as usize * height as usize * 4;
        if out.len() < needed {
            return Err(DeviceError::UnknownObject(format!(
                "read_pixels destination holds {} bytes, {needed} needed",
                out.len()
            )));
        }
        // SAFETY: `out` holds at least `needed` bytes.
        unsafe {
            self.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            self.gl.read_pixels(
                x,
                y,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut out[..needed]),
            );
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
