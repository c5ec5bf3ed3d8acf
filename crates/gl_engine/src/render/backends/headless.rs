//! Headless recording device
//!
//! A [`GraphicsDevice`] that performs no GPU work. It allocates object names,
//! keeps buffer contents in memory and records every state change, uniform
//! upload and draw call so that rendering code can be exercised and inspected
//! without a window or a driver.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

use crate::render::api::{
    BufferTarget, Capability, ClearFlags, DeviceError, DeviceResult, GpuBuffer, GpuProgram,
    GpuTexture, GpuVertexArray, GraphicsDevice, IndexType, PixelFormat, PixelType, PolygonMode,
    PrimitiveType, ShaderStage, TextureDescriptor, TextureTarget, UniformValue,
    VertexArrayDescriptor,
};

/// A recorded indexed draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Program current at draw time
    pub program: Option<GpuProgram>,
    /// Vertex array bound at draw time
    pub vertex_array: Option<GpuVertexArray>,
    /// Topology
    pub topology: PrimitiveType,
    /// Index count
    pub count: u32,
    /// Index element type
    pub index_type: IndexType,
    /// Byte offset into the index buffer
    pub byte_offset: u32,
    /// Texture bindings by unit at draw time, sorted by unit
    pub textures: Vec<(u32, GpuTexture)>,
    /// Fill mode at draw time
    pub polygon_mode: PolygonMode,
}

/// Recorded state of a linked program
#[derive(Debug, Clone, Default)]
pub struct ProgramRecord {
    /// Vertex stage source
    pub vertex_source: String,
    /// Fragment stage source
    pub fragment_source: String,
    /// Last value written to each uniform name
    pub uniforms: HashMap<String, UniformValue>,
}

/// Recorded state of a texture
#[derive(Debug, Clone)]
pub struct TextureRecord {
    /// Creation parameters
    pub descriptor: TextureDescriptor,
    /// Uploaded levels with their pixel bytes
    pub levels: HashMap<u32, Vec<u8>>,
    /// Whether mipmaps were generated
    pub mipmaps_generated: bool,
}

#[derive(Debug, Clone)]
struct BufferRecord {
    target: BufferTarget,
    data: Vec<u8>,
}

/// Headless device recording every call
#[derive(Debug)]
pub struct HeadlessDevice {
    next_name: NonZeroU32,
    capabilities: HashSet<Capability>,
    viewport: [i32; 4],
    polygon_mode: PolygonMode,
    clears: Vec<(ClearFlags, [f32; 4])>,
    framebuffer_color: [f32; 4],
    buffers: HashMap<GpuBuffer, BufferRecord>,
    vertex_arrays: HashMap<GpuVertexArray, VertexArrayDescriptor>,
    programs: HashMap<GpuProgram, ProgramRecord>,
    textures: HashMap<GpuTexture, TextureRecord>,
    texture_units: HashMap<u32, GpuTexture>,
    current_program: Option<GpuProgram>,
    current_vertex_array: Option<GpuVertexArray>,
    draws: Vec<DrawCall>,
}

impl HeadlessDevice {
    /// Create an empty headless device
    pub fn new() -> Self {
        log::debug!("Creating headless graphics device");
        Self {
            next_name: NonZeroU32::MIN,
            capabilities: HashSet::new(),
            viewport: [0; 4],
            polygon_mode: PolygonMode::Fill,
            clears: Vec::new(),
            framebuffer_color: [0.0, 0.0, 0.0, 0.0],
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            texture_units: HashMap::new(),
            current_program: None,
            current_vertex_array: None,
            draws: Vec::new(),
        }
    }

    fn allocate_name(&mut self) -> NonZeroU32 {
        let name = self.next_name;
        self.next_name = self.next_name.saturating_add(1);
        name
    }

    /// Whether a capability has been enabled
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Last viewport set
    pub const fn viewport(&self) -> [i32; 4] {
        self.viewport
    }

    /// Current rasterizer fill mode
    pub const fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Every clear issued so far
    pub fn clears(&self) -> &[(ClearFlags, [f32; 4])] {
        &self.clears
    }

    /// Every draw call issued so far
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forget recorded clears and draws, keeping all objects alive
    pub fn reset_frame(&mut self) {
        self.clears.clear();
        self.draws.clear();
    }

    /// Last value written to a uniform of a program
    pub fn uniform(&self, program: GpuProgram, name: &str) -> Option<UniformValue> {
        self.programs.get(&program)?.uniforms.get(name).copied()
    }

    /// Recorded state of a program
    pub fn program(&self, program: GpuProgram) -> Option<&ProgramRecord> {
        self.programs.get(&program)
    }

    /// Recorded state of a texture
    pub fn texture(&self, texture: GpuTexture) -> Option<&TextureRecord> {
        self.textures.get(&texture)
    }

    /// Configuration of a vertex array
    pub fn vertex_array(&self, vertex_array: GpuVertexArray) -> Option<&VertexArrayDescriptor> {
        self.vertex_arrays.get(&vertex_array)
    }

    /// Contents of a buffer
    pub fn buffer_data(&self, buffer: GpuBuffer) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|record| record.data.as_slice())
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live vertex arrays
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Number of live programs
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of live textures
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn buffer_mut(&mut self, buffer: GpuBuffer, target: BufferTarget) -> DeviceResult<&mut BufferRecord> {
        match self.buffers.get_mut(&buffer) {
            Some(record) if record.target == target => Ok(record),
            Some(_) => Err(DeviceError::UnknownObject(format!("{buffer:?} bound to wrong target {target:?}"))),
            None => Err(DeviceError::UnknownObject(format!("{buffer:?}"))),
        }
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn name(&self) -> &'static str {
        "Headless"
    }

    fn enable(&mut self, capability: Capability) {
        self.capabilities.insert(capability);
    }

    fn set_viewport(&mut self, viewport: [i32; 4]) {
        self.viewport = viewport;
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        if flags.contains(ClearFlags::COLOR) {
            self.framebuffer_color = color;
        }
        self.clears.push((flags, color));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
    }

    fn create_buffer(&mut self, target: BufferTarget, size: usize) -> DeviceResult<GpuBuffer> {
        let buffer = GpuBuffer(self.allocate_name());
        self.buffers.insert(buffer, BufferRecord { target, data: vec![0; size] });
        log::trace!("Headless: created {target:?} buffer {} ({size} bytes)", buffer.raw());
        Ok(buffer)
    }

    fn write_buffer(&mut self, buffer: GpuBuffer, target: BufferTarget, data: &[u8]) -> DeviceResult<()> {
        let record = self.buffer_mut(buffer, target)?;
        if record.data.len() != data.len() {
            return Err(DeviceError::BufferSizeMismatch {
                buffer,
                expected: record.data.len(),
                actual: data.len(),
            });
        }
        record.data.copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&mut self, buffer: GpuBuffer, target: BufferTarget, out: &mut [u8]) -> DeviceResult<()> {
        let record = self.buffer_mut(buffer, target)?;
        if record.data.len() != out.len() {
            return Err(DeviceError::BufferSizeMismatch {
                buffer,
                expected: record.data.len(),
                actual: out.len(),
            });
        }
        out.copy_from_slice(&record.data);
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: GpuBuffer) {
        self.buffers.remove(&buffer);
    }

    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor) -> DeviceResult<GpuVertexArray> {
        let referenced = descriptor
            .attributes
            .iter()
            .map(|binding| binding.buffer)
            .chain(std::iter::once(descriptor.index_buffer));
        for buffer in referenced {
            if !self.buffers.contains_key(&buffer) {
                return Err(DeviceError::UnknownObject(format!("{buffer:?}")));
            }
        }
        let vertex_array = GpuVertexArray(self.allocate_name());
        self.vertex_arrays.insert(vertex_array, descriptor.clone());
        Ok(vertex_array)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<GpuVertexArray>) {
        self.current_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&mut self, vertex_array: GpuVertexArray) {
        self.vertex_arrays.remove(&vertex_array);
        if self.current_vertex_array == Some(vertex_array) {
            self.current_vertex_array = None;
        }
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<GpuProgram> {
        for (stage, source) in [(ShaderStage::Vertex, vertex_source), (ShaderStage::Fragment, fragment_source)] {
            if source.trim().is_empty() {
                return Err(DeviceError::ShaderCompilation {
                    stage,
                    log: "empty shader source".to_string(),
                });
            }
        }
        let program = GpuProgram(self.allocate_name());
        self.programs.insert(
            program,
            ProgramRecord {
                vertex_source: vertex_source.to_string(),
                fragment_source: fragment_source.to_string(),
                uniforms: HashMap::new(),
            },
        );
        Ok(program)
    }

    fn use_program(&mut self, program: Option<GpuProgram>) {
        self.current_program = program;
    }

    fn delete_program(&mut self, program: GpuProgram) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn set_uniform(&mut self, program: GpuProgram, name: &str, value: UniformValue) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.uniforms.insert(name.to_string(), value);
        }
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> DeviceResult<GpuTexture> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(DeviceError::ObjectCreation {
                kind: "texture",
                message: format!("invalid size {}x{}", descriptor.width, descriptor.height),
            });
        }
        let texture = GpuTexture(self.allocate_name());
        self.textures.insert(
            texture,
            TextureRecord {
                descriptor: *descriptor,
                levels: HashMap::new(),
                mipmaps_generated: false,
            },
        );
        Ok(texture)
    }

    fn upload_texture_image(
        &mut self,
        texture: GpuTexture,
        _target: TextureTarget,
        level: u32,
        size: (u32, u32),
        format: PixelFormat,
        pixel_type: PixelType,
        data: &[u8],
    ) -> DeviceResult<()> {
        let record = self
            .textures
            .get_mut(&texture)
            .ok_or_else(|| DeviceError::UnknownObject(format!("{texture:?}")))?;
        let expected = size.0 as usize * size.1 as usize * format.channels() * pixel_type.byte_size();
        if data.len() < expected {
            return Err(DeviceError::ObjectCreation {
                kind: "texture image",
                message: format!("expected {expected} bytes, got {}", data.len()),
            });
        }
        record.levels.insert(level, data[..expected].to_vec());
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: GpuTexture, _target: TextureTarget) {
        if let Some(record) = self.textures.get_mut(&texture) {
            record.mipmaps_generated = true;
        }
    }

    fn bind_texture(&mut self, unit: u32, _target: TextureTarget, texture: GpuTexture) {
        self.texture_units.insert(unit, texture);
    }

    fn delete_texture(&mut self, texture: GpuTexture) {
        self.textures.remove(&texture);
        self.texture_units.retain(|_, bound| *bound != texture);
    }

    fn draw_elements(&mut self, topology: PrimitiveType, count: u32, index_type: IndexType, byte_offset: u32) {
        let mut textures: Vec<_> = self.texture_units.iter().map(|(unit, texture)| (*unit, *texture)).collect();
        textures.sort_unstable();
        self.draws.push(DrawCall {
            program: self.current_program,
            vertex_array: self.current_vertex_array,
            topology,
            count,
            index_type,
            byte_offset,
            textures,
            polygon_mode: self.polygon_mode,
        });
    }

    fn read_pixels(&mut self, _x: i32, _y: i32, width: u32, height: u32, out: &mut [u8]) -> DeviceResult<()> {
        let pixel = self.framebuffer_color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let needed = width as usize * height as usize * 4;
        if out.len() < needed {
            return Err(DeviceError::UnknownObject(format!(
                "read_pixels destination holds {} bytes, {needed} needed",
                out.len()
            )));
        }
        for chunk in out[..needed].chunks_exact_mut(4) {
            chunk.copy_from_slice(&pixel);
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
