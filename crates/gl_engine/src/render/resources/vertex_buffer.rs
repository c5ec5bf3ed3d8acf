//! Vertex buffers with a typed attribute layout
//!
//! A vertex buffer owns one or more GPU buffers. Each sub-buffer carries a
//! set of attribute descriptors telling the vertex array setup where every
//! semantic lives inside it. The layout is fixed at build time; vertex data
//! is uploaded afterwards with `Engine::set_buffer_at`.

use std::collections::BTreeSet;

use crate::engine::{Engine, EngineError, EngineResult};
use crate::foundation::collections::VertexBufferHandle;
use crate::render::api::{BufferTarget, GpuBuffer, GraphicsDevice};

pub use crate::render::api::AttributeType;

/// Semantic slot of a vertex attribute; the value is the shader location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VertexAttribute {
    /// Object-space position
    Position = 0,
    /// Object-space normal
    Normal = 1,
    /// Per-vertex color
    Color = 2,
    /// First texture coordinate set
    Uv0 = 3,
    /// Second texture coordinate set
    Uv1 = 4,
}

impl VertexAttribute {
    /// Shader attribute location
    pub const fn location(self) -> u32 {
        self as u32
    }
}

/// Where one attribute lives inside a sub-buffer
///
/// Ordered by semantic only, so a sub-buffer holds each semantic once.
#[derive(Debug, Clone, Copy)]
pub struct AttributeInfo {
    /// Semantic slot
    pub attribute: VertexAttribute,
    /// Component layout
    pub attribute_type: AttributeType,
    /// Byte offset of the first value
    pub byte_offset: u32,
    /// Byte distance between consecutive values
    pub byte_stride: u32,
}

impl PartialEq for AttributeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute
    }
}

impl Eq for AttributeInfo {}

impl PartialOrd for AttributeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeInfo {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.attribute.cmp(&other.attribute)
    }
}

/// Engine-owned vertex buffer
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    buffers: Vec<GpuBuffer>,
    layout: Vec<BTreeSet<AttributeInfo>>,
    normalized: BTreeSet<VertexAttribute>,
    vertex_count: u32,
}

impl VertexBuffer {
    /// Number of vertices
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of sub-buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// GPU buffer backing sub-buffer `index`
    pub fn buffer(&self, index: usize) -> Option<GpuBuffer> {
        self.buffers.get(index).copied()
    }

    /// Attribute layout of sub-buffer `index`
    pub fn layout(&self, index: usize) -> Option<&BTreeSet<AttributeInfo>> {
        self.layout.get(index)
    }

    /// Whether an attribute is normalized when read by the shader
    pub fn is_normalized(&self, attribute: VertexAttribute) -> bool {
        self.normalized.contains(&attribute)
    }

    /// Per-vertex size of sub-buffer `index`: the sum of its attribute strides
    pub fn vertex_byte_size(&self, index: usize) -> Option<usize> {
        self.layout
            .get(index)
            .map(|attributes| attributes.iter().map(|info| info.byte_stride as usize).sum())
    }

    /// Total byte size of sub-buffer `index`
    pub fn buffer_byte_size(&self, index: usize) -> Option<usize> {
        self.vertex_byte_size(index)
            .map(|size| size * self.vertex_count as usize)
    }

    /// Upload the whole contents of sub-buffer `index`
    pub(crate) fn set_buffer_at(&self, device: &mut dyn GraphicsDevice, index: usize, data: &[u8]) -> EngineResult<()> {
        let (buffer, expected) = self.checked_buffer(index)?;
        if data.len() != expected {
            return Err(EngineError::SizeMismatch { expected, actual: data.len() });
        }
        device.write_buffer(buffer, BufferTarget::Array, data)?;
        Ok(())
    }

    /// Read back the whole contents of sub-buffer `index`
    pub(crate) fn read_buffer_at(&self, device: &mut dyn GraphicsDevice, index: usize) -> EngineResult<Vec<u8>> {
        let (buffer, size) = self.checked_buffer(index)?;
        let mut out = vec![0; size];
        device.read_buffer(buffer, BufferTarget::Array, &mut out)?;
        Ok(out)
    }

    pub(crate) fn release(&self, device: &mut dyn GraphicsDevice) {
        for buffer in &self.buffers {
            device.delete_buffer(*buffer);
        }
    }

    fn checked_buffer(&self, index: usize) -> EngineResult<(GpuBuffer, usize)> {
        match (self.buffer(index), self.buffer_byte_size(index)) {
            (Some(buffer), Some(size)) => Ok((buffer, size)),
            _ => Err(EngineError::InvalidBuilder(format!(
                "vertex buffer has {} sub-buffers, index {index} requested",
                self.buffers.len()
            ))),
        }
    }
}

/// Builder for [`VertexBuffer`]
#[derive(Debug, Clone)]
pub struct VertexBufferBuilder {
    vertex_count: u32,
    layout: Vec<BTreeSet<AttributeInfo>>,
    normalized: BTreeSet<VertexAttribute>,
    errors: Vec<String>,
}

impl VertexBufferBuilder {
    /// Start a vertex buffer with `buffer_count` sub-buffers
    pub fn new(buffer_count: usize) -> Self {
        Self {
            vertex_count: 0,
            layout: vec![BTreeSet::new(); buffer_count],
            normalized: BTreeSet::new(),
            errors: Vec::new(),
        }
    }

    /// Number of vertices stored in every sub-buffer
    #[must_use]
    pub const fn vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = count;
        self
    }

    /// Declare where `attribute` lives in sub-buffer `index`
    #[must_use]
    pub fn attribute(
        mut self,
        index: usize,
        attribute: VertexAttribute,
        attribute_type: AttributeType,
        byte_offset: u32,
        byte_stride: u32,
    ) -> Self {
        let info = AttributeInfo { attribute, attribute_type, byte_offset, byte_stride };
        match self.layout.get_mut(index) {
            Some(attributes) => {
                if !attributes.insert(info) {
                    self.errors.push(format!("{attribute:?} declared twice in sub-buffer {index}"));
                }
            }
            None => self.errors.push(format!("sub-buffer {index} does not exist")),
        }
        self
    }

    /// Mark an attribute as normalized
    #[must_use]
    pub fn normalized(mut self, attribute: VertexAttribute) -> Self {
        self.normalized.insert(attribute);
        self
    }

    /// Allocate the GPU buffers and register the vertex buffer with the engine
    pub fn build(self, engine: &mut Engine) -> EngineResult<VertexBufferHandle> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(EngineError::InvalidBuilder(error));
        }
        if self.layout.is_empty() {
            return Err(EngineError::InvalidBuilder("vertex buffer needs at least one sub-buffer".to_string()));
        }
        if self.vertex_count == 0 {
            return Err(EngineError::InvalidBuilder("vertex count must be non-zero".to_string()));
        }
        if let Some(index) = self.layout.iter().position(BTreeSet::is_empty) {
            return Err(EngineError::InvalidBuilder(format!("sub-buffer {index} declares no attributes")));
        }

        let mut buffers = Vec::with_capacity(self.layout.len());
        for attributes in &self.layout {
            let vertex_size: usize = attributes.iter().map(|info| info.byte_stride as usize).sum();
            match engine.device_mut().create_buffer(BufferTarget::Array, vertex_size * self.vertex_count as usize) {
                Ok(buffer) => buffers.push(buffer),
                Err(error) => {
                    for buffer in buffers {
                        engine.device_mut().delete_buffer(buffer);
                    }
                    return Err(error.into());
                }
            }
        }

        let vertex_buffer = VertexBuffer {
            buffers,
            layout: self.layout,
            normalized: self.normalized,
            vertex_count: self.vertex_count,
        };
        Ok(engine.insert_vertex_buffer(vertex_buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interleaved_builder() -> VertexBufferBuilder {
        VertexBufferBuilder::new(2)
            .vertex_count(3)
            .attribute(0, VertexAttribute::Position, AttributeType::Float3, 0, 12)
            .attribute(1, VertexAttribute::Color, AttributeType::UByte4, 0, 4)
            .normalized(VertexAttribute::Color)
    }

    #[test]
    fn test_layout_sizes() {
        let mut engine = Engine::headless();
        let handle = interleaved_builder().build(&mut engine).unwrap();
        let buffer = engine.vertex_buffer(handle).unwrap();

        assert_eq!(buffer.buffer_count(), 2);
        assert_eq!(buffer.buffer_byte_size(0), Some(36));
        assert_eq!(buffer.buffer_byte_size(1), Some(12));
        assert!(buffer.is_normalized(VertexAttribute::Color));
        assert!(!buffer.is_normalized(VertexAttribute::Position));
    }

    #[test]
    fn test_upload_read_back_round_trip() {
        let mut engine = Engine::headless();
        let handle = interleaved_builder().build(&mut engine).unwrap();

        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.5]];
        let colors: [[u8; 4]; 3] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 128]];
        engine.set_buffer_at(handle, 0, &positions).unwrap();
        engine.set_buffer_at(handle, 1, &colors).unwrap();

        assert_eq!(engine.read_buffer_at(handle, 0).unwrap(), bytemuck::cast_slice::<_, u8>(&positions));
        assert_eq!(engine.read_buffer_at(handle, 1).unwrap(), bytemuck::cast_slice::<_, u8>(&colors));
    }

    #[test]
    fn test_upload_with_wrong_size_fails() {
        let mut engine = Engine::headless();
        let handle = interleaved_builder().build(&mut engine).unwrap();
        let result = engine.set_buffer_at(handle, 0, &[0.0_f32; 4]);
        assert!(matches!(result, Err(EngineError::SizeMismatch { expected: 36, actual: 16 })));
    }

    #[test]
    fn test_invalid_layouts_are_rejected() {
        let mut engine = Engine::headless();
        let duplicate = VertexBufferBuilder::new(1)
            .vertex_count(1)
            .attribute(0, VertexAttribute::Position, AttributeType::Float3, 0, 12)
            .attribute(0, VertexAttribute::Position, AttributeType::Float3, 0, 12);
        assert!(matches!(duplicate.build(&mut engine), Err(EngineError::InvalidBuilder(_))));

        let missing = VertexBufferBuilder::new(2)
            .vertex_count(1)
            .attribute(0, VertexAttribute::Position, AttributeType::Float3, 0, 12);
        assert!(matches!(missing.build(&mut engine), Err(EngineError::InvalidBuilder(_))));

        let out_of_range = VertexBufferBuilder::new(1)
            .vertex_count(1)
            .attribute(3, VertexAttribute::Uv0, AttributeType::Float2, 0, 8);
        assert!(matches!(out_of_range.build(&mut engine), Err(EngineError::InvalidBuilder(_))));

        let empty = VertexBufferBuilder::new(1)
            .attribute(0, VertexAttribute::Position, AttributeType::Float3, 0, 12);
        assert!(matches!(empty.build(&mut engine), Err(EngineError::InvalidBuilder(_))));
    }
}
