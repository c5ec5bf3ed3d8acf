//! Index buffers
//!
//! One GPU buffer of 16- or 32-bit indices. The element type and count are
//! fixed at build time.

use crate::engine::{Engine, EngineError, EngineResult};
use crate::foundation::collections::IndexBufferHandle;
use crate::render::api::{BufferTarget, GpuBuffer, GraphicsDevice};

pub use crate::render::api::IndexType;

/// Integer types usable as indices
pub trait IndexElement: bytemuck::Pod {
    /// Matching index type
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::U16;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::U32;
}

/// Engine-owned index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    buffer: GpuBuffer,
    index_count: u32,
    index_type: IndexType,
}

impl IndexBuffer {
    /// GPU buffer
    pub const fn buffer(&self) -> GpuBuffer {
        self.buffer
    }

    /// Number of indices
    pub const fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Index element type
    pub const fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Total byte size
    pub const fn byte_size(&self) -> usize {
        self.index_count as usize * self.index_type.byte_size() as usize
    }

    pub(crate) fn set_buffer<T: IndexElement>(&self, device: &mut dyn GraphicsDevice, indices: &[T]) -> EngineResult<()> {
        if T::INDEX_TYPE != self.index_type {
            return Err(EngineError::InvalidBuilder(format!(
                "index buffer holds {:?} indices, {:?} supplied",
                self.index_type,
                T::INDEX_TYPE
            )));
        }
        if indices.len() != self.index_count as usize {
            return Err(EngineError::SizeMismatch {
                expected: self.index_count as usize,
                actual: indices.len(),
            });
        }
        device.write_buffer(self.buffer, BufferTarget::ElementArray, bytemuck::cast_slice(indices))?;
        Ok(())
    }

    pub(crate) fn release(&self, device: &mut dyn GraphicsDevice) {
        device.delete_buffer(self.buffer);
    }
}

/// Builder for [`IndexBuffer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexBufferBuilder {
    index_count: u32,
    index_type: IndexType,
}

impl IndexBufferBuilder {
    /// Start an index buffer of 32-bit indices
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indices
    #[must_use]
    pub const fn index_count(mut self, count: u32) -> Self {
        self.index_count = count;
        self
    }

    /// Index element type
    #[must_use]
    pub const fn index_type(mut self, index_type: IndexType) -> Self {
        self.index_type = index_type;
        self
    }

    /// Allocate the GPU buffer and register it with the engine
    pub fn build(self, engine: &mut Engine) -> EngineResult<IndexBufferHandle> {
        if self.index_count == 0 {
            return Err(EngineError::InvalidBuilder("index count must be non-zero".to_string()));
        }
        let size = self.index_count as usize * self.index_type.byte_size() as usize;
        let buffer = engine.device_mut().create_buffer(BufferTarget::ElementArray, size)?;
        Ok(engine.insert_index_buffer(IndexBuffer {
            buffer,
            index_count: self.index_count,
            index_type: self.index_type,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;

    #[test]
    fn test_upload_u16_indices() {
        let mut engine = Engine::headless();
        let handle = IndexBufferBuilder::new()
            .index_count(3)
            .index_type(IndexType::U16)
            .build(&mut engine)
            .unwrap();
        engine.set_index_buffer(handle, &[0_u16, 1, 2]).unwrap();

        let buffer = engine.index_buffer(handle).unwrap().buffer();
        let device = engine.device().as_any().downcast_ref::<HeadlessDevice>().unwrap();
        assert_eq!(device.buffer_data(buffer).unwrap(), &[0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn test_mismatched_index_type_is_rejected() {
        let mut engine = Engine::headless();
        let handle = IndexBufferBuilder::new().index_count(3).build(&mut engine).unwrap();
        let result = engine.set_index_buffer(handle, &[0_u16, 1, 2]);
        assert!(matches!(result, Err(EngineError::InvalidBuilder(_))));
        assert!(matches!(
            engine.set_index_buffer(handle, &[0_u32, 1]),
            Err(EngineError::SizeMismatch { expected: 3, actual: 2 })
        ));
    }
}
