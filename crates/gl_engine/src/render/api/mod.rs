//! Public rendering API
//!
//! The device trait every backend implements, plus the plain-data types that
//! flow across it.

pub mod device;

pub use device::{
    AttributeType, BufferTarget, Capability, ClearFlags, DeviceError, DeviceResult, GpuBuffer,
    GpuProgram, GpuTexture, GpuVertexArray, GraphicsDevice, IndexType, PixelFormat, PixelType,
    PolygonMode, PrimitiveType, ShaderStage, TextureDescriptor, TextureFormat, TextureTarget,
    UniformValue, VertexArrayDescriptor, VertexAttributeBinding,
};
