//! GPU resources owned by the engine
//!
//! Every resource is created through a builder whose `build` registers it
//! with the [`Engine`](crate::Engine) and returns a generation-checked
//! handle. The engine releases the GPU objects when the handle is destroyed
//! or when the engine itself shuts down.

pub mod index_buffer;
pub mod shader;
pub mod texture;
pub mod vertex_buffer;

pub use index_buffer::{IndexBuffer, IndexBufferBuilder, IndexElement, IndexType};
pub use shader::{uniform, Shader, ShaderBuilder, ShaderError, ShadingModel};
pub use texture::{
    PixelBufferDescriptor, PixelFormat, PixelType, Texture, TextureBuilder, TextureFormat,
    TextureTarget,
};
pub use vertex_buffer::{AttributeInfo, AttributeType, VertexAttribute, VertexBuffer, VertexBufferBuilder};
