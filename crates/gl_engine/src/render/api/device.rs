//! Graphics device abstraction
//!
//! [`GraphicsDevice`] is the seam between the engine core and the OpenGL
//! calls it issues. The renderer, the engine lifecycle code and the resource
//! wrappers only ever talk to this trait, which lets the same draw algorithm
//! run against the `glow` backend or the recording headless backend.
//!
//! Object handles are plain non-zero integers, matching GL object names.

use std::num::NonZeroU32;

use bitflags::bitflags;
use thiserror::Error;

/// Device-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The driver refused to create an object
    #[error("Failed to create {kind}: {message}")]
    ObjectCreation {
        /// Kind of object that could not be created
        kind: &'static str,
        /// Driver message
        message: String,
    },

    /// Mapping a buffer into client memory returned null
    #[error("Could not map vertex buffer {0:?}")]
    BufferMapFailed(GpuBuffer),

    /// Data size does not match the buffer's storage size
    #[error("Buffer {buffer:?} holds {expected} bytes but {actual} were supplied")]
    BufferSizeMismatch {
        /// Target buffer
        buffer: GpuBuffer,
        /// Storage size in bytes
        expected: usize,
        /// Supplied byte count
        actual: usize,
    },

    /// A shader stage failed to compile
    #[error("{stage:?} shader compilation failed: {log}")]
    ShaderCompilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Driver info log
        log: String,
    },

    /// The program failed to link
    #[error("Program link failed: {0}")]
    ShaderLink(String),

    /// The handle does not name a live object on this device
    #[error("Unknown device object: {0}")]
    UnknownObject(String),
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw GL object name
            pub const fn raw(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// GPU buffer object
    GpuBuffer
);
gpu_handle!(
    /// GPU vertex array object
    GpuVertexArray
);
gpu_handle!(
    /// Linked GPU program
    GpuProgram
);
gpu_handle!(
    /// GPU texture object
    GpuTexture
);

/// Global GPU capability toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Depth testing
    DepthTest,
    /// Multisample rasterization
    Multisample,
}

bitflags! {
    /// Framebuffer planes to clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color buffer
        const COLOR = 1 << 0;
        /// Depth buffer
        const DEPTH = 1 << 1;
    }
}

/// Rasterizer fill mode, applied to front and back faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Filled polygons
    #[default]
    Fill,
    /// Wireframe
    Line,
}

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data
    Array,
    /// Index data
    ElementArray,
}

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

/// Primitive topology of an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Connected line segments
    LineStrip,
    /// Independent triangles
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
}

/// Element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// 16-bit unsigned indices
    U16,
    /// 32-bit unsigned indices
    #[default]
    U32,
}

impl IndexType {
    /// Size of a single index in bytes
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Component layout of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeType {
    /// Four unsigned bytes
    UByte4,
    /// Two floats
    Float2,
    /// Three floats
    Float3,
    /// Four floats
    Float4,
    /// One unsigned int
    UInt,
}

impl AttributeType {
    /// Number of components per vertex
    pub const fn components(self) -> i32 {
        match self {
            Self::UInt => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::UByte4 | Self::Float4 => 4,
        }
    }

    /// Size of one attribute value in bytes
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::UByte4 | Self::UInt => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }
}

/// One attribute binding inside a vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeBinding {
    /// Shader attribute location
    pub location: u32,
    /// Source buffer
    pub buffer: GpuBuffer,
    /// Component layout
    pub attribute_type: AttributeType,
    /// Whether integer data is normalized to [0, 1]
    pub normalized: bool,
    /// Byte offset of the first value
    pub byte_offset: u32,
    /// Byte distance between consecutive values
    pub byte_stride: u32,
}

/// Everything needed to set up a vertex array in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexArrayDescriptor {
    /// Attribute bindings
    pub attributes: Vec<VertexAttributeBinding>,
    /// Index buffer wired into the vertex array
    pub index_buffer: GpuBuffer,
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TextureTarget {
    /// Two-dimensional sampler
    #[default]
    Texture2D,
}

/// Internal storage format of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Single 8-bit channel
    R8,
    /// Three 8-bit channels
    Rgb8,
    /// Four 8-bit channels
    #[default]
    Rgba8,
}

/// Channel layout of client pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Red only
    Red,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
}

impl PixelFormat {
    /// Channels per pixel
    pub const fn channels(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Component type of client pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// 8-bit unsigned components
    UnsignedByte,
    /// 16-bit unsigned components
    UnsignedShort,
}

impl PixelType {
    /// Bytes per component
    pub const fn byte_size(self) -> usize {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
        }
    }
}

/// Immutable texture description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Binding target
    pub target: TextureTarget,
    /// Internal format
    pub format: TextureFormat,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Number of mip levels to allocate
    pub levels: u32,
}

/// Value uploaded to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Boolean, uploaded as an int
    Bool(bool),
    /// Signed integer or sampler unit
    Int(i32),
    /// Scalar float
    Float(f32),
    /// Three-component vector
    Vec3([f32; 3]),
    /// Column-major 4x4 matrix
    Mat4([f32; 16]),
}

/// Trait implemented by every graphics backend
///
/// All methods are issued from the thread owning the GL context. Calls that
/// cannot fail on a healthy context return `()`; calls that allocate or
/// transfer data return a [`DeviceResult`].
pub trait GraphicsDevice {
    /// Human-readable backend name for logging
    fn name(&self) -> &'static str;

    /// Enable a global capability
    fn enable(&mut self, capability: Capability);

    /// Set the viewport rectangle (x, y, width, height)
    fn set_viewport(&mut self, viewport: [i32; 4]);

    /// Clear the given planes; `color` is used only for [`ClearFlags::COLOR`]
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    /// Set the rasterizer fill mode for front and back faces
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Create a buffer with immutable storage of `size` bytes
    fn create_buffer(&mut self, target: BufferTarget, size: usize) -> DeviceResult<GpuBuffer>;

    /// Replace the whole contents of a buffer
    ///
    /// `data` must be exactly the storage size given at creation.
    fn write_buffer(&mut self, buffer: GpuBuffer, target: BufferTarget, data: &[u8]) -> DeviceResult<()>;

    /// Read back the contents of a buffer into `out`
    fn read_buffer(&mut self, buffer: GpuBuffer, target: BufferTarget, out: &mut [u8]) -> DeviceResult<()>;

    /// Delete a buffer
    fn delete_buffer(&mut self, buffer: GpuBuffer);

    /// Create and fully configure a vertex array
    fn create_vertex_array(&mut self, descriptor: &VertexArrayDescriptor) -> DeviceResult<GpuVertexArray>;

    /// Bind a vertex array, or unbind with `None`
    fn bind_vertex_array(&mut self, vertex_array: Option<GpuVertexArray>);

    /// Delete a vertex array
    fn delete_vertex_array(&mut self, vertex_array: GpuVertexArray);

    /// Compile both stages and link them into a program
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<GpuProgram>;

    /// Make a program current, or none with `None`
    fn use_program(&mut self, program: Option<GpuProgram>);

    /// Delete a program
    fn delete_program(&mut self, program: GpuProgram);

    /// Set a named uniform on a program
    ///
    /// Names the program does not declare are ignored.
    fn set_uniform(&mut self, program: GpuProgram, name: &str, value: UniformValue);

    /// Allocate a texture
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> DeviceResult<GpuTexture>;

    /// Upload pixel data for one mip level
    fn upload_texture_image(
        &mut self,
        texture: GpuTexture,
        target: TextureTarget,
        level: u32,
        size: (u32, u32),
        format: PixelFormat,
        pixel_type: PixelType,
        data: &[u8],
    ) -> DeviceResult<()>;

    /// Generate the mip chain from level 0
    fn generate_mipmaps(&mut self, texture: GpuTexture, target: TextureTarget);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: GpuTexture);

    /// Delete a texture
    fn delete_texture(&mut self, texture: GpuTexture);

    /// Issue an indexed draw with the currently bound program and vertex array
    fn draw_elements(&mut self, topology: PrimitiveType, count: u32, index_type: IndexType, byte_offset: u32);

    /// Read RGBA8 pixels from the framebuffer, rows bottom-up
    fn read_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, out: &mut [u8]) -> DeviceResult<()>;

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to the mutable concrete backend type
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
