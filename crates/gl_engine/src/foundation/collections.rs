//! Handle types for engine-owned resources
//!
//! Every GPU-backed object the engine creates lives in a [`SlotMap`] arena and
//! is referred to by a generation-checked key. A key whose object has been
//! destroyed never resolves again, so use-after-destroy becomes a lookup
//! failure instead of a dangling reference.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Handle to a vertex buffer owned by the engine
    pub struct VertexBufferHandle;
    /// Handle to an index buffer owned by the engine
    pub struct IndexBufferHandle;
    /// Handle to a linked shader program owned by the engine
    pub struct ShaderHandle;
    /// Handle to a texture owned by the engine
    pub struct TextureHandle;
    /// Handle to a renderer owned by the engine
    pub struct RendererHandle;
    /// Handle to a view owned by the engine
    pub struct ViewHandle;
    /// Handle to a scene owned by the engine
    pub struct SceneHandle;
    /// Handle to a skybox owned by the engine
    pub struct SkyboxHandle;
}
