//! # Core Engine Module
//!
//! Shared configuration types used by the window context, the renderer and
//! the asset helpers.

pub mod config;

pub use config::{
    EngineConfig,
    WindowConfig,
    RendererConfig,
    AssetConfig,
    Config,
    ConfigError,
};
