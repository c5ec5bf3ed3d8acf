//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and OpenGL-convention matrix helpers
//! - Generation-checked handle types for engine-owned resources
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
