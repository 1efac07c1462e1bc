//! Stratum engine crate.
//!
//! Retained-mode rendering core: scene objects carry typed style attributes,
//! the renderer keeps their bounds current incrementally and compiles them into
//! instanced draw calls, grouping compatible shapes without ever reordering paint.
//! The `device` layer mirrors compiled batches into wgpu buffers and pipelines.

pub mod bounds;
pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;

pub use error::{CompileError, ConfigError, GeometryError};
