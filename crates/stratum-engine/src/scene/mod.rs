//! Scene model consumed by the renderer.
//!
//! Responsibilities:
//! - closed shape-kind tag set and typed style attributes
//! - version-counted scene objects (the renderer's change-detection source)
//! - a small host-side store with paint order and buffered change events

mod attrs;
mod graph;
mod kind;
mod object;

pub use attrs::{AttrKey, AttrValue, Attributes};
pub use graph::{Scene, SceneChange};
pub use kind::{BlendMode, LineCap, ShapeKind};
pub use object::{ObjectId, SceneObject};
