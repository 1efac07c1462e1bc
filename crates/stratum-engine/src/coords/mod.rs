//! Coordinate and geometry types shared by the bounds updater and batchers.
//!
//! Canonical CPU space:
//! - scene units, origin top-left
//! - +X right, +Y down
//!
//! Object attributes are declared in object-local space; the parent-relative
//! offset carried by each `SceneObject` moves them into its parent's space.

mod aabb;
mod vec2;

pub use aabb::Aabb;
pub use vec2::Vec2;
