//! Draw-call batching.
//!
//! Scene objects are grouped into batches of mutually compatible shapes, each
//! drawn by one instanced call over a shared footprint. Batches never reorder
//! paint: a batch always covers a contiguous run of the paint order.
//!
//! Convention:
//! - instance records are interleaved `f32`s, addressed by field
//! - shape coordinates are relative to each object's logical origin; the
//!   object offset travels separately in `Translate`

mod ctx;

pub mod batch;
pub mod draw_call;
pub mod geometry;
pub mod manager;
pub mod partition;
pub mod program;
pub mod shapes;

pub use batch::{Batch, BatchId, MergeKey};
pub use ctx::{RenderContext, RendererConfig};
pub use draw_call::{DrawCall, SortKey, SurfaceHandle};
pub use geometry::{FieldId, GeometryBuffer, InstanceLayout};
pub use manager::{Frame, RenderStats, Renderer, SkippedObject};
pub use program::{ProgramDescriptor, ProgramId, ProgramRegistry};
pub use shapes::{ShapeBatcher, ShapeRegistry};
