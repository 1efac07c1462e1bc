//! Error taxonomy of the batching core.
//!
//! - [`ConfigError`]: per-object, the object is skipped and the frame continues
//! - [`CompileError`]: per-frame, recoverable; nothing is mutated on failure
//! - [`GeometryError`]: batch-internal misuse of a geometry buffer
//!
//! Degenerate geometry (zero-length lines, empty point lists) is never an error.

use thiserror::Error;

use crate::paint::PaintClass;
use crate::render::geometry::FieldId;
use crate::scene::ShapeKind;

/// An object cannot be rendered with the current registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no batcher registered for shape kind `{0}`")]
    UnknownShape(ShapeKind),

    #[error("no program registered for `{kind}` with {paint:?} paint")]
    MissingProgram { kind: ShapeKind, paint: PaintClass },
}

/// A frame could not be compiled. The previous frame stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(
        "{kind} batch of {members} members needs {bytes} bytes, \
         above the {limit}-byte buffer limit; cap members per batch and retry"
    )]
    BufferTooLarge {
        kind: ShapeKind,
        members: usize,
        bytes: u64,
        limit: u64,
    },
}

/// Invalid access to a geometry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("field layout is locked after patching; rebuild to change it")]
    LayoutLocked,

    #[error("field {0:?} is not part of this layout")]
    UnknownField(FieldId),

    #[error("field {field:?} has {expected} components, got {got}")]
    ComponentMismatch {
        field: FieldId,
        expected: usize,
        got: usize,
    },

    #[error("member {index} out of range ({count} members)")]
    MemberOutOfRange { index: usize, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_kind() {
        let e = ConfigError::UnknownShape(ShapeKind::Polyline);
        assert_eq!(e.to_string(), "no batcher registered for shape kind `polyline`");

        let e = CompileError::BufferTooLarge {
            kind: ShapeKind::Line,
            members: 10,
            bytes: 600,
            limit: 256,
        };
        assert!(e.to_string().starts_with("line batch of 10 members needs 600 bytes"));
    }
}
