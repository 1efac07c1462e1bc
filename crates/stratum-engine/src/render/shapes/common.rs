//! Footprints and record helpers shared by all shape batchers.

use crate::bounds::Bounds;
use crate::paint::Color;
use crate::render::geometry::{Footprint, FootprintAttr};
use crate::scene::{AttrKey, SceneObject};

// ── footprints ────────────────────────────────────────────────────────────

const POS_UV: &[FootprintAttr] = &[
    FootprintAttr { name: "a_Position", offset: 0, components: 2 },
    FootprintAttr { name: "a_Uv", offset: 2, components: 2 },
];

/// Unit segment along +x, one unit thick, centered on the axis.
///
/// The vertex shader stretches x to the segment length and y to the line width.
pub(super) static LINE_SEGMENT: Footprint = Footprint {
    vertices: &[
        0.0, -0.5, 0.0, 0.0, //
        1.0, -0.5, 1.0, 0.0, //
        1.0, 0.5, 1.0, 1.0, //
        0.0, 0.5, 0.0, 1.0,
    ],
    vertex_stride: 4,
    attributes: POS_UV,
    indices: &[0, 2, 1, 0, 3, 2],
};

/// Unit quad, 0..1 on both axes; uv equals position.
pub(super) static UNIT_QUAD: Footprint = Footprint {
    vertices: &[
        0.0, 0.0, 0.0, 0.0, //
        1.0, 0.0, 1.0, 0.0, //
        1.0, 1.0, 1.0, 1.0, //
        0.0, 1.0, 0.0, 1.0,
    ],
    vertex_stride: 4,
    attributes: POS_UV,
    indices: &[0, 1, 2, 0, 2, 3],
};

// ── record helpers ────────────────────────────────────────────────────────

/// Opaque black; what an unset constant stroke or fill resolves to.
pub(super) const DEFAULT_INK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Copies `values` into the front of `out`. Extra slots are left untouched.
#[inline]
pub(super) fn put(out: &mut [f32], values: &[f32]) {
    let n = out.len().min(values.len());
    out[..n].copy_from_slice(&values[..n]);
}

/// Object offset plus logical origin: the per-instance translation.
#[inline]
pub(super) fn translate(object: &SceneObject, bounds: &Bounds) -> [f32; 2] {
    (object.offset() + bounds.origin).to_array()
}

/// Per-instance color of a paint attribute, `default` when unset.
#[inline]
pub(super) fn paint_color(object: &SceneObject, key: AttrKey, default: [f32; 4]) -> [f32; 4] {
    object
        .attrs()
        .paint(key)
        .map(|p| p.instance_color())
        .unwrap_or(default)
}

/// Transparent; an unset secondary stroke draws nothing.
#[inline]
pub(super) fn no_ink() -> [f32; 4] {
    Color::transparent().to_array()
}
