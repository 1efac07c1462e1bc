//! Instanced axis-aligned rectangles over the unit quad.

use crate::bounds::Bounds;
use crate::coords::Vec2;
use crate::paint::PaintClass;
use crate::render::geometry::{FieldDesc, FieldId, Footprint, InstanceLayout};
use crate::render::program::{ProgramVariant, ShaderSource};
use crate::scene::{AttrKey, SceneObject, ShapeKind};

use super::common::{no_ink, paint_color, put, translate, DEFAULT_INK, UNIT_QUAD};
use super::ShapeBatcher;

const FIELDS: &[FieldDesc] = &[
    FieldDesc::new(FieldId::Translate, 0, 2),
    FieldDesc::new(FieldId::Extent, 2, 4),
    FieldDesc::new(FieldId::Color, 6, 4),
    FieldDesc::new(FieldId::StrokeColor, 10, 4),
    FieldDesc::new(FieldId::StrokeWidth, 14, 1),
];

static LAYOUT: InstanceLayout = InstanceLayout::new(FIELDS);

const WGSL: &str = include_str!("shaders/rect.wgsl");

static PROGRAMS: &[ProgramVariant] = &[
    ProgramVariant {
        name: "rect",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_solid"),
        paints: &[PaintClass::Constant],
        texture_slots: 0,
    },
    ProgramVariant {
        name: "rect-textured",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_textured"),
        paints: &[PaintClass::Gradient, PaintClass::Pattern],
        texture_slots: 1,
    },
];

/// Min corner and size of the declared rect; negative sizes are normalized.
fn declared(object: &SceneObject) -> (Vec2, Vec2) {
    let attrs = object.attrs();
    let p = Vec2::new(attrs.number_or(AttrKey::X, 0.0), attrs.number_or(AttrKey::Y, 0.0));
    let size = Vec2::new(
        attrs.number_or(AttrKey::Width, 0.0),
        attrs.number_or(AttrKey::Height, 0.0),
    );
    let q = p + size;
    (p.min(q), q.max(p) - p.min(q))
}

#[derive(Debug)]
pub struct RectBatcher;

pub static RECT: RectBatcher = RectBatcher;

impl ShapeBatcher for RectBatcher {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rect
    }

    fn layout(&self) -> &'static InstanceLayout {
        &LAYOUT
    }

    fn footprint(&self) -> &'static Footprint {
        &UNIT_QUAD
    }

    fn programs(&self) -> &'static [ProgramVariant] {
        PROGRAMS
    }

    fn primary_paint(&self) -> AttrKey {
        AttrKey::Fill
    }

    fn merge_attrs(&self) -> &'static [AttrKey] {
        &[AttrKey::Fill, AttrKey::Stroke, AttrKey::BlendMode]
    }

    fn fields_for(&self, key: AttrKey) -> &'static [FieldId] {
        match key {
            AttrKey::X | AttrKey::Y | AttrKey::Width | AttrKey::Height | AttrKey::Anchor => {
                &[FieldId::Translate, FieldId::Extent]
            }
            AttrKey::LineWidth => &[FieldId::StrokeWidth],
            AttrKey::Fill => &[FieldId::Color],
            AttrKey::Stroke => &[FieldId::StrokeColor],
            _ => &[],
        }
    }

    fn write_field(&self, object: &SceneObject, bounds: &Bounds, field: FieldId, out: &mut [f32]) {
        match field {
            FieldId::Translate => put(out, &translate(object, bounds)),
            FieldId::Extent => {
                let (min, size) = declared(object);
                let rel = min - bounds.origin;
                put(out, &[rel.x, rel.y, size.x, size.y]);
            }
            FieldId::Color => put(out, &paint_color(object, AttrKey::Fill, DEFAULT_INK)),
            FieldId::StrokeColor => put(out, &paint_color(object, AttrKey::Stroke, no_ink())),
            FieldId::StrokeWidth => {
                put(out, &[object.attrs().number_or(AttrKey::LineWidth, 0.0).max(0.0)])
            }
            _ => {}
        }
    }
}
