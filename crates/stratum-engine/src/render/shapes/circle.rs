//! Instanced circles over the unit quad.

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
    FieldDesc::new(FieldId::Center, 2, 2),
    FieldDesc::new(FieldId::Radius, 4, 1),
    FieldDesc::new(FieldId::Color, 5, 4),
    FieldDesc::new(FieldId::StrokeColor, 9, 4),
    FieldDesc::new(FieldId::StrokeWidth, 13, 1),
];

static LAYOUT: InstanceLayout = InstanceLayout::new(FIELDS);

const WGSL: &str = include_str!("shaders/circle.wgsl");

// Patterns on circles have no program; such circles are reported and skipped.
static PROGRAMS: &[ProgramVariant] = &[
    ProgramVariant {
        name: "circle",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_solid"),
        paints: &[PaintClass::Constant],
        texture_slots: 0,
    },
    ProgramVariant {
        name: "circle-gradient",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_gradient"),
        paints: &[PaintClass::Gradient],
        texture_slots: 1,
    },
];

#[derive(Debug)]
pub struct CircleBatcher;

pub static CIRCLE: CircleBatcher = CircleBatcher;

impl ShapeBatcher for CircleBatcher {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
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
            AttrKey::Cx | AttrKey::Cy | AttrKey::R | AttrKey::Anchor => {
                &[FieldId::Translate, FieldId::Center, FieldId::Radius]
            }
            AttrKey::LineWidth => &[FieldId::StrokeWidth],
            AttrKey::Fill => &[FieldId::Color],
            AttrKey::Stroke => &[FieldId::StrokeColor],
            _ => &[],
        }
    }

    fn write_field(&self, object: &SceneObject, bounds: &Bounds, field: FieldId, out: &mut [f32]) {
        let attrs = object.attrs();
        match field {
            FieldId::Translate => put(out, &translate(object, bounds)),
            FieldId::Center => {
                let c = Vec2::new(
                    attrs.number_or(AttrKey::Cx, 0.0),
                    attrs.number_or(AttrKey::Cy, 0.0),
                );
                put(out, &(c - bounds.origin).to_array());
            }
            FieldId::Radius => put(out, &[attrs.number_or(AttrKey::R, 0.0).abs()]),
            FieldId::Color => put(out, &paint_color(object, AttrKey::Fill, DEFAULT_INK)),
            FieldId::StrokeColor => put(out, &paint_color(object, AttrKey::Stroke, no_ink())),
            FieldId::StrokeWidth => put(out, &[attrs.number_or(AttrKey::LineWidth, 0.0).max(0.0)]),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds;
    use crate::paint::{Color, Paint};

    #[test]
    fn record_centers_on_declared_center() {
        let o = SceneObject::new(ShapeKind::Circle)
            .with(AttrKey::Cx, 50.0f32)
            .with(AttrKey::Cy, 40.0f32)
            .with(AttrKey::R, -10.0f32)
            .with(AttrKey::Anchor, Vec2::splat(0.5))
            .with(AttrKey::Fill, Paint::solid(Color::white()));
        let b = bounds::update(o.kind(), o.attrs(), Bounds::default());
        let mut r = vec![0.0; LAYOUT.stride()];
        CIRCLE.write_instance(&o, &b, &mut r);

        // centered anchor: the origin is the circle center
        assert_eq!(&r[0..2], &[50.0, 40.0]);
        assert_eq!(&r[2..4], &[0.0, 0.0]);
        assert_eq!(r[4], 10.0);
        assert_eq!(&r[5..9], &[1.0; 4]);
        assert_eq!(&r[9..13], &[0.0; 4]);
        assert_eq!(r[13], 0.0);
    }

    #[test]
    fn fill_and_stroke_patch_separate_fields() {
        assert_eq!(CIRCLE.fields_for(AttrKey::Fill), &[FieldId::Color]);
        assert_eq!(CIRCLE.fields_for(AttrKey::Stroke), &[FieldId::StrokeColor]);
        assert!(CIRCLE.fields_for(AttrKey::X1).is_empty());
    }
}
