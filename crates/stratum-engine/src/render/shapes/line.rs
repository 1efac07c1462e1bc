//! Instanced line segments.
//!
//! One instance per line: endpoints relative to the object's logical origin, so a
//! parent translation only rewrites `Translate`.

use crate::bounds::{line_endpoints, Bounds};
use crate::paint::PaintClass;
use crate::render::geometry::{FieldDesc, FieldId, Footprint, InstanceLayout};
use crate::render::program::{ProgramVariant, ShaderSource};
use crate::scene::{AttrKey, Attributes, SceneObject, ShapeKind};

use super::common::{paint_color, put, translate, DEFAULT_INK, LINE_SEGMENT};
use super::ShapeBatcher;

const FIELDS: &[FieldDesc] = &[
    FieldDesc::new(FieldId::Translate, 0, 2),
    FieldDesc::new(FieldId::Points, 2, 4),
    FieldDesc::new(FieldId::Cap, 6, 1),
    FieldDesc::new(FieldId::Dash, 7, 3),
    FieldDesc::new(FieldId::Color, 10, 4),
    FieldDesc::new(FieldId::Width, 14, 1),
];

static LAYOUT: InstanceLayout = InstanceLayout::new(FIELDS);

const WGSL: &str = include_str!("shaders/line.wgsl");

static PROGRAMS: &[ProgramVariant] = &[
    ProgramVariant {
        name: "instanced-line",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_solid"),
        paints: &[PaintClass::Constant],
        texture_slots: 0,
    },
    ProgramVariant {
        name: "instanced-line-textured",
        shaders: ShaderSource::new(WGSL, "vs_main", "fs_textured"),
        paints: &[PaintClass::Gradient, PaintClass::Pattern],
        texture_slots: 1,
    },
];

/// `(dashOffset, dashSegmentPercent, dashRatioInFirstSegment)` of a solid line.
pub const SOLID_DASH: [f32; 3] = [0.0, 1.0, 0.0];

/// Dash parameters normalized to the segment length.
///
/// Degenerate input (no pattern, zero-length line, zero pattern sum) is solid.
pub fn dash_params(attrs: &Attributes) -> [f32; 3] {
    let Some(dash) = attrs.numbers(AttrKey::LineDash).filter(|d| !d.is_empty()) else {
        return SOLID_DASH;
    };
    let [a, b] = line_endpoints(attrs);
    let total = a.distance(b);
    let sum: f32 = dash.iter().sum();
    if !(total > 0.0 && sum > 0.0) {
        return SOLID_DASH;
    }
    let offset = attrs.number_or(AttrKey::LineDashOffset, 0.0);
    [offset / total, sum / total, dash[0] / sum]
}

#[derive(Debug)]
pub struct LineBatcher;

pub static LINE: LineBatcher = LineBatcher;

impl ShapeBatcher for LineBatcher {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn layout(&self) -> &'static InstanceLayout {
        &LAYOUT
    }

    fn footprint(&self) -> &'static Footprint {
        &LINE_SEGMENT
    }

    fn programs(&self) -> &'static [ProgramVariant] {
        PROGRAMS
    }

    fn primary_paint(&self) -> AttrKey {
        AttrKey::Stroke
    }

    fn merge_attrs(&self) -> &'static [AttrKey] {
        &[AttrKey::Stroke, AttrKey::BlendMode]
    }

    fn fields_for(&self, key: AttrKey) -> &'static [FieldId] {
        match key {
            AttrKey::X1 | AttrKey::Y1 | AttrKey::X2 | AttrKey::Y2 | AttrKey::Anchor => {
                &[FieldId::Points, FieldId::Translate, FieldId::Dash]
            }
            AttrKey::LineDash | AttrKey::LineDashOffset => &[FieldId::Dash],
            AttrKey::LineCap => &[FieldId::Cap],
            AttrKey::LineWidth => &[FieldId::Width],
            AttrKey::Stroke => &[FieldId::Color],
            _ => &[],
        }
    }

    fn write_field(&self, object: &SceneObject, bounds: &Bounds, field: FieldId, out: &mut [f32]) {
        let attrs = object.attrs();
        match field {
            FieldId::Translate => put(out, &translate(object, bounds)),
            FieldId::Points => {
                let [a, b] = line_endpoints(attrs);
                let (a, b) = (a - bounds.origin, b - bounds.origin);
                put(out, &[a.x, a.y, b.x, b.y]);
            }
            FieldId::Cap => {
                let cap = attrs.line_cap(AttrKey::LineCap).unwrap_or_default();
                put(out, &[cap.code()]);
            }
            FieldId::Dash => put(out, &dash_params(attrs)),
            FieldId::Color => put(out, &paint_color(object, AttrKey::Stroke, DEFAULT_INK)),
            FieldId::Width => put(out, &[attrs.number_or(AttrKey::LineWidth, 1.0)]),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds;
    use crate::coords::Vec2;
    use crate::paint::{Color, Paint, Pattern, Repetition};
    use crate::scene::LineCap;

    fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> SceneObject {
        SceneObject::new(ShapeKind::Line)
            .with(AttrKey::X1, x1)
            .with(AttrKey::Y1, y1)
            .with(AttrKey::X2, x2)
            .with(AttrKey::Y2, y2)
    }

    fn record(o: &SceneObject) -> Vec<f32> {
        let b = bounds::update(o.kind(), o.attrs(), Bounds::default());
        let mut r = vec![0.0; LAYOUT.stride()];
        LINE.write_instance(o, &b, &mut r);
        r
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn record_is_fifteen_floats() {
        assert_eq!(LAYOUT.stride(), 15);
        assert_eq!(LINE_SEGMENT.vertex_count(), 4);
        assert_eq!(LINE_SEGMENT.indices, &[0, 2, 1, 0, 3, 2]);
    }

    // ── dash ──────────────────────────────────────────────────────────────

    #[test]
    fn no_dash_is_solid() {
        assert_eq!(dash_params(line(0.0, 0.0, 10.0, 0.0).attrs()), SOLID_DASH);
    }

    #[test]
    fn dash_is_normalized_to_length() {
        let o = line(0.0, 0.0, 100.0, 0.0)
            .with(AttrKey::LineDash, vec![10.0f32, 30.0])
            .with(AttrKey::LineDashOffset, 5.0f32);
        let [offset, percent, ratio] = dash_params(o.attrs());
        assert!((offset - 0.05).abs() < 1e-6);
        assert!((percent - 0.4).abs() < 1e-6);
        assert!((ratio - 0.25).abs() < 1e-6);
    }

    #[test]
    fn degenerate_dash_is_solid() {
        let zero_len = line(3.0, 3.0, 3.0, 3.0).with(AttrKey::LineDash, vec![2.0f32, 2.0]);
        assert_eq!(dash_params(zero_len.attrs()), SOLID_DASH);

        let zero_sum = line(0.0, 0.0, 10.0, 0.0).with(AttrKey::LineDash, vec![0.0f32, 0.0]);
        assert_eq!(dash_params(zero_sum.attrs()), SOLID_DASH);
    }

    // ── record ────────────────────────────────────────────────────────────

    #[test]
    fn endpoints_are_relative_to_origin() {
        let o = line(10.0, 20.0, 30.0, 60.0).with_offset(Vec2::new(100.0, 200.0));
        let r = record(&o);
        // default anchor (0, 0): origin is the box min
        assert_eq!(&r[0..2], &[110.0, 220.0]);
        assert_eq!(&r[2..6], &[0.0, 0.0, 20.0, 40.0]);
    }

    #[test]
    fn cap_width_and_color_fields() {
        let o = line(0.0, 0.0, 1.0, 0.0)
            .with(AttrKey::LineCap, LineCap::Square)
            .with(AttrKey::LineWidth, 4.0f32)
            .with(AttrKey::Stroke, Paint::solid(Color::from_straight(1.0, 0.0, 0.0, 0.5)));
        let r = record(&o);
        assert_eq!(r[6], 3.0);
        assert_eq!(&r[7..10], &SOLID_DASH);
        assert_eq!(&r[10..14], &[0.5, 0.0, 0.0, 0.5]);
        assert_eq!(r[14], 4.0);
    }

    #[test]
    fn pattern_stroke_is_white_tinted() {
        let pattern = Paint::Pattern(Pattern::new("p.png", (4, 4), Repetition::Repeat));
        let o = line(0.0, 0.0, 1.0, 0.0).with(AttrKey::Stroke, pattern);
        assert_eq!(&record(&o)[10..14], &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn endpoint_change_touches_points_translate_and_dash() {
        let f = LINE.fields_for(AttrKey::X2);
        for field in [FieldId::Points, FieldId::Translate, FieldId::Dash] {
            assert!(f.contains(&field), "{field:?}");
        }
        assert_eq!(LINE.fields_for(AttrKey::LineCap), &[FieldId::Cap]);
        assert!(LINE.fields_for(AttrKey::Fill).is_empty());
    }
}
