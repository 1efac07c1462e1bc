/// Closed set of drawable shape kinds.
///
/// Every hot-path decision (bounds dependencies, batcher lookup, program routing)
/// dispatches on this tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Line,
    Polyline,
    Polygon,
    Path,
    Circle,
    Rect,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Line,
        ShapeKind::Polyline,
        ShapeKind::Polygon,
        ShapeKind::Path,
        ShapeKind::Circle,
        ShapeKind::Rect,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Path => "path",
            ShapeKind::Circle => "circle",
            ShapeKind::Rect => "rect",
        }
    }
}

impl core::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stroke end-cap style.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Shader-side cap code.
    #[inline]
    pub const fn code(self) -> f32 {
        match self {
            LineCap::Butt => 1.0,
            LineCap::Round => 2.0,
            LineCap::Square => 3.0,
        }
    }
}

/// Compositing mode. Part of the pipeline state, so it participates in batching.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Additive,
}
