use core::hash::{Hash, Hasher};

/// How a pattern image tiles across the painted area.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Repetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

/// Image pattern paint.
///
/// `image` names the underlying resource (asset key or URI). Two patterns are the
/// same resource when image, size and repetition all match; the object holding the
/// pattern is irrelevant.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub image: String,
    /// Source image size in pixels.
    pub size: (u32, u32),
    pub repetition: Repetition,
}

impl Pattern {
    pub fn new(image: impl Into<String>, size: (u32, u32), repetition: Repetition) -> Self {
        Self { image: image.into(), size, repetition }
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.image.hash(state);
        self.size.hash(state);
        self.repetition.hash(state);
    }
}
