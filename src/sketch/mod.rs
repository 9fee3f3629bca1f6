/// Seeded wobble source.
pub mod random;

/// Line, polygon, ellipse, arc and curve outlines.
pub mod strokes;

/// Stroke replay of parsed SVG and glyph paths.
pub mod path;

pub use random::Randomizer;
