//! Hand-drawn vector geometry, deterministically.
//!
//! Describe a shape, pick a bundle of style options and a canvas size, and
//! this library hands back the wobbly, drawn-twice strokes and hachure (or
//! scribble, dots, zigzag...) fills of a sketch as plain move/line/curve
//! operations. Nothing is rasterized: a renderer walks the operations, or
//! the ready-made render commands, and paints them however it likes.
//!
//! Every generation call is seeded from its options, so the same request
//! always produces the same geometry. That's what makes the caches and the
//! looped "boiling line" animation frames possible.
//!
//! Loosely modelled on [`rough.js`].
//!
//! [`rough.js`]: https://roughjs.com

/// Frame variants for looped animation.
pub mod animation;

/// Generator and drawing memoization.
pub mod cache;

/// Generation entry point, the drawing model and render commands.
pub mod context;

pub mod errors;

/// Shapes, fills, brush outlines and the geometry helpers behind them.
pub mod geometry;

/// Style options.
pub mod options;

/// Seeded wobble and the per-shape stroke builders.
pub mod sketch;

/// Make your life easy! Just import prelude::* and get drawing.
pub mod prelude {
    pub use crate::animation::{
        AnimationConfig, AnimationEngine, AnimationFrameCache, AnimationSpeed, AnimationVariance,
    };
    pub use crate::cache::{CacheConfig, CacheStats, DrawingCache, DrawingKey, GeneratorCache};
    pub use crate::context::{
        Context, Drawing, Generator, OpSetKind, Operation, OperationSet, RenderStyle,
        RoughRenderCommand,
    };
    pub use crate::errors::{RoughError, RoughResult};
    pub use crate::geometry::brush::{BrushProfile, BrushTip, LineCap, LineJoin, ThicknessProfile};
    pub use crate::geometry::shapes::{
        CanvasSize, GlyphOutline, GlyphOutlineSource, ShapeDescriptor,
    };
    pub use crate::geometry::svg::PathCommand;
    pub use crate::options::{FillStrokeAlignment, FillStyle, RenderOptions};
}
