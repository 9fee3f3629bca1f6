//! Provides the [`Context`] entry point: hand it a [`ShapeDescriptor`], a
//! [`RenderOptions`] bundle and a [`CanvasSize`] and it gives back a cached,
//! shareable [`Drawing`] of sketchy stroke and fill operations.
//!
//! # Example
//!
//! ```rust
//! use roughplot::prelude::*;
//!
//! let mut ctx = Context::new();
//! let rect = ShapeDescriptor::Rectangle { x: 10.0, y: 10.0, width: 100.0, height: 80.0 };
//! let options = RenderOptions::default().with_fill(Some("red"));
//! let drawing = ctx
//!     .generate(&rect, &options, CanvasSize::new(200.0, 200.0))
//!     .expect("a rectangle always draws");
//! assert_eq!(drawing.sets.len(), 2);
//!
//! // Same request, same drawing, straight from the cache.
//! let again = ctx.generate(&rect, &options, CanvasSize::new(200.0, 200.0));
//! assert_eq!(again.as_deref(), Some(&*drawing));
//! assert_eq!(ctx.stats().drawings.hits, 1);
//! ```
use crate::cache::{CacheConfig, CacheStats, DrawingCache, DrawingKey, GeneratorCache};
use crate::geometry::flatten::{flatten_cubic, path_rings, FLATNESS_TOLERANCE};
use crate::geometry::hatch::{pattern_fill, prepare_rings, solid_fill_polygon};
use crate::geometry::rings_bounds;
use crate::geometry::shapes::{rounded_rect_commands, CanvasSize, ShapeDescriptor};
use crate::geometry::spline::through_points;
use crate::geometry::stroke::stroke_to_fill;
use crate::geometry::svg::{commands_bez_path, parse_path_data, path_data_string, PathCommand};
use crate::options::{FillStyle, RenderOptions};
use crate::sketch::path::{fill_shape_options, merged_shape, svg_path};
use crate::sketch::random::Randomizer;
use crate::sketch::strokes;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod operation;
pub mod render_command;

pub use operation::{Drawing, OpSetKind, Operation, OperationSet};
pub use render_command::{RenderStyle, RoughRenderCommand};

/// Stroke outline plus optional fill of one shape, before assembly.
struct ShapeSets {
    stroke: OperationSet,
    fill: Option<OperationSet>,
}

fn finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn finite_points(points: &[Point]) -> bool {
    points.iter().all(|p| p.is_finite())
}

fn retag(set: OperationSet, kind: OpSetKind) -> OperationSet {
    OperationSet { kind, ..set }
}

/// An ellipse or arc with a zero radius encloses nothing.
fn has_area(width: f64, height: f64) -> bool {
    (width * height).abs() > 0.0
}

/// Polygon through a smooth curve's points, for pattern fills.
fn curve_polygon(points: &[Point], o: &RenderOptions) -> Vec<Point> {
    let mut out = vec![points[0]];
    for c in through_points(points, o.curve_tightness) {
        flatten_cubic(&c, FLATNESS_TOLERANCE, &mut out);
    }
    out
}

/// Sketches shapes for one canvas size. Generators hold no mutable state;
/// every call draws from a fresh PRNG seeded by the options.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Generator {
    size: CanvasSize,
}

impl Generator {
    pub fn new(size: CanvasSize) -> Generator {
        Generator { size }
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Sketch `shape`. `None` when its parameters are missing or not finite;
    /// degenerate geometry contributes nothing and may leave the drawing
    /// without sets.
    pub fn generate(&self, shape: &ShapeDescriptor, options: &RenderOptions) -> Option<Drawing> {
        let o = options.clamped();
        let mut rng = Randomizer::for_options(&o);
        let parts = match shape {
            ShapeDescriptor::Line { from, to } => {
                if !finite_points(&[*from, *to]) {
                    return None;
                }
                ShapeSets {
                    stroke: strokes::line(*from, *to, &mut rng, &o),
                    fill: None,
                }
            }
            ShapeDescriptor::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                if !finite(&[*x, *y, *width, *height]) {
                    return None;
                }
                let points = strokes::rectangle_points(*x, *y, *width, *height);
                self.polygon_sets(&points, &mut rng, &o)
            }
            ShapeDescriptor::Polygon { points } => {
                if points.len() < 3 || !finite_points(points) {
                    return None;
                }
                self.polygon_sets(points, &mut rng, &o)
            }
            ShapeDescriptor::RoundedRectangle {
                x,
                y,
                width,
                height,
                corner_radius,
            } => {
                if !finite(&[*x, *y, *width, *height, *corner_radius]) {
                    return None;
                }
                let commands = rounded_rect_commands(*x, *y, *width, *height, *corner_radius);
                let stroke = svg_path(&commands, &mut rng, &o);
                let fill = if o.has_fill() {
                    let rings = path_rings(&commands_bez_path(&commands));
                    pattern_fill(&rings, &mut rng, &o)
                } else {
                    None
                };
                ShapeSets { stroke, fill }
            }
            ShapeDescriptor::Ellipse {
                x,
                y,
                width,
                height,
            } => {
                if !finite(&[*x, *y, *width, *height]) {
                    return None;
                }
                self.ellipse_sets(Point::new(*x, *y), *width, *height, &mut rng, &o)
            }
            ShapeDescriptor::Circle { x, y, diameter } => {
                if !finite(&[*x, *y, *diameter]) {
                    return None;
                }
                self.ellipse_sets(Point::new(*x, *y), *diameter, *diameter, &mut rng, &o)
            }
            ShapeDescriptor::Arc {
                x,
                y,
                width,
                height,
                start,
                stop,
                closed,
            } => {
                if !finite(&[*x, *y, *width, *height, *start, *stop]) {
                    return None;
                }
                let center = Point::new(*x, *y);
                let stroke = strokes::arc(
                    center, *width, *height, *start, *stop, *closed, true, &mut rng, &o,
                );
                let fill = if *closed && o.has_fill() && has_area(*width, *height) {
                    if o.fill_style == FillStyle::Solid {
                        let solid_o = RenderOptions {
                            disable_multi_stroke: true,
                            ..o.clone()
                        };
                        let shape = strokes::arc(
                            center, *width, *height, *start, *stop, true, false, &mut rng,
                            &solid_o,
                        );
                        Some(retag(shape, OpSetKind::FillSolidPath))
                    } else {
                        let points = strokes::arc_fill_points(
                            center, *width, *height, *start, *stop, &mut rng, &o,
                        );
                        pattern_fill(&[points], &mut rng, &o)
                    }
                } else {
                    None
                };
                ShapeSets { stroke, fill }
            }
            ShapeDescriptor::Curve { points } => {
                if points.len() < 2 || !finite_points(points) {
                    return None;
                }
                let stroke = strokes::curve(points, &mut rng, &o);
                let fill = if o.has_fill()
                    && prepare_rings(&[curve_polygon(points, &o)]).is_some()
                {
                    if o.fill_style == FillStyle::Solid {
                        let shape = strokes::curve(points, &mut rng, &fill_shape_options(&o));
                        Some(OperationSet::new(
                            OpSetKind::FillSolidPath,
                            merged_shape(shape.ops),
                        ))
                    } else {
                        pattern_fill(&[curve_polygon(points, &o)], &mut rng, &o)
                    }
                } else {
                    None
                };
                ShapeSets { stroke, fill }
            }
            ShapeDescriptor::LinearPath { points, closed } => {
                if points.len() < 2 || !finite_points(points) {
                    return None;
                }
                ShapeSets {
                    stroke: strokes::linear_path(points, *closed, &mut rng, &o),
                    fill: None,
                }
            }
            ShapeDescriptor::SvgPath { d } => {
                let commands = parse_path_data(d).ok()?;
                self.path_sets(&commands, d, &mut rng, &o)
            }
            ShapeDescriptor::TextPath { commands } => {
                if commands.is_empty() {
                    return None;
                }
                let d = path_data_string(commands);
                self.path_sets(commands, &d, &mut rng, &o)
            }
        };

        let stroke_width = if matches!(
            shape,
            ShapeDescriptor::SvgPath { .. } | ShapeDescriptor::TextPath { .. }
        ) {
            o.for_svg().stroke_width
        } else {
            o.stroke_width
        };
        let stroke = if o.brush_profile.requires_custom_rendering() && !parts.stroke.is_empty() {
            let outline = stroke_to_fill(&parts.stroke.to_bez_path(), stroke_width, &o.brush_profile);
            OperationSet::from_bez_path(OpSetKind::FillSolidPath, &outline).as_outlined_stroke()
        } else {
            parts.stroke
        };

        let mut sets = vec![];
        sets.extend(parts.fill.filter(|s| !s.is_empty()));
        if o.has_stroke() && !stroke.is_empty() {
            sets.push(stroke);
        }
        Some(Drawing::new(shape.tag(), sets, o))
    }

    fn polygon_sets(&self, points: &[Point], rng: &mut Randomizer, o: &RenderOptions) -> ShapeSets {
        let stroke = strokes::polygon(points, rng, o);
        let fill = if o.has_fill() {
            pattern_fill(&[points.to_vec()], rng, o)
        } else {
            None
        };
        ShapeSets { stroke, fill }
    }

    fn ellipse_sets(
        &self,
        center: Point,
        width: f64,
        height: f64,
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> ShapeSets {
        if width == 0.0 && height == 0.0 {
            tracing::trace!(?center, "skipping zero radius ellipse");
            return ShapeSets {
                stroke: OperationSet::new(OpSetKind::StrokePath, vec![]),
                fill: None,
            };
        }
        let params = strokes::ellipse_params(width, height, rng, o);
        let outline = strokes::ellipse_with_params(center, &params, rng, o);
        let fill = if o.has_fill() && has_area(width, height) {
            if o.fill_style == FillStyle::Solid {
                let shape = strokes::ellipse_with_params(center, &params, rng, o).opset;
                Some(retag(shape, OpSetKind::FillSolidPath))
            } else {
                pattern_fill(&[outline.estimated_points], rng, o)
            }
        } else {
            None
        };
        ShapeSets {
            stroke: outline.opset,
            fill,
        }
    }

    /// Parsed SVG or glyph outline. `d` is the path data carried on fill
    /// sets for renderers that fill from the raw path.
    fn path_sets(
        &self,
        commands: &[PathCommand],
        d: &str,
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> ShapeSets {
        let o = o.for_svg();
        let stroke = svg_path(commands, rng, &o);
        if !o.has_visible_fill() {
            return ShapeSets { stroke, fill: None };
        }
        let rings = path_rings(&commands_bez_path(commands));
        let fill = if o.fill_style == FillStyle::Solid {
            match prepare_rings(&rings) {
                None => None,
                Some(_) if rings.len() == 1 => {
                    let shape = svg_path(commands, rng, &fill_shape_options(&o));
                    Some(OperationSet::new(OpSetKind::SvgFillSolid, merged_shape(shape.ops)).with_path(d))
                }
                Some(filled) => Some(solid_fill_polygon(&filled, rng, &o).with_path(d)),
            }
        } else {
            pattern_fill(&rings, rng, &o).map(|set| {
                let set = retag(set, OpSetKind::SvgFillPattern).with_path(d);
                match rings_bounds(&rings) {
                    Some(b) => set.with_size(CanvasSize::new(b.width(), b.height())),
                    None => set,
                }
            })
        };
        ShapeSets { stroke, fill }
    }
}

/// Snapshot of both caches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ContextStats {
    pub generators: CacheStats,
    pub drawings: CacheStats,
}

/// # Context
///
/// Owns the generator and drawing caches and routes every request through
/// them. A context is single-owner mutable state; share one across threads
/// behind a lock.
#[derive(Debug, Clone)]
pub struct Context {
    generators: GeneratorCache,
    drawings: DrawingCache,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Context {
        Context::with_config(&CacheConfig::default())
    }

    pub fn with_config(config: &CacheConfig) -> Context {
        Context {
            generators: GeneratorCache::new(config.generator_capacity),
            drawings: DrawingCache::new(config.drawing_capacity),
        }
    }

    /// The drawing for this request, generated on the first call and served
    /// from the cache afterwards. `None` for malformed shapes.
    #[tracing::instrument(skip_all, fields(shape = shape.tag()))]
    pub fn generate(
        &mut self,
        shape: &ShapeDescriptor,
        options: &RenderOptions,
        size: CanvasSize,
    ) -> Option<Arc<Drawing>> {
        let key = DrawingKey::new(shape, options, size);
        let generator = self.generators.generator_for(size);
        self.drawings
            .get_or_generate(key, || generator.generate(shape, options))
    }

    /// Sketch raw SVG path data. Data that does not parse draws nothing.
    pub fn generate_svg_path(
        &mut self,
        d: &str,
        options: &RenderOptions,
        size: CanvasSize,
    ) -> Option<Arc<Drawing>> {
        if let Err(err) = parse_path_data(d) {
            tracing::debug!(%err, "skipping unparseable path");
            return None;
        }
        self.generate(&ShapeDescriptor::svg_path(d), options, size)
    }

    pub fn drawings(&mut self) -> &mut DrawingCache {
        &mut self.drawings
    }

    pub fn generators(&mut self) -> &mut GeneratorCache {
        &mut self.generators
    }

    /// Empty both caches and zero their counters.
    pub fn clear(&mut self) {
        self.generators.clear();
        self.drawings.clear();
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            generators: self.generators.stats(),
            drawings: self.drawings.stats(),
        }
    }
}
