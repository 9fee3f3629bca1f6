//! Canonical shape descriptions. A [`ShapeDescriptor`] is an immutable value:
//! the generator reads it, the drawing cache hashes it.
use crate::errors::{RoughError, RoughResult};
use crate::geometry::svg::{bez_path_commands, commands_bez_path, PathCommand};
use crate::options::hash_f64;
use kurbo::{BezPath, Point};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Target drawing surface size.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> CanvasSize {
        CanvasSize { width, height }
    }

    /// Size rounded to whole units, as used by the cache keys.
    pub fn key(&self) -> SizeKey {
        let round = |v: f64| v.round().to_i64().unwrap_or(0);
        SizeKey {
            width: round(self.width),
            height: round(self.height),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizeKey {
    pub width: i64,
    pub height: i64,
}

/// Result of the glyph collaborator: an outline for a run of text, plus the
/// metrics a caller needs to place it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub commands: Vec<PathCommand>,
    pub typographic_size: CanvasSize,
    pub ascent: f64,
    pub ink_origin: Point,
}

/// Turns a string set in some font into an outline. Font loading and shaping
/// live with the implementor.
pub trait GlyphOutlineSource {
    fn outline(&self, text: &str, font_size: f64) -> Option<GlyphOutline>;
}

/// Every shape the generator knows how to sketch. Angles are radians;
/// `Ellipse` and `Circle` are centered on `(x, y)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ShapeDescriptor {
    Line {
        from: Point,
        to: Point,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    RoundedRectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    Ellipse {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        diameter: f64,
    },
    Polygon {
        points: Vec<Point>,
    },
    Arc {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        start: f64,
        stop: f64,
        closed: bool,
    },
    Curve {
        points: Vec<Point>,
    },
    LinearPath {
        points: Vec<Point>,
        closed: bool,
    },
    SvgPath {
        d: String,
    },
    TextPath {
        commands: Vec<PathCommand>,
    },
}

fn pairs(values: &[f64]) -> Vec<Point> {
    values
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect()
}

fn need(tag: &str, values: &[f64], n: usize) -> RoughResult<()> {
    if values.len() < n {
        return Err(RoughError::shape_params(format!(
            "{tag} needs {n} values, got {}",
            values.len()
        )));
    }
    if values.iter().take(n).any(|v| !v.is_finite()) {
        return Err(RoughError::shape_params(format!(
            "{tag} has non-finite values"
        )));
    }
    Ok(())
}

impl ShapeDescriptor {
    /// Label carried by the resulting drawing.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeDescriptor::Line { .. } => "line",
            ShapeDescriptor::Rectangle { .. } => "rectangle",
            ShapeDescriptor::RoundedRectangle { .. } => "rounded_rectangle",
            ShapeDescriptor::Ellipse { .. } => "ellipse",
            ShapeDescriptor::Circle { .. } => "circle",
            ShapeDescriptor::Polygon { .. } => "polygon",
            ShapeDescriptor::Arc { .. } => "arc",
            ShapeDescriptor::Curve { .. } => "curve",
            ShapeDescriptor::LinearPath { .. } => "linear_path",
            ShapeDescriptor::SvgPath { .. } => "path",
            ShapeDescriptor::TextPath { .. } => "text",
        }
    }

    /// Build a descriptor from a tag and loosely typed numeric parameters,
    /// e.g. `("circle", [50, 50, 80])`. Point lists are flat `x, y` pairs;
    /// `arc` takes an optional seventh `closed` flag (non-zero means closed).
    pub fn from_params(tag: &str, values: &[f64]) -> RoughResult<ShapeDescriptor> {
        let v = values;
        let shape = match tag {
            "line" => {
                need(tag, v, 4)?;
                ShapeDescriptor::Line {
                    from: Point::new(v[0], v[1]),
                    to: Point::new(v[2], v[3]),
                }
            }
            "rectangle" => {
                need(tag, v, 4)?;
                ShapeDescriptor::Rectangle {
                    x: v[0],
                    y: v[1],
                    width: v[2],
                    height: v[3],
                }
            }
            "rounded_rectangle" => {
                need(tag, v, 5)?;
                ShapeDescriptor::RoundedRectangle {
                    x: v[0],
                    y: v[1],
                    width: v[2],
                    height: v[3],
                    corner_radius: v[4],
                }
            }
            "ellipse" => {
                need(tag, v, 4)?;
                ShapeDescriptor::Ellipse {
                    x: v[0],
                    y: v[1],
                    width: v[2],
                    height: v[3],
                }
            }
            "circle" => {
                need(tag, v, 3)?;
                ShapeDescriptor::Circle {
                    x: v[0],
                    y: v[1],
                    diameter: v[2],
                }
            }
            "arc" => {
                need(tag, v, 6)?;
                ShapeDescriptor::Arc {
                    x: v[0],
                    y: v[1],
                    width: v[2],
                    height: v[3],
                    start: v[4],
                    stop: v[5],
                    closed: v.get(6).is_some_and(|c| *c != 0.0),
                }
            }
            "polygon" | "curve" | "linear_path" => {
                let min = if tag == "polygon" { 3 } else { 2 };
                need(tag, v, min * 2)?;
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(RoughError::shape_params(format!("{tag} has non-finite values")));
                }
                let points = pairs(v);
                match tag {
                    "polygon" => ShapeDescriptor::Polygon { points },
                    "curve" => ShapeDescriptor::Curve { points },
                    _ => ShapeDescriptor::LinearPath {
                        points,
                        closed: false,
                    },
                }
            }
            other => {
                return Err(RoughError::shape_params(format!(
                    "unknown shape tag '{other}'"
                )))
            }
        };
        Ok(shape)
    }

    /// Read a descriptor from RON, e.g. `Circle(x: 50.0, y: 50.0, diameter: 80.0)`.
    pub fn from_ron(text: &str) -> RoughResult<ShapeDescriptor> {
        Ok(ron::from_str(text)?)
    }

    pub fn svg_path(d: impl Into<String>) -> ShapeDescriptor {
        ShapeDescriptor::SvgPath { d: d.into() }
    }

    /// Adapt a glyph collaborator result into a text shape.
    pub fn text_path(outline: &GlyphOutline) -> ShapeDescriptor {
        ShapeDescriptor::TextPath {
            commands: outline.commands.clone(),
        }
    }

    /// Set a string through a glyph source; `None` when the source has no
    /// outline for it.
    pub fn text<S: GlyphOutlineSource + ?Sized>(
        source: &S,
        text: &str,
        font_size: f64,
    ) -> Option<ShapeDescriptor> {
        source
            .outline(text, font_size)
            .map(|outline| ShapeDescriptor::text_path(&outline))
    }

    /// Identity plus defining parameters, for the drawing cache key.
    pub fn cache_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        self.tag().hash(&mut h);
        let point = |p: &Point, h: &mut DefaultHasher| {
            hash_f64(p.x, h);
            hash_f64(p.y, h);
        };
        match self {
            ShapeDescriptor::Line { from, to } => {
                point(from, &mut h);
                point(to, &mut h);
            }
            ShapeDescriptor::Rectangle {
                x,
                y,
                width,
                height,
            }
            | ShapeDescriptor::Ellipse {
                x,
                y,
                width,
                height,
            } => [*x, *y, *width, *height]
                .iter()
                .for_each(|v| hash_f64(*v, &mut h)),
            ShapeDescriptor::RoundedRectangle {
                x,
                y,
                width,
                height,
                corner_radius,
            } => [*x, *y, *width, *height, *corner_radius]
                .iter()
                .for_each(|v| hash_f64(*v, &mut h)),
            ShapeDescriptor::Circle { x, y, diameter } => [*x, *y, *diameter]
                .iter()
                .for_each(|v| hash_f64(*v, &mut h)),
            ShapeDescriptor::Arc {
                x,
                y,
                width,
                height,
                start,
                stop,
                closed,
            } => {
                [*x, *y, *width, *height, *start, *stop]
                    .iter()
                    .for_each(|v| hash_f64(*v, &mut h));
                closed.hash(&mut h);
            }
            ShapeDescriptor::Polygon { points } | ShapeDescriptor::Curve { points } => {
                points.len().hash(&mut h);
                points.iter().for_each(|p| point(p, &mut h));
            }
            ShapeDescriptor::LinearPath { points, closed } => {
                points.len().hash(&mut h);
                points.iter().for_each(|p| point(p, &mut h));
                closed.hash(&mut h);
            }
            ShapeDescriptor::SvgPath { d } => d.hash(&mut h),
            ShapeDescriptor::TextPath { commands } => {
                for el in commands_bez_path(commands).elements() {
                    std::mem::discriminant(el).hash(&mut h);
                    for p in el_points(el) {
                        point(&p, &mut h);
                    }
                }
            }
        }
        h.finish()
    }
}

fn el_points(el: &kurbo::PathEl) -> Vec<Point> {
    match *el {
        kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => vec![p],
        kurbo::PathEl::QuadTo(a, b) => vec![a, b],
        kurbo::PathEl::CurveTo(a, b, c) => vec![a, b, c],
        kurbo::PathEl::ClosePath => vec![],
    }
}

/// Outline of a rounded rectangle: straight sides and quarter-ellipse cubic
/// corners. The radius is clamped to half the shorter side.
pub fn rounded_rect_commands(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    corner_radius: f64,
) -> Vec<PathCommand> {
    // Cubic handle length for a quarter circle.
    const KAPPA: f64 = 0.552_284_749_831;
    let r = corner_radius
        .max(0.0)
        .min(width.abs() / 2.0)
        .min(height.abs() / 2.0);
    let path = if r <= 0.0 {
        let mut p = BezPath::new();
        p.move_to((x, y));
        p.line_to((x + width, y));
        p.line_to((x + width, y + height));
        p.line_to((x, y + height));
        p.close_path();
        p
    } else {
        let k = r * KAPPA;
        let (x0, y0, x1, y1) = (x, y, x + width, y + height);
        let mut p = BezPath::new();
        p.move_to((x0 + r, y0));
        p.line_to((x1 - r, y0));
        p.curve_to((x1 - r + k, y0), (x1, y0 + r - k), (x1, y0 + r));
        p.line_to((x1, y1 - r));
        p.curve_to((x1, y1 - r + k), (x1 - r + k, y1), (x1 - r, y1));
        p.line_to((x0 + r, y1));
        p.curve_to((x0 + r - k, y1), (x0, y1 - r + k), (x0, y1 - r));
        p.line_to((x0, y0 + r));
        p.curve_to((x0, y0 + r - k), (x0 + r - k, y0), (x0 + r, y0));
        p.close_path();
        p
    };
    bez_path_commands(&path)
}
