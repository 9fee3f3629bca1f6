use crate::context::render_command::RenderStyle;
use crate::geometry::shapes::CanvasSize;
use crate::geometry::svg::ToSvgData;
use crate::options::RenderOptions;
use kurbo::{BezPath, PathEl, Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use svg::node::element::Path;

/// One drawing primitive in an ordered trace.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Move(Point),
    LineTo(Point),
    QuadraticCurveTo(Point, Point),
    BezierCurveTo(Point, Point, Point),
    Close,
}

impl Operation {
    /// Every coordinate the operation carries, control points included.
    pub fn points(&self) -> Vec<Point> {
        match *self {
            Operation::Move(p) | Operation::LineTo(p) => vec![p],
            Operation::QuadraticCurveTo(c, p) => vec![c, p],
            Operation::BezierCurveTo(c1, c2, p) => vec![c1, c2, p],
            Operation::Close => vec![],
        }
    }

    /// Same operation with every coordinate passed through `f`, in the order
    /// [`Operation::points`] lists them.
    pub fn map_points<F: FnMut(Point) -> Point>(&self, mut f: F) -> Operation {
        match *self {
            Operation::Move(p) => Operation::Move(f(p)),
            Operation::LineTo(p) => Operation::LineTo(f(p)),
            Operation::QuadraticCurveTo(c, p) => {
                let c = f(c);
                Operation::QuadraticCurveTo(c, f(p))
            }
            Operation::BezierCurveTo(c1, c2, p) => {
                let c1 = f(c1);
                let c2 = f(c2);
                Operation::BezierCurveTo(c1, c2, f(p))
            }
            Operation::Close => Operation::Close,
        }
    }
}

/// How a renderer should treat a group of operations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OpSetKind {
    /// Stroked outline.
    StrokePath,
    /// Thin strokes that together read as a fill.
    FillSketch,
    /// One filled region.
    FillSolidPath,
    /// One filled region taken straight from SVG path data.
    SvgFillSolid,
    /// Pattern fill of SVG path data, sized to the path.
    SvgFillPattern,
}

impl OpSetKind {
    pub fn is_solid(&self) -> bool {
        matches!(self, OpSetKind::FillSolidPath | OpSetKind::SvgFillSolid)
    }

    pub fn is_fill(&self) -> bool {
        !matches!(self, OpSetKind::StrokePath)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OperationSet {
    pub kind: OpSetKind,
    pub ops: Vec<Operation>,
    /// Raw SVG path data, for sets that came from it.
    pub path: Option<String>,
    pub size: Option<CanvasSize>,
    /// A stroke already converted to a filled brush outline; painted in the
    /// stroke color.
    #[serde(default)]
    pub outlined_stroke: bool,
}

impl OperationSet {
    pub fn new(kind: OpSetKind, ops: Vec<Operation>) -> OperationSet {
        OperationSet {
            kind,
            ops,
            path: None,
            size: None,
            outlined_stroke: false,
        }
    }

    pub fn as_outlined_stroke(self) -> Self {
        OperationSet {
            outlined_stroke: true,
            ..self
        }
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        OperationSet {
            path: Some(path.into()),
            ..self
        }
    }

    pub fn with_size(self, size: CanvasSize) -> Self {
        OperationSet {
            size: Some(size),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations as a kurbo path. A drawing op with no current subpath
    /// starts one at the last known point.
    pub fn to_bez_path(&self) -> BezPath {
        ops_bez_path(&self.ops)
    }

    pub fn from_bez_path(kind: OpSetKind, path: &BezPath) -> OperationSet {
        OperationSet::new(kind, bez_path_ops(path))
    }

    /// Bounds of every coordinate, control points included.
    pub fn control_bounds(&self) -> Option<Rect> {
        self.ops
            .iter()
            .flat_map(|op| op.points())
            .fold(None, |acc: Option<Rect>, p| match acc {
                None => Some(Rect::from_points(p, p)),
                Some(r) => Some(r.union_pt(p)),
            })
    }
}

pub fn ops_bez_path(ops: &[Operation]) -> BezPath {
    let mut path = BezPath::new();
    let mut open = false;
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    for op in ops {
        if !open && !matches!(op, Operation::Move(_) | Operation::Close) {
            path.move_to(last);
            start = last;
            open = true;
        }
        match *op {
            Operation::Move(p) => {
                path.move_to(p);
                start = p;
                last = p;
                open = true;
            }
            Operation::LineTo(p) => {
                path.line_to(p);
                last = p;
            }
            Operation::QuadraticCurveTo(c, p) => {
                path.quad_to(c, p);
                last = p;
            }
            Operation::BezierCurveTo(c1, c2, p) => {
                path.curve_to(c1, c2, p);
                last = p;
            }
            Operation::Close => {
                if open {
                    path.close_path();
                    last = start;
                    open = false;
                }
            }
        }
    }
    path
}

pub fn bez_path_ops(path: &BezPath) -> Vec<Operation> {
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => Operation::Move(p),
            PathEl::LineTo(p) => Operation::LineTo(p),
            PathEl::QuadTo(c, p) => Operation::QuadraticCurveTo(c, p),
            PathEl::CurveTo(c1, c2, p) => Operation::BezierCurveTo(c1, c2, p),
            PathEl::ClosePath => Operation::Close,
        })
        .collect()
}

/// The complete geometry for one shape, options and size request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Drawing {
    pub shape: String,
    pub sets: Vec<OperationSet>,
    pub options: RenderOptions,
}

impl Drawing {
    pub fn new(shape: impl Into<String>, sets: Vec<OperationSet>, options: RenderOptions) -> Drawing {
        Drawing {
            shape: shape.into(),
            sets,
            options,
        }
    }

    pub fn op_count(&self) -> usize {
        self.sets.iter().map(|s| s.ops.len()).sum()
    }

    pub fn sets_of(&self, kind: OpSetKind) -> impl Iterator<Item = &OperationSet> {
        self.sets.iter().filter(move |s| s.kind == kind)
    }

    /// True for drawings made from SVG path data or glyph outlines.
    pub fn is_path_origin(&self) -> bool {
        self.shape == "path" || self.shape == "text"
    }

    /// Bounds of every set's geometry.
    pub fn bounds(&self) -> Option<Rect> {
        self.sets
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_bez_path().bounding_box())
            .reduce(|a, b| a.union(b))
    }

    /// One `svg` path element per set, styled like its render command.
    pub fn to_svg_paths(&self) -> Vec<Path> {
        self.render_commands()
            .iter()
            .map(|cmd| {
                let path = Path::new().set("d", cmd.path.to_svg_data());
                match &cmd.style {
                    RenderStyle::Stroke {
                        color,
                        width,
                        opacity,
                    } => path
                        .set("fill", "none")
                        .set("stroke", color.as_str())
                        .set("stroke-width", *width)
                        .set("stroke-opacity", *opacity)
                        .set("stroke-linecap", cmd.cap.svg_name())
                        .set("stroke-linejoin", cmd.join.svg_name()),
                    RenderStyle::Fill { color, opacity } => path
                        .set("fill", color.as_str())
                        .set("fill-opacity", *opacity)
                        .set("stroke", "none"),
                }
            })
            .collect()
    }
}
