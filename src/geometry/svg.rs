//! SVG path data in both directions: path strings become typed
//! [`PathCommand`] lists (absolute coordinates, arcs and shorthands already
//! expanded), and generated geometry becomes `svg` crate path data.
use crate::errors::{RoughError, RoughResult};
use kurbo::{BezPath, PathEl, Point};
use serde::{Deserialize, Serialize};
use svg::node::element::path::Data;
use svg::node::Value;

/// One absolute path command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Parse SVG path data into commands. Empty data is malformed.
pub fn parse_path_data(d: &str) -> RoughResult<Vec<PathCommand>> {
    let d = d.trim();
    if d.is_empty() {
        return Err(RoughError::path_data("empty path data"));
    }
    let path =
        BezPath::from_svg(d).map_err(|e| RoughError::path_data(format!("invalid path data: {e}")))?;
    let commands = bez_path_commands(&path);
    if commands.is_empty() {
        return Err(RoughError::path_data("path data has no commands"));
    }
    Ok(commands)
}

pub fn bez_path_commands(path: &BezPath) -> Vec<PathCommand> {
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathCommand::MoveTo(p),
            PathEl::LineTo(p) => PathCommand::LineTo(p),
            PathEl::QuadTo(c, p) => PathCommand::QuadTo(c, p),
            PathEl::CurveTo(c1, c2, p) => PathCommand::CubicTo(c1, c2, p),
            PathEl::ClosePath => PathCommand::Close,
        })
        .collect()
}

pub fn commands_bez_path(commands: &[PathCommand]) -> BezPath {
    let mut path = BezPath::new();
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => path.move_to(p),
            PathCommand::LineTo(p) => path.line_to(p),
            PathCommand::QuadTo(c, p) => path.quad_to(c, p),
            PathCommand::CubicTo(c1, c2, p) => path.curve_to(c1, c2, p),
            PathCommand::Close => path.close_path(),
        }
    }
    path
}

/// Convert generated geometry into an SVG path `d` value.
pub trait ToSvgData {
    fn to_svg_data(&self) -> Data;
}

fn xy(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

impl ToSvgData for BezPath {
    fn to_svg_data(&self) -> Data {
        self.elements()
            .iter()
            .fold(Data::new(), |data, el| match *el {
                PathEl::MoveTo(p) => data.move_to(xy(p)),
                PathEl::LineTo(p) => data.line_to(xy(p)),
                PathEl::QuadTo(c, p) => {
                    let (c, p) = (xy(c), xy(p));
                    data.quadratic_curve_to((c.0, c.1, p.0, p.1))
                }
                PathEl::CurveTo(c1, c2, p) => {
                    let (c1, c2, p) = (xy(c1), xy(c2), xy(p));
                    data.cubic_curve_to((c1.0, c1.1, c2.0, c2.1, p.0, p.1))
                }
                PathEl::ClosePath => data.close(),
            })
    }
}

impl ToSvgData for [PathCommand] {
    fn to_svg_data(&self) -> Data {
        commands_bez_path(self).to_svg_data()
    }
}

/// Commands written back out as a path data string.
pub fn path_data_string(commands: &[PathCommand]) -> String {
    Value::from(commands.to_svg_data()).to_string()
}
