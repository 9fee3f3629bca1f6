//! Sketchy replay of parsed path commands: straight runs become doubled
//! lines, curves get two jittered cubic passes.
use crate::context::operation::{OpSetKind, Operation, OperationSet};
use crate::geometry::svg::PathCommand;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use crate::sketch::strokes::double_line;
use kurbo::{Point, QuadBez, Vec2};

/// Extra roughness for the single-pass outline used as a solid path fill.
pub const FILL_SHAPE_ROUGHNESS_GAIN: f64 = 0.8;

fn bezier_to(
    c1: Point,
    c2: Point,
    end: Point,
    current: Point,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Operation> {
    let base = if o.max_randomness_offset == 0.0 {
        1.0
    } else {
        o.max_randomness_offset
    };
    let ros = [base, base + 0.3];
    let iterations = if o.disable_multi_stroke { 1 } else { 2 };
    let jitter = |rng: &mut Randomizer, p: Point, ro: f64| {
        let dx = rng.offset(ro, o);
        p + Vec2::new(dx, rng.offset(ro, o))
    };

    let mut ops = Vec::with_capacity(iterations * 2);
    for ro in ros.iter().take(iterations) {
        if ops.is_empty() || o.preserve_vertices {
            ops.push(Operation::Move(current));
        } else {
            ops.push(Operation::Move(jitter(rng, current, ros[0])));
        }
        let f = if o.preserve_vertices {
            end
        } else {
            jitter(rng, end, *ro)
        };
        let j1 = jitter(rng, c1, *ro);
        let j2 = jitter(rng, c2, *ro);
        ops.push(Operation::BezierCurveTo(j1, j2, f));
    }
    ops
}

/// Stroke of a parsed path. Quadratics are raised to cubics; a close draws
/// the edge back to the subpath start.
pub fn svg_path(commands: &[PathCommand], rng: &mut Randomizer, o: &RenderOptions) -> OperationSet {
    let mut ops = vec![];
    let mut first = Point::ZERO;
    let mut current = Point::ZERO;
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => {
                current = p;
                first = p;
            }
            PathCommand::LineTo(p) => {
                ops.extend(double_line(current, p, rng, o, false));
                current = p;
            }
            PathCommand::QuadTo(c, p) => {
                let cubic = QuadBez::new(current, c, p).raise();
                ops.extend(bezier_to(cubic.p1, cubic.p2, p, current, rng, o));
                current = p;
            }
            PathCommand::CubicTo(c1, c2, p) => {
                ops.extend(bezier_to(c1, c2, p, current, rng, o));
                current = p;
            }
            PathCommand::Close => {
                ops.extend(double_line(current, first, rng, o, false));
                current = first;
            }
        }
    }
    OperationSet::new(OpSetKind::StrokePath, ops)
}

/// Options for the one-pass outline that doubles as a solid fill.
pub fn fill_shape_options(o: &RenderOptions) -> RenderOptions {
    RenderOptions {
        disable_multi_stroke: true,
        roughness: if o.roughness == 0.0 {
            0.0
        } else {
            o.roughness + FILL_SHAPE_ROUGHNESS_GAIN
        },
        ..o.clone()
    }
}

/// Joins a run of passes into one continuous outline by dropping every move
/// but the first.
pub fn merged_shape(ops: Vec<Operation>) -> Vec<Operation> {
    ops.into_iter()
        .enumerate()
        .filter(|(i, op)| *i == 0 || !matches!(op, Operation::Move(_)))
        .map(|(_, op)| op)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::svg::parse_path_data;

    #[test]
    fn test_replay_counts() {
        let o = RenderOptions::default();
        let mut rng = Randomizer::new(1);
        let cmds = parse_path_data("M10 10 L90 10 C90 50 50 90 10 90 Z").expect("valid path");
        let set = svg_path(&cmds, &mut rng, &o);
        // Two doubled lines at four ops each, one two-pass cubic.
        assert_eq!(set.ops.len(), 12);
        assert_eq!(set.kind, OpSetKind::StrokePath);
    }

    #[test]
    fn test_first_curve_pass_starts_on_current_point() {
        let o = RenderOptions::default().with_roughness(2.0);
        let mut rng = Randomizer::new(5);
        let cmds = parse_path_data("M5 5 Q50 0 95 5").expect("valid path");
        let set = svg_path(&cmds, &mut rng, &o);
        assert_eq!(set.ops[0], Operation::Move(Point::new(5.0, 5.0)));
        assert_ne!(set.ops[2], Operation::Move(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_smooth_replay_is_exact() {
        let o = RenderOptions::default().with_roughness(0.0);
        let mut rng = Randomizer::new(1);
        let cmds = parse_path_data("M0 0 C10 20 30 20 40 0").expect("valid path");
        let set = svg_path(&cmds, &mut rng, &o);
        assert_eq!(
            set.ops[1],
            Operation::BezierCurveTo(
                Point::new(10.0, 20.0),
                Point::new(30.0, 20.0),
                Point::new(40.0, 0.0)
            )
        );
    }

    #[test]
    fn test_merged_shape_keeps_first_move() {
        let ops = vec![
            Operation::Move(Point::ZERO),
            Operation::LineTo(Point::new(1.0, 0.0)),
            Operation::Move(Point::new(1.0, 0.0)),
            Operation::LineTo(Point::new(1.0, 1.0)),
        ];
        let merged = merged_shape(ops);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], Operation::Move(Point::ZERO));
    }

    #[test]
    fn test_fill_shape_options() {
        let o = fill_shape_options(&RenderOptions::default());
        assert!(o.disable_multi_stroke);
        assert!((o.roughness - 1.8).abs() < 1e-12);
        let smooth = fill_shape_options(&RenderOptions::default().with_roughness(0.0));
        assert_eq!(smooth.roughness, 0.0);
    }
}
