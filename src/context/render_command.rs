//! Renderer-facing view of a [`Drawing`]: one self-contained command per
//! operation set, with the style already resolved from the drawing's options.
use crate::context::operation::{Drawing, OpSetKind};
use crate::geometry::brush::{LineCap, LineJoin};
use crate::geometry::svg::{commands_bez_path, parse_path_data};
use crate::options::FillStrokeAlignment;
use kurbo::BezPath;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum RenderStyle {
    Stroke {
        color: String,
        width: f64,
        opacity: f64,
    },
    Fill {
        color: String,
        opacity: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoughRenderCommand {
    pub path: BezPath,
    pub style: RenderStyle,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Region the command is clipped to.
    pub clip: Option<BezPath>,
    /// Clip to everything outside `clip` instead.
    pub invert_clip: bool,
}

impl RoughRenderCommand {
    pub fn new(path: BezPath, style: RenderStyle) -> RoughRenderCommand {
        RoughRenderCommand {
            path,
            style,
            cap: LineCap::default(),
            join: LineJoin::default(),
            clip: None,
            invert_clip: false,
        }
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.style, RenderStyle::Stroke { .. })
    }

    /// Same command around a different path. Animation frames use this so
    /// that only geometry varies between steps.
    pub fn with_path(&self, path: BezPath) -> RoughRenderCommand {
        RoughRenderCommand {
            path,
            ..self.clone()
        }
    }
}

impl Drawing {
    /// Fill outline of an SVG-origin drawing, parsed back from the raw path
    /// data its fill set carries.
    fn fill_outline(&self) -> Option<BezPath> {
        self.sets
            .iter()
            .filter(|s| s.kind.is_fill())
            .find_map(|s| s.path.as_deref())
            .and_then(|d| parse_path_data(d).ok())
            .map(|cmds| commands_bez_path(&cmds))
    }

    pub fn render_commands(&self) -> Vec<RoughRenderCommand> {
        let o = if self.is_path_origin() {
            self.options.for_svg()
        } else {
            self.options.clone()
        };
        let fill_color = o.fill.clone().unwrap_or_else(|| "none".to_string());
        let cap = o.brush_profile.cap;
        let join = o.brush_profile.join;

        let aligned_clip = match o.fill_stroke_alignment {
            FillStrokeAlignment::Center => None,
            _ if !self.is_path_origin() => None,
            alignment => self
                .fill_outline()
                .map(|outline| (outline, alignment == FillStrokeAlignment::Outside)),
        };

        self.sets
            .iter()
            .filter(|set| !set.is_empty())
            .map(|set| {
                let path = set.to_bez_path();
                let mut cmd = match set.kind {
                    OpSetKind::StrokePath => {
                        let mut cmd = RoughRenderCommand::new(
                            path,
                            RenderStyle::Stroke {
                                color: o.stroke.clone(),
                                width: o.stroke_width,
                                opacity: o.stroke_opacity,
                            },
                        );
                        if let Some((outline, invert)) = &aligned_clip {
                            // Half the stroke is clipped away.
                            cmd.style = RenderStyle::Stroke {
                                color: o.stroke.clone(),
                                width: o.stroke_width * 2.0,
                                opacity: o.stroke_opacity,
                            };
                            cmd.clip = Some(outline.clone());
                            cmd.invert_clip = *invert;
                        }
                        cmd
                    }
                    OpSetKind::FillSketch | OpSetKind::SvgFillPattern => RoughRenderCommand::new(
                        path,
                        RenderStyle::Stroke {
                            color: fill_color.clone(),
                            width: o.effective_fill_weight(),
                            opacity: o.fill_opacity,
                        },
                    ),
                    OpSetKind::FillSolidPath | OpSetKind::SvgFillSolid => {
                        let style = if set.outlined_stroke {
                            RenderStyle::Fill {
                                color: o.stroke.clone(),
                                opacity: o.stroke_opacity,
                            }
                        } else {
                            RenderStyle::Fill {
                                color: fill_color.clone(),
                                opacity: o.fill_opacity,
                            }
                        };
                        RoughRenderCommand::new(path, style)
                    }
                };
                cmd.cap = cap;
                cmd.join = join;
                cmd
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::operation::{Operation, OperationSet};
    use crate::options::RenderOptions;
    use kurbo::Point;

    fn square_ops() -> Vec<Operation> {
        vec![
            Operation::Move(Point::new(0.0, 0.0)),
            Operation::LineTo(Point::new(10.0, 0.0)),
            Operation::LineTo(Point::new(10.0, 10.0)),
            Operation::Close,
        ]
    }

    #[test]
    fn test_styles_follow_set_kind() {
        let options = RenderOptions::default()
            .with_fill(Some("red"))
            .with_stroke_width(2.0);
        let drawing = Drawing::new(
            "rectangle",
            vec![
                OperationSet::new(OpSetKind::FillSketch, square_ops()),
                OperationSet::new(OpSetKind::StrokePath, square_ops()),
                OperationSet::new(OpSetKind::StrokePath, vec![]),
            ],
            options,
        );
        let cmds = drawing.render_commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(
            cmds[0].style,
            RenderStyle::Stroke {
                color: "red".to_string(),
                width: 1.0,
                opacity: 1.0
            }
        );
        assert!(matches!(&cmds[1].style, RenderStyle::Stroke { width, .. } if *width == 2.0));
        assert!(cmds[1].clip.is_none());
    }

    #[test]
    fn test_outlined_stroke_paints_stroke_color() {
        let drawing = Drawing::new(
            "line",
            vec![OperationSet::new(OpSetKind::FillSolidPath, square_ops()).as_outlined_stroke()],
            RenderOptions::default(),
        );
        let cmds = drawing.render_commands();
        assert!(matches!(&cmds[0].style, RenderStyle::Fill { color, .. } if color == "black"));
    }

    #[test]
    fn test_outside_alignment_inverts_clip_and_doubles() {
        let d = "M0 0 L10 0 L10 10 Z";
        let options = RenderOptions {
            fill_stroke_alignment: FillStrokeAlignment::Outside,
            svg_stroke_width: Some(3.0),
            ..RenderOptions::default().with_fill(Some("blue"))
        };
        let drawing = Drawing::new(
            "path",
            vec![
                OperationSet::new(OpSetKind::SvgFillSolid, square_ops()).with_path(d),
                OperationSet::new(OpSetKind::StrokePath, square_ops()),
            ],
            options,
        );
        let cmds = drawing.render_commands();
        let stroke = &cmds[1];
        assert!(stroke.invert_clip);
        assert!(stroke.clip.is_some());
        assert!(matches!(&stroke.style, RenderStyle::Stroke { width, .. } if *width == 6.0));
    }
}
