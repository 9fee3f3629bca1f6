//! Style knobs for every generation call.
//!
//! [`RenderOptions`] is a plain value: clone it, tweak it with the `with_*`
//! helpers, or load it from RON. Everything that reads an option goes through
//! [`RenderOptions::clamped`] first, so out-of-range values are pulled back to
//! their boundary instead of being rejected.
use crate::errors::RoughResult;
use crate::geometry::brush::BrushProfile;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Which filler turns a closed shape's interior into operations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    #[default]
    Hachure,
    Solid,
    Zigzag,
    CrossHatch,
    Dots,
    Dashed,
    #[serde(alias = "star_burst")]
    SunBurst,
    ZigzagLine,
    Scribble,
}

impl FillStyle {
    pub const ALL: [FillStyle; 9] = [
        FillStyle::Hachure,
        FillStyle::Solid,
        FillStyle::Zigzag,
        FillStyle::CrossHatch,
        FillStyle::Dots,
        FillStyle::Dashed,
        FillStyle::SunBurst,
        FillStyle::ZigzagLine,
        FillStyle::Scribble,
    ];
}

/// Where the stroke of an SVG-origin shape sits relative to its fill outline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillStrokeAlignment {
    #[default]
    Center,
    Inside,
    Outside,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderOptions {
    /// Seeds the PRNG of every generation call made with these options.
    pub seed: u64,
    pub roughness: f64,
    pub bowing: f64,
    pub max_randomness_offset: f64,
    pub stroke: String,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    /// `None` disables fill geometry entirely.
    pub fill: Option<String>,
    pub fill_opacity: f64,
    pub fill_style: FillStyle,
    /// Negative means "half the stroke width".
    pub fill_weight: f64,
    /// Degrees.
    pub fill_angle: f64,
    pub fill_spacing: f64,
    /// Cyclic per-line multipliers applied to the hachure gap.
    pub fill_spacing_pattern: Option<Vec<f64>>,
    pub curve_tightness: f64,
    pub curve_step_count: u32,
    pub curve_fitting: f64,
    pub dash_offset: f64,
    pub dash_gap: f64,
    pub zigzag_offset: f64,
    pub disable_multi_stroke: bool,
    pub disable_multi_stroke_fill: bool,
    pub preserve_vertices: bool,
    /// Degrees.
    pub scribble_origin: f64,
    pub scribble_tightness: u32,
    pub scribble_curvature: f64,
    pub scribble_use_brush_stroke: bool,
    /// Rays per band, one band per entry, bands stacked across the shape.
    pub scribble_tightness_pattern: Option<Vec<u32>>,
    pub svg_stroke_width: Option<f64>,
    pub svg_fill_weight: Option<f64>,
    pub fill_stroke_alignment: FillStrokeAlignment,
    pub brush_profile: BrushProfile,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            seed: 1,
            roughness: 1.0,
            bowing: 1.0,
            max_randomness_offset: 2.0,
            stroke: "black".to_string(),
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            fill: Some("transparent".to_string()),
            fill_opacity: 1.0,
            fill_style: FillStyle::Hachure,
            fill_weight: -1.0,
            fill_angle: -41.0,
            fill_spacing: 8.0,
            fill_spacing_pattern: None,
            curve_tightness: 0.0,
            curve_step_count: 9,
            curve_fitting: 0.95,
            dash_offset: -1.0,
            dash_gap: -1.0,
            zigzag_offset: -1.0,
            disable_multi_stroke: false,
            disable_multi_stroke_fill: false,
            preserve_vertices: false,
            scribble_origin: 45.0,
            scribble_tightness: 10,
            scribble_curvature: 0.0,
            scribble_use_brush_stroke: false,
            scribble_tightness_pattern: None,
            svg_stroke_width: None,
            svg_fill_weight: None,
            fill_stroke_alignment: FillStrokeAlignment::Center,
            brush_profile: BrushProfile::default(),
        }
    }
}

impl RenderOptions {
    /// Read options from RON; missing fields take their defaults.
    pub fn from_ron(text: &str) -> RoughResult<RenderOptions> {
        Ok(ron::from_str(text)?)
    }

    pub fn with_seed(self, seed: u64) -> Self {
        RenderOptions { seed, ..self }
    }

    pub fn with_roughness(self, roughness: f64) -> Self {
        RenderOptions { roughness, ..self }
    }

    pub fn with_bowing(self, bowing: f64) -> Self {
        RenderOptions { bowing, ..self }
    }

    pub fn with_fill(self, fill: Option<&str>) -> Self {
        RenderOptions {
            fill: fill.map(str::to_string),
            ..self
        }
    }

    pub fn with_fill_style(self, fill_style: FillStyle) -> Self {
        RenderOptions { fill_style, ..self }
    }

    pub fn with_stroke_width(self, stroke_width: f64) -> Self {
        RenderOptions {
            stroke_width,
            ..self
        }
    }

    pub fn with_brush_profile(self, brush_profile: BrushProfile) -> Self {
        RenderOptions {
            brush_profile,
            ..self
        }
    }

    /// Copy with every numeric knob pulled back into its documented range.
    pub fn clamped(&self) -> RenderOptions {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        RenderOptions {
            roughness: finite_or(self.roughness, 0.0).max(0.0),
            bowing: finite_or(self.bowing, 0.0),
            max_randomness_offset: finite_or(self.max_randomness_offset, 0.0).max(0.0),
            stroke_opacity: finite_or(self.stroke_opacity, 1.0).clamp(0.0, 1.0),
            fill_opacity: finite_or(self.fill_opacity, 1.0).clamp(0.0, 1.0),
            stroke_width: finite_or(self.stroke_width, 1.0).max(0.0),
            fill_spacing: finite_or(self.fill_spacing, 8.0).max(0.0),
            curve_step_count: self.curve_step_count.max(1),
            curve_fitting: finite_or(self.curve_fitting, 0.95).clamp(0.0, 1.0),
            scribble_tightness: self.scribble_tightness.max(1),
            scribble_curvature: finite_or(self.scribble_curvature, 0.0).clamp(0.0, 1.0),
            brush_profile: self.brush_profile.clamped(),
            ..self.clone()
        }
    }

    /// Fill stroke weight; negative means half the stroke width.
    pub fn effective_fill_weight(&self) -> f64 {
        if self.fill_weight < 0.0 {
            self.stroke_width / 2.0
        } else {
            self.fill_weight
        }
    }

    /// Distance between neighbouring hachure scan lines.
    pub fn hachure_gap(&self) -> f64 {
        (self.fill_spacing * self.effective_fill_weight()).max(0.1)
    }

    /// True when closed shapes should produce fill geometry.
    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    /// Path shapes additionally skip fully transparent fills.
    pub fn has_visible_fill(&self) -> bool {
        matches!(&self.fill, Some(color) if color != "transparent" && color != "none")
    }

    pub fn has_stroke(&self) -> bool {
        self.stroke != "none"
    }

    /// Options as seen by SVG-origin shapes: the SVG-only overrides win.
    pub fn for_svg(&self) -> RenderOptions {
        RenderOptions {
            stroke_width: self.svg_stroke_width.unwrap_or(self.stroke_width),
            fill_weight: self.svg_fill_weight.unwrap_or(self.fill_weight),
            ..self.clone()
        }
    }

    /// Stable hash over every field, pattern contents included. Two option
    /// bundles that compare equal always hash equal.
    pub fn cache_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into<H: Hasher>(&self, h: &mut H) {
        self.seed.hash(h);
        for v in [
            self.roughness,
            self.bowing,
            self.max_randomness_offset,
            self.stroke_opacity,
            self.stroke_width,
            self.fill_opacity,
            self.fill_weight,
            self.fill_angle,
            self.fill_spacing,
            self.curve_tightness,
            self.curve_fitting,
            self.dash_offset,
            self.dash_gap,
            self.zigzag_offset,
            self.scribble_origin,
            self.scribble_curvature,
        ] {
            hash_f64(v, h);
        }
        self.stroke.hash(h);
        self.fill.hash(h);
        self.fill_style.hash(h);
        match &self.fill_spacing_pattern {
            Some(pattern) => {
                1u8.hash(h);
                pattern.len().hash(h);
                pattern.iter().for_each(|v| hash_f64(*v, h));
            }
            None => 0u8.hash(h),
        }
        self.curve_step_count.hash(h);
        self.disable_multi_stroke.hash(h);
        self.disable_multi_stroke_fill.hash(h);
        self.preserve_vertices.hash(h);
        self.scribble_tightness.hash(h);
        self.scribble_use_brush_stroke.hash(h);
        self.scribble_tightness_pattern.hash(h);
        self.svg_stroke_width.map(f64::to_bits).hash(h);
        self.svg_fill_weight.map(f64::to_bits).hash(h);
        self.fill_stroke_alignment.hash(h);
        self.brush_profile.hash_into(h);
    }
}

/// Hash an f64 so that values comparing equal (0.0 and -0.0) hash equal.
pub(crate) fn hash_f64<H: Hasher>(v: f64, h: &mut H) {
    let v = if v == 0.0 { 0.0 } else { v };
    v.to_bits().hash(h);
}
