//! Brush profiles: tip shape, thickness over the stroke's length, cap and join.
use crate::options::hash_f64;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    pub fn svg_name(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

impl LineJoin {
    pub fn svg_name(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Elliptical pen tip. A roundness of 1 is a circle; smaller values flatten
/// the tip along its `angle` (radians) into a calligraphic nib.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BrushTip {
    pub roundness: f64,
    pub angle: f64,
    pub direction_sensitive: bool,
}

impl Default for BrushTip {
    fn default() -> Self {
        BrushTip {
            roundness: 1.0,
            angle: 0.0,
            direction_sensitive: false,
        }
    }
}

impl BrushTip {
    pub const MIN_ROUNDNESS: f64 = 0.01;

    /// A flat calligraphy nib held at `angle` radians.
    pub fn calligraphic(roundness: f64, angle: f64) -> BrushTip {
        BrushTip {
            roundness,
            angle,
            direction_sensitive: true,
        }
        .clamped()
    }

    pub fn clamped(&self) -> BrushTip {
        BrushTip {
            roundness: if self.roundness.is_finite() {
                self.roundness.clamp(Self::MIN_ROUNDNESS, 1.0)
            } else {
                1.0
            },
            ..*self
        }
    }

    pub fn is_default(&self) -> bool {
        !self.direction_sensitive && self.clamped().roundness >= 1.0
    }

    /// Half-width of the mark this tip leaves when dragged along
    /// `stroke_angle` (radians). Direction-insensitive and circular tips
    /// always return `half_width`.
    pub fn effective_width(&self, half_width: f64, stroke_angle: f64) -> f64 {
        let tip = self.clamped();
        if !tip.direction_sensitive || tip.roundness >= 1.0 {
            return half_width;
        }
        // Extent of the tip ellipse along the stroke normal.
        let theta = stroke_angle - tip.angle;
        let across = theta.sin();
        let along = tip.roundness * theta.cos();
        half_width * (across * across + along * along).sqrt()
    }
}

/// Thickness multiplier as a function of normalized arc length `t`.
///
/// Taper parameters are ramp lengths as fractions of the whole stroke:
/// `TaperIn(0.2)` ramps up over the first fifth, `TaperOut(0.2)` ramps down
/// over the last fifth.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThicknessProfile {
    #[default]
    Uniform,
    TaperIn(f64),
    TaperOut(f64),
    TaperBoth(f64, f64),
    Pressure(Vec<f64>),
    Custom(Vec<f64>),
}

impl ThicknessProfile {
    /// Multiplier for the stroke width at `t`; `t` is clamped to `[0, 1]`.
    pub fn multiplier(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            ThicknessProfile::Uniform => 1.0,
            ThicknessProfile::TaperIn(start) => taper_in(t, *start),
            ThicknessProfile::TaperOut(end) => taper_out(t, *end),
            ThicknessProfile::TaperBoth(start, end) => taper_in(t, *start).min(taper_out(t, *end)),
            ThicknessProfile::Pressure(samples) | ThicknessProfile::Custom(samples) => {
                interpolate(samples, t)
            }
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, ThicknessProfile::Uniform)
    }

    fn hash_into<H: Hasher>(&self, h: &mut H) {
        std::mem::discriminant(self).hash(h);
        match self {
            ThicknessProfile::Uniform => {}
            ThicknessProfile::TaperIn(v) | ThicknessProfile::TaperOut(v) => hash_f64(*v, h),
            ThicknessProfile::TaperBoth(a, b) => {
                hash_f64(*a, h);
                hash_f64(*b, h);
            }
            ThicknessProfile::Pressure(samples) | ThicknessProfile::Custom(samples) => {
                samples.len().hash(h);
                samples.iter().for_each(|v| hash_f64(*v, h));
            }
        }
    }
}

/// Ramp 0 -> 1 over `[0, start]`, then hold 1.
fn taper_in(t: f64, start: f64) -> f64 {
    if start <= 0.0 {
        1.0
    } else {
        (t / start).min(1.0)
    }
}

/// Hold 1, then ramp 1 -> 0 over the last `length` of the stroke.
fn taper_out(t: f64, length: f64) -> f64 {
    if length <= 0.0 {
        1.0
    } else {
        ((1.0 - t) / length).min(1.0)
    }
}

/// Piecewise-linear lookup over evenly spaced samples.
fn interpolate(samples: &[f64], t: f64) -> f64 {
    match samples.len() {
        0 => 1.0,
        1 => samples[0],
        n => {
            let pos = t * (n - 1) as f64;
            let i = (pos.floor() as usize).min(n - 2);
            let frac = pos - i as f64;
            samples[i] + (samples[i + 1] - samples[i]) * frac
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BrushProfile {
    pub tip: BrushTip,
    pub thickness: ThicknessProfile,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl BrushProfile {
    /// Broad-nib pen: flat tip at 45 degrees, slight taper at both ends.
    pub fn calligraphy() -> BrushProfile {
        BrushProfile {
            tip: BrushTip::calligraphic(0.2, std::f64::consts::FRAC_PI_4),
            thickness: ThicknessProfile::TaperBoth(0.1, 0.1),
            cap: LineCap::Butt,
            join: LineJoin::Round,
        }
    }

    /// Chisel-tip felt marker: wide flat nib held upright, even width,
    /// square ends.
    pub fn marker() -> BrushProfile {
        BrushProfile {
            tip: BrushTip::calligraphic(0.5, std::f64::consts::FRAC_PI_2),
            thickness: ThicknessProfile::Uniform,
            cap: LineCap::Square,
            join: LineJoin::Miter,
        }
    }

    /// Fine pen with a light pressure swell in the middle.
    pub fn pen() -> BrushProfile {
        BrushProfile {
            tip: BrushTip::default(),
            thickness: ThicknessProfile::Pressure(vec![0.4, 1.0, 0.8, 0.3]),
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }

    /// A profile needs the outline converter whenever a native stroke can't
    /// express it: non-default tip or non-uniform thickness.
    pub fn requires_custom_rendering(&self) -> bool {
        !self.tip.is_default() || !self.thickness.is_uniform()
    }

    pub fn clamped(&self) -> BrushProfile {
        BrushProfile {
            tip: self.tip.clamped(),
            ..self.clone()
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, h: &mut H) {
        hash_f64(self.tip.roundness, h);
        hash_f64(self.tip.angle, h);
        self.tip.direction_sensitive.hash(h);
        self.thickness.hash_into(h);
        self.cap.hash(h);
        self.join.hash(h);
    }
}
