//! Looped "boiling" animation. A drawing's render commands are displaced
//! into a fixed number of variants up front; playback then only picks a
//! variant by index. Variants are stored as per-point offsets from the base
//! geometry and rebuilt by addition when a frame is drawn.
use crate::context::render_command::RoughRenderCommand;
use crate::errors::RoughResult;
use crate::geometry::shapes::CanvasSize;
use kurbo::{BezPath, PathEl, Point, Vec2};
use num_traits::ToPrimitive;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long each variant stays on screen.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl AnimationSpeed {
    pub fn frame_duration(&self) -> Duration {
        match self {
            AnimationSpeed::Slow => Duration::from_millis(600),
            AnimationSpeed::Medium => Duration::from_millis(300),
            AnimationSpeed::Fast => Duration::from_millis(100),
        }
    }
}

/// How far points wander between variants, relative to their own scale.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationVariance {
    VeryLow,
    #[default]
    Low,
    Medium,
    High,
}

impl AnimationVariance {
    pub fn factor(&self) -> f64 {
        match self {
            AnimationVariance::VeryLow => 0.005,
            AnimationVariance::Low => 0.01,
            AnimationVariance::Medium => 0.05,
            AnimationVariance::High => 0.10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of variants; at least two.
    pub steps: usize,
    pub speed: AnimationSpeed,
    pub variance: AnimationVariance,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            steps: 4,
            speed: AnimationSpeed::default(),
            variance: AnimationVariance::default(),
        }
    }
}

impl AnimationConfig {
    pub const MIN_STEPS: usize = 2;

    pub fn new(steps: usize, speed: AnimationSpeed, variance: AnimationVariance) -> Self {
        AnimationConfig {
            steps,
            speed,
            variance,
        }
        .clamped()
    }

    pub fn clamped(&self) -> Self {
        AnimationConfig {
            steps: self.steps.max(Self::MIN_STEPS),
            ..*self
        }
    }

    /// Read a config from RON; a step count below two is raised to two.
    pub fn from_ron(text: &str) -> RoughResult<AnimationConfig> {
        let config: AnimationConfig = ron::from_str(text)?;
        Ok(config.clamped())
    }
}

/// SplitMix64 stream. Tiny, seedable and identical on every platform.
#[derive(Clone, Copy, Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        SplitMix64 { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

fn noise01(seed: u64, x: u64) -> f64 {
    SplitMix64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93)).next_f64_01()
}

/// Seed of variant `step`, a pure function of the base seed and the index.
pub fn step_seed(base_seed: u64, step: usize) -> u64 {
    let mut rng = SplitMix64::new(base_seed);
    let first = rng.next_u64();
    SplitMix64::new(first ^ (step as u64).wrapping_mul(0xA24B_AED4_963E_E407)).next_u64()
}

/// Every coordinate of a path in element order, control points included.
pub fn path_points(path: &BezPath) -> Vec<Point> {
    path.elements()
        .iter()
        .flat_map(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => vec![p],
            PathEl::QuadTo(c, p) => vec![c, p],
            PathEl::CurveTo(c1, c2, p) => vec![c1, c2, p],
            PathEl::ClosePath => vec![],
        })
        .collect()
}

/// `path` with the n-th coordinate moved by `offsets[n]`. Missing offsets
/// leave their points alone.
pub fn displace_path(path: &BezPath, offsets: &[Vec2]) -> BezPath {
    let mut next = offsets.iter();
    let mut shift = |p: Point| p + next.next().copied().unwrap_or(Vec2::ZERO);
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::MoveTo(shift(p)),
            PathEl::LineTo(p) => PathEl::LineTo(shift(p)),
            PathEl::QuadTo(c, p) => {
                let c = shift(c);
                PathEl::QuadTo(c, shift(p))
            }
            PathEl::CurveTo(c1, c2, p) => {
                let c1 = shift(c1);
                let c2 = shift(c2);
                PathEl::CurveTo(c1, c2, shift(p))
            }
            PathEl::ClosePath => PathEl::ClosePath,
        })
        .collect()
}

/// Offsets of one variant: one list per render command, one offset per
/// path coordinate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StepFrame {
    pub seed: u64,
    pub offsets: Vec<Vec<Vec2>>,
}

/// Derives the per-step variants for one animation config and seed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEngine {
    config: AnimationConfig,
    seeds: Vec<u64>,
}

impl AnimationEngine {
    pub fn new(config: &AnimationConfig, base_seed: u64) -> AnimationEngine {
        let config = config.clamped();
        let seeds = (0..config.steps).map(|s| step_seed(base_seed, s)).collect();
        AnimationEngine { config, seeds }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn step_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Displacement of the `index`-th point in variant `step` (wrapped).
    /// Each axis moves by at most `factor` times the point's distance from
    /// the origin, or `factor` units for points near it.
    pub fn compute_offset(&self, point: Point, step: usize, index: usize) -> Vec2 {
        let seed = self.seeds[step % self.seeds.len()];
        let magnitude = point.to_vec2().hypot().max(1.0) * self.config.variance.factor();
        let i = index as u64;
        let ux = noise01(seed, i.wrapping_mul(2));
        let uy = noise01(seed, i.wrapping_mul(2).wrapping_add(1));
        Vec2::new(magnitude * (2.0 * ux - 1.0), magnitude * (2.0 * uy - 1.0))
    }

    pub fn apply_variance(&self, point: Point, step: usize, index: usize) -> Point {
        point + self.compute_offset(point, step, index)
    }

    /// Offsets for a list of paths in one variant. Point indices run on
    /// across paths so no two points of a step share one.
    fn step_offsets(&self, paths: &[&BezPath], step: usize) -> Vec<Vec<Vec2>> {
        let mut index = 0usize;
        paths
            .iter()
            .map(|path| {
                path_points(path)
                    .into_iter()
                    .map(|p| {
                        let offset = self.compute_offset(p, step, index);
                        index += 1;
                        offset
                    })
                    .collect()
            })
            .collect()
    }

    /// Every variant of a single path.
    pub fn precompute_path(&self, path: &BezPath) -> Vec<BezPath> {
        (0..self.step_count())
            .map(|step| {
                let offsets = self.step_offsets(&[path], step);
                displace_path(path, &offsets[0])
            })
            .collect()
    }

    /// Build every variant of `commands` up front. Only geometry differs
    /// between variants; styles and clips are shared with the base commands.
    ///
    /// Steps are computed in parallel on the rayon global pool. Each step
    /// depends only on its own seed, so the result is the same on any pool.
    #[tracing::instrument(skip_all, fields(steps = self.step_count(), commands = commands.len()))]
    pub fn precompute_all_steps(
        &self,
        commands: &[RoughRenderCommand],
        size: CanvasSize,
    ) -> AnimationFrameCache {
        let paths: Vec<&BezPath> = commands.iter().map(|c| &c.path).collect();
        let frames: Vec<StepFrame> = (0..self.step_count())
            .into_par_iter()
            .map(|step| StepFrame {
                seed: self.seeds[step],
                offsets: self.step_offsets(&paths, step),
            })
            .collect();
        tracing::debug!(frames = frames.len(), "precomputed animation frames");
        AnimationFrameCache {
            size,
            config: self.config,
            base: commands.to_vec(),
            frames,
        }
    }
}

/// All variants of one drawing at one size. Rebuild it when the size or the
/// config changes; otherwise every lookup is a plain index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationFrameCache {
    size: CanvasSize,
    config: AnimationConfig,
    base: Vec<RoughRenderCommand>,
    frames: Vec<StepFrame>,
}

impl AnimationFrameCache {
    /// The "nothing precomputed yet" state.
    pub fn empty() -> AnimationFrameCache {
        AnimationFrameCache::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn step_count(&self) -> usize {
        self.frames.len()
    }

    /// True when this cache was built for `size` and `config`.
    pub fn matches(&self, size: CanvasSize, config: &AnimationConfig) -> bool {
        !self.is_empty() && self.size.key() == size.key() && self.config == config.clamped()
    }

    /// Variant `n`, wrapping past the last one.
    pub fn frame(&self, n: usize) -> Option<&StepFrame> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(n % self.frames.len())
    }

    /// Absolute render commands of variant `n`.
    pub fn commands(&self, n: usize) -> Vec<RoughRenderCommand> {
        let Some(frame) = self.frame(n) else {
            return vec![];
        };
        self.base
            .iter()
            .zip(&frame.offsets)
            .map(|(cmd, offsets)| cmd.with_path(displace_path(&cmd.path, offsets)))
            .collect()
    }

    /// Which variant is showing `elapsed` into the loop.
    pub fn frame_for_elapsed(&self, elapsed: Duration) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        let per_frame = self.config.speed.frame_duration().as_millis().max(1);
        ((elapsed.as_millis() / per_frame) % self.frames.len() as u128)
            .to_usize()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::render_command::RenderStyle;
    use crate::geometry::brush::{LineCap, LineJoin};

    fn square_path() -> BezPath {
        let mut p = BezPath::new();
        p.move_to((10.0, 10.0));
        p.line_to((90.0, 10.0));
        p.curve_to((95.0, 40.0), (95.0, 60.0), (90.0, 90.0));
        p.line_to((10.0, 90.0));
        p.close_path();
        p
    }

    fn commands() -> Vec<RoughRenderCommand> {
        let stroke = RoughRenderCommand {
            cap: LineCap::Round,
            join: LineJoin::Bevel,
            clip: Some(square_path()),
            invert_clip: true,
            ..RoughRenderCommand::new(
                square_path(),
                RenderStyle::Stroke {
                    color: "black".to_string(),
                    width: 2.0,
                    opacity: 1.0,
                },
            )
        };
        let fill = RoughRenderCommand::new(
            square_path(),
            RenderStyle::Fill {
                color: "red".to_string(),
                opacity: 0.5,
            },
        );
        vec![fill, stroke]
    }

    #[test]
    fn test_step_seeds_deterministic() {
        let a = AnimationEngine::new(&AnimationConfig::default(), 42);
        let b = AnimationEngine::new(&AnimationConfig::default(), 42);
        assert_eq!(a.seeds(), b.seeds());
        assert_ne!(a.seeds()[0], a.seeds()[1]);
        let c = AnimationEngine::new(&AnimationConfig::default(), 43);
        assert_ne!(a.seeds(), c.seeds());
    }

    #[test]
    fn test_steps_clamped() {
        let config = AnimationConfig::new(0, AnimationSpeed::Fast, AnimationVariance::High);
        assert_eq!(config.steps, 2);
        assert_eq!(AnimationEngine::new(&AnimationConfig { steps: 1, ..config }, 1).step_count(), 2);
        let parsed = AnimationConfig::from_ron("(steps: 1, speed: Slow)").expect("valid config");
        assert_eq!(parsed.steps, 2);
        assert_eq!(parsed.speed, AnimationSpeed::Slow);
        assert_eq!(parsed.variance, AnimationVariance::Low);
    }

    #[test]
    fn test_offset_matches_variance() {
        let engine = AnimationEngine::new(
            &AnimationConfig::new(5, AnimationSpeed::Medium, AnimationVariance::High),
            9,
        );
        for step in 0..7 {
            for index in 0..20 {
                let p = Point::new(index as f64 * 13.0 - 50.0, step as f64 * 7.0 + 0.5);
                let offset = engine.compute_offset(p, step, index);
                assert_eq!(p + offset, engine.apply_variance(p, step, index));
                let bound = p.to_vec2().hypot().max(1.0) * 0.10;
                assert!(offset.x.abs() <= bound && offset.y.abs() <= bound);
            }
        }
    }

    #[test]
    fn test_offsets_vary_by_step_and_index() {
        let engine = AnimationEngine::new(&AnimationConfig::default(), 3);
        let p = Point::new(100.0, 100.0);
        assert_ne!(engine.compute_offset(p, 0, 0), engine.compute_offset(p, 1, 0));
        assert_ne!(engine.compute_offset(p, 0, 0), engine.compute_offset(p, 0, 1));
        assert_eq!(engine.compute_offset(p, 2, 5), engine.compute_offset(p, 2, 5));
        // Steps wrap.
        assert_eq!(engine.compute_offset(p, 1, 5), engine.compute_offset(p, 5, 5));
    }

    #[test]
    fn test_precompute_wraps() {
        let k = 3;
        let engine = AnimationEngine::new(
            &AnimationConfig::new(k, AnimationSpeed::Fast, AnimationVariance::Medium),
            11,
        );
        let cache = engine.precompute_all_steps(&commands(), CanvasSize::new(100.0, 100.0));
        assert_eq!(cache.step_count(), k);
        assert_eq!(cache.commands(k), cache.commands(0));
        assert_eq!(cache.commands(100), cache.commands(100 % k));
        assert_ne!(cache.commands(0), cache.commands(1));
        assert_eq!(cache.frame(4), cache.frame(1));
    }

    #[test]
    fn test_only_geometry_varies() {
        let base = commands();
        let engine = AnimationEngine::new(&AnimationConfig::default(), 5);
        let cache = engine.precompute_all_steps(&base, CanvasSize::new(100.0, 100.0));
        for n in 0..cache.step_count() {
            let frame = cache.commands(n);
            assert_eq!(frame.len(), base.len());
            for (a, b) in frame.iter().zip(&base) {
                assert_eq!(a.is_stroke(), b.is_stroke());
                assert_eq!(a.style, b.style);
                assert_eq!((a.cap, a.join), (b.cap, b.join));
                assert_eq!(a.clip, b.clip);
                assert_eq!(a.invert_clip, b.invert_clip);
                assert_eq!(a.path.elements().len(), b.path.elements().len());
                assert_ne!(a.path, b.path);
            }
        }
    }

    #[test]
    fn test_precompute_path() {
        let engine = AnimationEngine::new(&AnimationConfig::default(), 5);
        let variants = engine.precompute_path(&square_path());
        assert_eq!(variants.len(), 4);
        let first = path_points(&variants[0]);
        let expected: Vec<Point> = path_points(&square_path())
            .into_iter()
            .enumerate()
            .map(|(i, p)| engine.apply_variance(p, 0, i))
            .collect();
        assert_eq!(first, expected);
    }

    #[test]
    fn test_parallel_precompute_matches_sequential() {
        let base = commands();
        let engine = AnimationEngine::new(
            &AnimationConfig::new(6, AnimationSpeed::Fast, AnimationVariance::High),
            21,
        );
        let size = CanvasSize::new(100.0, 100.0);
        let cache = engine.precompute_all_steps(&base, size);
        let again = engine.precompute_all_steps(&base, size);
        let sequential = engine.precompute_path(&base[0].path);
        for n in 0..cache.step_count() {
            assert_eq!(cache.commands(n), again.commands(n));
            assert_eq!(cache.commands(n)[0].path, sequential[n]);
        }
    }

    #[test]
    fn test_empty_cache() {
        let cache = AnimationFrameCache::empty();
        assert!(cache.is_empty());
        assert!(cache.frame(3).is_none());
        assert!(cache.commands(0).is_empty());
        assert_eq!(cache.frame_for_elapsed(Duration::from_secs(5)), 0);
        assert!(!cache.matches(CanvasSize::default(), &AnimationConfig::default()));
    }

    #[test]
    fn test_frame_for_elapsed_and_matches() {
        let config = AnimationConfig::new(4, AnimationSpeed::Medium, AnimationVariance::Low);
        let size = CanvasSize::new(100.0, 80.0);
        let cache = AnimationEngine::new(&config, 1).precompute_all_steps(&commands(), size);
        assert_eq!(cache.frame_for_elapsed(Duration::from_millis(650)), 2);
        assert_eq!(cache.frame_for_elapsed(Duration::from_millis(1250)), 0);
        assert!(cache.matches(CanvasSize::new(100.2, 79.9), &config));
        assert!(!cache.matches(size, &AnimationConfig { steps: 5, ..config }));
        assert!(!cache.matches(CanvasSize::new(120.0, 80.0), &config));
    }
}
