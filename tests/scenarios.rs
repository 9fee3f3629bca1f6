use roughplot::geometry::hatch::pattern_fill;
use roughplot::prelude::*;
use roughplot::sketch::Randomizer;
use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn size() -> CanvasSize {
    CanvasSize::new(400.0, 300.0)
}

fn every_shape() -> Vec<ShapeDescriptor> {
    vec![
        ShapeDescriptor::Line {
            from: (10.0, 10.0).into(),
            to: (120.0, 60.0).into(),
        },
        ShapeDescriptor::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 80.0,
        },
        ShapeDescriptor::RoundedRectangle {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 80.0,
            corner_radius: 10.0,
        },
        ShapeDescriptor::Ellipse {
            x: 100.0,
            y: 100.0,
            width: 120.0,
            height: 60.0,
        },
        ShapeDescriptor::Circle {
            x: 100.0,
            y: 100.0,
            diameter: 80.0,
        },
        ShapeDescriptor::Polygon {
            points: vec![(10.0, 10.0).into(), (90.0, 20.0).into(), (50.0, 90.0).into()],
        },
        ShapeDescriptor::Arc {
            x: 100.0,
            y: 100.0,
            width: 80.0,
            height: 80.0,
            start: 0.0,
            stop: 2.0,
            closed: true,
        },
        ShapeDescriptor::Curve {
            points: vec![
                (10.0, 10.0).into(),
                (60.0, 80.0).into(),
                (120.0, 20.0).into(),
                (180.0, 90.0).into(),
            ],
        },
        ShapeDescriptor::LinearPath {
            points: vec![(10.0, 10.0).into(), (60.0, 80.0).into(), (120.0, 20.0).into()],
            closed: false,
        },
        ShapeDescriptor::svg_path("M10 10 C40 0 80 40 100 100 L10 100 Z"),
    ]
}

#[test]
fn rectangle_has_fill_and_stroke() {
    let mut ctx = Context::new();
    let rect = ShapeDescriptor::from_params("rectangle", &[10.0, 10.0, 100.0, 80.0])
        .expect("valid rectangle");
    let drawing = ctx
        .generate(&rect, &RenderOptions::default(), size())
        .expect("drawn");
    assert_eq!(drawing.sets.len(), 2);
    let stroke = drawing
        .sets_of(OpSetKind::StrokePath)
        .next()
        .expect("stroke set");
    assert!(!stroke.is_empty());
    assert_eq!(drawing.render_commands().len(), 2);
}

#[test]
fn generation_is_repeatable() {
    for style in FillStyle::ALL {
        let options = RenderOptions::default()
            .with_fill(Some("red"))
            .with_fill_style(style);
        for shape in every_shape() {
            let a = Generator::new(size()).generate(&shape, &options);
            let b = Generator::new(size()).generate(&shape, &options);
            assert!(a.is_some(), "{} {style:?}", shape.tag());
            assert_eq!(a, b, "{} {style:?}", shape.tag());
        }
    }
}

#[test]
fn zero_roughness_traces_the_exact_outline() {
    let options = RenderOptions::default().with_roughness(0.0).with_fill(None);
    let shapes = [
        ShapeDescriptor::Rectangle {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 80.0,
        },
        ShapeDescriptor::Polygon {
            points: vec![(0.0, 0.0).into(), (50.0, 0.0).into(), (50.0, 40.0).into()],
        },
    ];
    let expected = [(10.0, 20.0, 110.0, 100.0), (0.0, 0.0, 50.0, 40.0)];
    for (shape, (x0, y0, x1, y1)) in shapes.iter().zip(expected) {
        let drawing = Generator::new(size()).generate(shape, &options).expect("drawn");
        let b = drawing.bounds().expect("non-empty");
        for (got, want) in [(b.x0, x0), (b.y0, y0), (b.x1, x1), (b.y1, y1)] {
            assert!((got - want).abs() < 1e-9, "{}: {got} != {want}", shape.tag());
        }
        // Every pass starts exactly on a vertex.
        let vertices = match shape {
            ShapeDescriptor::Polygon { points } => points.clone(),
            _ => vec![
                (x0, y0).into(),
                (x1, y0).into(),
                (x1, y1).into(),
                (x0, y1).into(),
            ],
        };
        for op in &drawing.sets[0].ops {
            if let Operation::Move(p) = op {
                assert!(vertices.contains(p), "{}: {p:?}", shape.tag());
            }
        }
    }
}

#[test]
fn drawing_cache_produces_once() {
    let mut cache = DrawingCache::new(16);
    let shape = ShapeDescriptor::Circle {
        x: 50.0,
        y: 50.0,
        diameter: 40.0,
    };
    let options = RenderOptions::default();
    let key = DrawingKey::new(&shape, &options, size());
    let calls = Cell::new(0);
    let produce = || {
        calls.set(calls.get() + 1);
        Generator::new(size()).generate(&shape, &options)
    };
    let first = cache.get_or_generate(key, produce).expect("drawn");
    let second = cache.get_or_generate(key, produce).expect("drawn");
    assert_eq!(calls.get(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    assert_eq!(stats.hit_rate, 0.5);
    cache.clear();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn generator_cache_evicts_least_recent() {
    let mut cache = GeneratorCache::new(3);
    let sizes: Vec<CanvasSize> = (1..=3).map(|i| CanvasSize::new(i as f64 * 100.0, 50.0)).collect();
    for s in &sizes {
        cache.generator_for(*s);
    }
    // Touch the oldest so the second size becomes least recent.
    cache.generator_for(sizes[0]);
    cache.generator_for(CanvasSize::new(400.0, 50.0));
    cache.generator_for(CanvasSize::new(500.0, 50.0));
    assert_eq!(cache.len(), 3);
    assert!(cache.contains(sizes[0]));
    assert!(!cache.contains(sizes[1]));
    assert!(!cache.contains(sizes[2]));
}

#[test]
fn animation_frames_wrap() {
    let mut ctx = Context::new();
    let drawing = ctx
        .generate(
            &ShapeDescriptor::Ellipse {
                x: 100.0,
                y: 100.0,
                width: 120.0,
                height: 80.0,
            },
            &RenderOptions::default().with_fill(Some("red")),
            size(),
        )
        .expect("drawn");
    let commands = drawing.render_commands();
    for k in [2usize, 3, 7] {
        let config = AnimationConfig::new(k, AnimationSpeed::Fast, AnimationVariance::Medium);
        let engine = AnimationEngine::new(&config, drawing.options.seed);
        let cache = engine.precompute_all_steps(&commands, size());
        assert_eq!(cache.step_count(), k);
        assert_eq!(cache.commands(k), cache.commands(0));
        assert_eq!(cache.commands(100), cache.commands(100 % k));
        assert_eq!(
            cache.frame_for_elapsed(Duration::from_millis(100 * k as u64 + 150)),
            1
        );
    }
}

#[test]
fn offsets_reconstruct_variance() {
    let engine = AnimationEngine::new(&AnimationConfig::default(), 77);
    for step in 0..6 {
        for index in 0..50 {
            let p = kurbo::Point::new(index as f64 * 3.5, 200.0 - step as f64 * 11.0);
            let rebuilt = p + engine.compute_offset(p, step, index);
            let direct = engine.apply_variance(p, step, index);
            assert!((rebuilt - direct).hypot() < 1e-12);
        }
    }
}

#[test]
fn cross_hatch_draws_more_than_hachure() {
    let square: Vec<Vec<kurbo::Point>> = vec![vec![
        (0.0, 0.0).into(),
        (100.0, 0.0).into(),
        (100.0, 100.0).into(),
        (0.0, 100.0).into(),
    ]];
    let count = |style: FillStyle| {
        let o = RenderOptions::default().with_fill_style(style);
        pattern_fill(&square, &mut Randomizer::for_options(&o), &o)
            .expect("filled")
            .ops
            .len()
    };
    assert!(count(FillStyle::CrossHatch) > count(FillStyle::Hachure));
}

#[test]
fn thickness_profiles() {
    for t in [0.0, 0.3, 0.5, 1.0, -2.0, 4.0] {
        assert_eq!(ThicknessProfile::Custom(vec![]).multiplier(t), 1.0);
        assert!((ThicknessProfile::Custom(vec![0.7]).multiplier(t) - 0.7).abs() < 1e-12);
    }
    let both = ThicknessProfile::TaperBoth(0.25, 0.25);
    assert!(both.multiplier(0.0).abs() < 1e-9);
    assert!((both.multiplier(0.5) - 1.0).abs() < 1e-9);
    assert!(both.multiplier(1.0).abs() < 1e-9);
}

#[test]
fn scribble_with_high_tightness_is_fast() {
    let options = RenderOptions {
        scribble_tightness: 50,
        ..RenderOptions::default().with_fill_style(FillStyle::Scribble)
    };
    let square = ShapeDescriptor::Rectangle {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };
    let start = Instant::now();
    let drawing = Generator::new(size())
        .generate(&square, &options)
        .expect("drawn");
    assert!(start.elapsed() < Duration::from_secs(1));
    let fill = drawing.sets_of(OpSetKind::FillSketch).next().expect("scribble set");
    assert!(!fill.is_empty());
}

#[test]
fn malformed_input_draws_nothing() {
    let mut ctx = Context::new();
    let o = RenderOptions::default();
    assert!(ShapeDescriptor::from_params("circle", &[1.0, 2.0]).is_err());
    assert!(ctx.generate_svg_path("", &o, size()).is_none());
    assert!(ctx.generate_svg_path("M 10 zz", &o, size()).is_none());
    assert!(ctx
        .generate(&ShapeDescriptor::Curve { points: vec![] }, &o, size())
        .is_none());
    assert_eq!(ctx.stats().drawings.entries, 0);
}

#[test]
fn options_from_ron() {
    let o = RenderOptions::from_ron("(roughness: 2.5, fill: Some(\"red\"), fill_style: dots)")
        .expect("valid options");
    assert_eq!(o.roughness, 2.5);
    assert_eq!(o.fill_style, FillStyle::Dots);
    let drawing = Generator::new(size())
        .generate(
            &ShapeDescriptor::from_ron("Circle(x: 50.0, y: 50.0, diameter: 60.0)").expect("valid"),
            &o,
        )
        .expect("drawn");
    assert_eq!(drawing.sets.len(), 2);
}
