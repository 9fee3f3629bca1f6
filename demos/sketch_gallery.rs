use anyhow::Context as _;
use roughplot::prelude::*;
use std::f64::consts::PI;
use std::path::Path;
use svg::Document;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let size = CanvasSize::new(500.0, 500.0);
    let mut ctx = Context::new();
    let mut doc = Document::new()
        .set("viewBox", (0., 0., size.width, size.height))
        .set("width", "500mm")
        .set("height", "500mm");

    // One square per fill style, three to a row.
    for (i, style) in FillStyle::ALL.iter().enumerate() {
        let x = (i % 3) as f64 * 110. + 20.;
        let y = (i / 3) as f64 * 110. + 20.;
        let options = RenderOptions::default()
            .with_seed(i as u64 + 1)
            .with_fill(Some("teal"))
            .with_fill_style(*style);
        let shape = ShapeDescriptor::Rectangle {
            x,
            y,
            width: 90.,
            height: 90.,
        };
        if let Some(drawing) = ctx.generate(&shape, &options, size) {
            for path in drawing.to_svg_paths() {
                doc = doc.add(path);
            }
        }
    }

    // The rest of the shape family down the right hand side.
    let shapes = vec![
        ShapeDescriptor::Circle {
            x: 410.,
            y: 65.,
            diameter: 80.,
        },
        ShapeDescriptor::Arc {
            x: 410.,
            y: 175.,
            width: 80.,
            height: 80.,
            start: 0.,
            stop: PI * 1.5,
            closed: true,
        },
        ShapeDescriptor::RoundedRectangle {
            x: 370.,
            y: 240.,
            width: 80.,
            height: 60.,
            corner_radius: 12.,
        },
        ShapeDescriptor::Curve {
            points: vec![
                (370., 330.).into(),
                (400., 310.).into(),
                (430., 360.).into(),
                (460., 330.).into(),
            ],
        },
        ShapeDescriptor::svg_path("M370 380 l40 0 l20 30 l-30 30 l-40 -20 z"),
    ];
    let brushed = RenderOptions::from_ron("(fill: Some(\"orange\"), stroke_width: 3.0)")
        .context("parsing the brushed style")?
        .with_brush_profile(BrushProfile::calligraphy());
    for shape in &shapes {
        if let Some(drawing) = ctx.generate(shape, &brushed, size) {
            for path in drawing.to_svg_paths() {
                doc = doc.add(path);
            }
        }
    }
    println!("{:?}", ctx.stats());

    // Write it out to /images/$THIS_EXAMPLE_FILE.svg
    let fname = Path::new(file!())
        .file_stem()
        .and_then(|s| s.to_str())
        .context("example file name")?;
    std::fs::create_dir_all("images").context("creating images/")?;
    svg::save(format!("images/{}.svg", fname), &doc)
        .with_context(|| format!("writing images/{}.svg", fname))?;
    Ok(())
}
