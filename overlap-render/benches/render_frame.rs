use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use overlap_core::{Button, Rect, ScaleKind, Slider, SliderSpec, Tick, compute_layout};
use overlap_render::{
    EntryScene, Scene, SkiaRenderer, StimulusStyle, TrialScene, load_font, locate_system_font,
};
use overlap_timing::HighPrecisionTimer;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;

fn slider(caption: &str, y: f64, min: f64, max: f64, default: f64, scale: ScaleKind) -> Slider {
    Slider::new(SliderSpec {
        caption: caption.into(),
        track: Rect::new(300.0, y, 600.0, 30.0),
        min,
        max,
        default,
        scale,
        center: Some(default),
        handle_radius: 12.0,
        show_value: true,
        ticks: vec![
            Tick {
                value: min,
                text: "min".into(),
            },
            Tick {
                value: max,
                text: "max".into(),
            },
        ],
        handle_color: [100, 100, 100, 255],
    })
    .expect("valid bench slider")
}

fn harness() -> Option<(SkiaRenderer, Vec<u8>, HighPrecisionTimer)> {
    let font = load_font(&locate_system_font()?).ok()?;
    let r = SkiaRenderer::new(WIDTH, HEIGHT, font, StimulusStyle::default()).ok()?;
    let fb = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    Some((r, fb, HighPrecisionTimer::new()))
}

pub fn bench_frames(c: &mut Criterion) {
    let Some((mut r, mut fb, mut t)) = harness() else {
        eprintln!("render_frame: no system font found, skipping");
        return;
    };
    let size = slider("Right Circle Size", 550.0, 10.0, 1000.0, 100.0, ScaleKind::Logarithmic);
    let overlap = slider("Overlap Percentage", 650.0, 0.0, 100.0, 0.0, ScaleKind::Linear);
    let button = Button::new(Rect::new(1050.0, 720.0, 120.0, 50.0), "Next");

    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("trial_frame", |b| {
        let mut overlap_percent = 0.0;
        b.iter(|| {
            overlap_percent = (overlap_percent + 1.0) % 100.0;
            let scene = Scene::Trial(TrialScene {
                title: "Circle Overlap Experiment",
                trial: 3,
                total: 40,
                layout: compute_layout(250.0, overlap_percent, 50.0, (550.0, 300.0)),
                left_label: "my closest friend from school",
                right_label: "myself as I am today in everyday life",
                size_slider: &size,
                overlap_slider: &overlap,
                button: &button,
                warning: None,
            });
            black_box(r.render_frame(&scene, &mut fb, &mut t).ok());
        })
    });

    g.bench_function("entry_frame_cold_cache", |b| {
        b.iter_batched(
            || harness().expect("font located above"),
            |(mut r, mut fb, mut t)| {
                let scene = Scene::ParticipantEntry(EntryScene {
                    title: "Circle Overlap Experiment",
                    participant_id: "P-0042",
                    cursor_visible: true,
                });
                black_box(r.render_frame(&scene, &mut fb, &mut t).ok());
            },
            BatchSize::LargeInput,
        )
    });

    g.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
