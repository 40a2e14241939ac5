use chrono::Local;
use overlap_core::{InputEvent, PointerEvent, ScaleKind};
use overlap_experiment::config::OutputConfig;
use overlap_experiment::{
    ExperimentConfig, ResultWriter, SessionEvent, SessionStateMachine, load_trials,
};
use overlap_timing::ManualTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "overlap-session-{}-{}",
        std::process::id(),
        name
    ));
    let _ = fs_err::remove_dir_all(&dir);
    fs_err::create_dir_all(&dir).unwrap();
    dir
}

fn write_labels(dir: &Path) -> PathBuf {
    let path = dir.join("labels.csv");
    let mut f = fs_err::File::create(&path).unwrap();
    f.write_all(b"label1,label2\nself,other\nfriend,stranger\n")
        .unwrap();
    path
}

fn session(
    config: &ExperimentConfig,
    dir: &Path,
) -> SessionStateMachine<ManualTimer, StdRng> {
    let trials = load_trials(&write_labels(dir)).unwrap();
    SessionStateMachine::new(config, trials, ManualTimer::new(), StdRng::seed_from_u64(1))
        .unwrap()
}

fn writer(dir: &Path) -> ResultWriter {
    ResultWriter::new(&OutputConfig {
        dir: dir.join("out"),
        ..OutputConfig::default()
    })
}

/// Track x that puts a slider's value at `value`.
fn x_for(config: &ExperimentConfig, scale: ScaleKind, value: f64) -> f64 {
    let spec = match scale {
        ScaleKind::Logarithmic => &config.size_slider,
        ScaleKind::Linear => &config.overlap_slider,
    };
    spec.track.x + scale.to_proportion(value, spec.min, spec.max) * spec.track.width
}

fn drag_to(s: &mut SessionStateMachine<ManualTimer, StdRng>, y: f64, from_x: f64, to_x: f64) {
    s.handle_input(PointerEvent::Pressed { x: from_x, y }.into());
    s.handle_input(PointerEvent::Moved { x: to_x, y }.into());
    s.handle_input(PointerEvent::Released { x: to_x, y }.into());
}

fn click(s: &mut SessionStateMachine<ManualTimer, StdRng>, x: f64, y: f64) -> Vec<SessionEvent> {
    let events = s.handle_input(PointerEvent::Pressed { x, y }.into());
    s.handle_input(PointerEvent::Released { x, y }.into());
    events
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().collect::<Result<_, _>>().unwrap()
}

#[test]
fn two_trials_end_to_end() {
    let dir = scratch_dir("e2e");
    let config = ExperimentConfig::default();
    let mut s = session(&config, &dir);

    s.handle_input(InputEvent::Text("P1".into()));
    s.handle_input(InputEvent::Confirm);

    // trial 1 at defaults
    click(&mut s, 1100.0, 745.0);

    // trial 2: size 400, overlap 50
    let size_x = x_for(&config, ScaleKind::Logarithmic, 400.0);
    let overlap_x = x_for(&config, ScaleKind::Linear, 50.0);
    drag_to(&mut s, 565.0, 320.0, size_x);
    drag_to(&mut s, 665.0, 880.0, overlap_x);
    let events = click(&mut s, 1100.0, 745.0);
    assert_eq!(events.last(), Some(&SessionEvent::SessionComplete));

    let saved = writer(&dir)
        .persist(s.participant_id(), s.results(), &Local::now())
        .unwrap()
        .unwrap();
    assert_eq!(saved.rows, 2);
    let file_name = saved.csv.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("overlap_results_P1_"), "{file_name}");

    let rows = read_rows(&saved.csv);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "P1");
    assert_eq!(&rows[0][1], "1");
    assert_eq!(rows[0][4].parse::<f64>().unwrap(), 100.0);
    assert_eq!(rows[0][5].parse::<f64>().unwrap(), 0.0);

    assert_eq!(&rows[1][1], "2");
    assert_eq!(&rows[1][2], "friend");
    assert_eq!(&rows[1][3], "stranger");
    let size: f64 = rows[1][4].parse().unwrap();
    let overlap: f64 = rows[1][5].parse().unwrap();
    assert!((size - 400.0).abs() < 1e-6, "size {size}");
    assert!((overlap - 50.0).abs() < 1e-6, "overlap {overlap}");
}

#[test]
fn abort_after_one_trial_saves_one_row() {
    let dir = scratch_dir("partial");
    let mut s = session(&ExperimentConfig::default(), &dir);
    s.handle_input(InputEvent::Text("P2".into()));
    s.handle_input(InputEvent::Confirm);
    click(&mut s, 1100.0, 745.0);
    assert_eq!(s.handle_input(InputEvent::Cancel), vec![SessionEvent::Aborted]);

    assert!(s.should_persist());
    let saved = writer(&dir)
        .persist(s.participant_id(), s.results(), &Local::now())
        .unwrap()
        .unwrap();
    assert_eq!(read_rows(&saved.csv).len(), 1);
}

#[test]
fn abort_before_any_trial_saves_nothing() {
    let dir = scratch_dir("nothing");
    let mut s = session(&ExperimentConfig::default(), &dir);
    s.handle_input(InputEvent::Text("P3".into()));
    s.handle_input(InputEvent::Confirm);
    s.handle_input(InputEvent::Quit);

    assert!(!s.should_persist());
    let saved = writer(&dir)
        .persist(s.participant_id(), s.results(), &Local::now())
        .unwrap();
    assert_eq!(saved, None);
    assert!(!dir.join("out").exists());
}
