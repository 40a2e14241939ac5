mod app;
mod cli;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::Cli;
use overlap_experiment::{ResultWriter, load_config, load_trials};
use overlap_render::resolve_font;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    log::info!(
        "Canvas {}x{} at {} fps, output to {}, randomize sides: {}, require adjustment: {}",
        config.window.width,
        config.window.height,
        config.window.target_fps,
        config.output.dir.display(),
        config.session.randomize_sides,
        config.session.require_adjustment
    );
    log::debug!("Effective configuration: {config:?}");

    let trials = load_trials(&cli.labels)
        .with_context(|| format!("loading trials from {}", cli.labels.display()))?;
    let (_, font) = resolve_font(config.font_path.as_deref()).context("loading font")?;
    let writer = ResultWriter::new(&config.output);

    let session = App::new(config, trials, font)?.run()?;

    if !session.should_persist() {
        log::warn!("No data collected");
        return Ok(());
    }
    let saved = writer
        .persist(
            session.participant_id(),
            session.results(),
            &chrono::Local::now(),
        )
        .context("saving results")?;
    if let Some(saved) = saved {
        log::info!("Saved {} trials to {}", saved.rows, saved.csv.display());
        if let Some(json) = saved.json {
            log::info!("JSON copy at {}", json.display());
        }
    }
    Ok(())
}
