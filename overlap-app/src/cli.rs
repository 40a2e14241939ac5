use clap::Parser;
use overlap_experiment::ExperimentConfig;
use std::path::PathBuf;

/// Circle overlap rating task: one label pair per trial, two sliders, one
/// CSV of responses per participant.
#[derive(Parser, Debug)]
#[command(name = "overlap", version, about, long_about = None)]
pub struct Cli {
    /// CSV with `label1`, `label2` and optional `type` columns, one trial per row
    #[arg(short, long, default_value = "labels.csv")]
    pub labels: PathBuf,

    /// TOML settings file (defaults to ./overlap.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for result files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// TrueType font used for all text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Borderless fullscreen on the primary monitor
    #[arg(long)]
    pub fullscreen: bool,

    /// Randomly swap which label belongs to the left circle on each trial
    #[arg(long)]
    pub randomize_sides: bool,

    /// Refuse to advance until both sliders have been moved
    #[arg(long)]
    pub require_adjustment: bool,
}

impl Cli {
    /// Flags win over file and environment settings. Switches only ever
    /// turn a setting on.
    pub fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        config.window.fullscreen |= self.fullscreen;
        config.session.randomize_sides |= self.randomize_sides;
        config.session.require_adjustment |= self.require_adjustment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["overlap"]).unwrap();
        assert_eq!(cli.labels, Path::new("labels.csv"));

        let mut config = ExperimentConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.output.dir, Path::new("."));
        assert!(!config.window.fullscreen);
        assert!(!config.session.randomize_sides);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "overlap",
            "--labels",
            "pairs.csv",
            "--output-dir",
            "/data/out",
            "--font",
            "/fonts/a.ttf",
            "--fullscreen",
            "--randomize-sides",
            "--require-adjustment",
        ])
        .unwrap();
        assert_eq!(cli.labels, Path::new("pairs.csv"));

        let mut config = ExperimentConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.output.dir, Path::new("/data/out"));
        assert_eq!(config.font_path.as_deref(), Some(Path::new("/fonts/a.ttf")));
        assert!(config.window.fullscreen);
        assert!(config.session.randomize_sides);
        assert!(config.session.require_adjustment);
    }

    #[test]
    fn switches_do_not_clear_file_settings() {
        let cli = Cli::try_parse_from(["overlap"]).unwrap();
        let mut config = ExperimentConfig::default();
        config.session.require_adjustment = true;
        cli.apply(&mut config);
        assert!(config.session.require_adjustment);
    }
}
