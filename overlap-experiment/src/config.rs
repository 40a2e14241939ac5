use overlap_core::{Rect, ScaleKind, SliderError, SliderSpec, Tick};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "overlap.toml";
pub const ENV_PREFIX: &str = "OVERLAP";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub window: WindowConfig,
    pub stimulus: StimulusConfig,
    pub size_slider: SliderSpec,
    pub overlap_slider: SliderSpec,
    pub next_button: ButtonConfig,
    pub session: SessionConfig,
    pub output: OutputConfig,
    /// TrueType font for all text. Common system locations are searched
    /// when unset.
    pub font_path: Option<PathBuf>,
}

/// Canvas and window. All layout coordinates are canvas pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub target_fps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    pub base_radius: f64,
    pub left_center: [f64; 2],
    pub circle_alpha: u8,
    pub left_fill: [u8; 3],
    pub left_outline: [u8; 3],
    pub right_fill: [u8; 3],
    pub right_outline: [u8; 3],
    pub left_label_pos: [f64; 2],
    pub right_label_pos: [f64; 2],
    pub words_per_line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub rect: Rect,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_participant_id_len: usize,
    /// Coin flip per trial for which label sits at the left circle.
    pub randomize_sides: bool,
    /// Hold the Next button until both sliders have been grabbed.
    pub require_adjustment: bool,
    pub adjustment_warning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub write_json: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            stimulus: StimulusConfig::default(),
            size_slider: SliderSpec {
                caption: "Right Circle Size".to_string(),
                track: Rect::new(300.0, 550.0, 600.0, 30.0),
                min: 10.0,
                max: 1000.0,
                default: 100.0,
                scale: ScaleKind::Logarithmic,
                center: Some(100.0),
                handle_radius: 12.0,
                show_value: false,
                ticks: vec![
                    Tick {
                        value: 10.0,
                        text: "smaller".to_string(),
                    },
                    Tick {
                        value: 100.0,
                        text: "same".to_string(),
                    },
                    Tick {
                        value: 1000.0,
                        text: "larger".to_string(),
                    },
                ],
                handle_color: [50, 75, 200, 255],
            },
            overlap_slider: SliderSpec {
                caption: "Overlap Percentage".to_string(),
                track: Rect::new(300.0, 650.0, 600.0, 30.0),
                min: 0.0,
                max: 100.0,
                default: 0.0,
                scale: ScaleKind::Linear,
                center: None,
                handle_radius: 12.0,
                show_value: true,
                ticks: vec![
                    Tick {
                        value: 0.0,
                        text: "0%".to_string(),
                    },
                    Tick {
                        value: 100.0,
                        text: "100%".to_string(),
                    },
                ],
                handle_color: [200, 50, 50, 255],
            },
            next_button: ButtonConfig::default(),
            session: SessionConfig::default(),
            output: OutputConfig::default(),
            font_path: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Circle Overlap Experiment".to_string(),
            width: 1200,
            height: 800,
            fullscreen: false,
            target_fps: 60,
        }
    }
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            base_radius: 50.0,
            left_center: [550.0, 300.0],
            circle_alpha: 180,
            left_fill: [100, 150, 255],
            left_outline: [50, 75, 200],
            right_fill: [255, 100, 100],
            right_outline: [200, 50, 50],
            left_label_pos: [400.0, 120.0],
            right_label_pos: [800.0, 120.0],
            words_per_line: 5,
        }
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            rect: Rect::new(1050.0, 720.0, 120.0, 50.0),
            label: "Next".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_participant_id_len: 20,
            randomize_sides: false,
            require_adjustment: false,
            adjustment_warning: "Please adjust both sliders before continuing".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "overlap_results".to_string(),
            write_json: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Slider(#[from] SliderError),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.size_slider.validate()?;
        self.overlap_slider.validate()?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                key: "window",
                reason: format!(
                    "canvas must not be empty, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        if self.window.target_fps == 0 {
            return Err(ConfigError::Invalid {
                key: "window.target_fps",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.stimulus.base_radius > 0.0) {
            return Err(ConfigError::Invalid {
                key: "stimulus.base_radius",
                reason: format!("must be positive, got {}", self.stimulus.base_radius),
            });
        }
        if self.stimulus.words_per_line == 0 {
            return Err(ConfigError::Invalid {
                key: "stimulus.words_per_line",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn left_center(&self) -> (f64, f64) {
        let [x, y] = self.stimulus.left_center;
        (x, y)
    }
}

/// Layers built-in defaults, the TOML file and `OVERLAP_*` environment
/// variables, then validates the result.
///
/// An explicit `path` must exist; otherwise `overlap.toml` in the working
/// directory is used when present.
pub fn load_config(path: Option<&Path>) -> Result<ExperimentConfig, ConfigError> {
    let defaults = config::Config::try_from(&ExperimentConfig::default())?;

    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let settings = config::Config::builder()
        .add_source(defaults)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: ExperimentConfig = settings.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}
