use crate::input::{PointerEvent, Rect};
use crate::scale::ScaleKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A caption drawn above the track at a scale-mapped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub text: String,
}

/// Static description of a slider: geometry, range, scale and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub caption: String,
    pub track: Rect,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    #[serde(default)]
    pub scale: ScaleKind,
    /// Reference line drawn on the track; does not affect the value.
    #[serde(default)]
    pub center: Option<f64>,
    #[serde(default = "default_handle_radius")]
    pub handle_radius: f64,
    /// Draw `"{value:.0}%"` under the track.
    #[serde(default)]
    pub show_value: bool,
    #[serde(default)]
    pub ticks: Vec<Tick>,
    #[serde(default = "default_handle_color")]
    pub handle_color: [u8; 4],
}

fn default_handle_radius() -> f64 {
    12.0
}

fn default_handle_color() -> [u8; 4] {
    [100, 100, 100, 255]
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliderError {
    #[error("slider '{caption}': min {min} must be below max {max}")]
    EmptyRange { caption: String, min: f64, max: f64 },
    #[error("slider '{caption}': logarithmic scale needs a positive minimum, got {min}")]
    NonPositiveLogMinimum { caption: String, min: f64 },
    #[error("slider '{caption}': default {default} lies outside [{min}, {max}]")]
    DefaultOutOfRange {
        caption: String,
        default: f64,
        min: f64,
        max: f64,
    },
    #[error("slider '{caption}': track must have a positive width")]
    EmptyTrack { caption: String },
}

impl SliderSpec {
    pub fn validate(&self) -> Result<(), SliderError> {
        let caption = self.caption.clone();
        // Written negated so NaN bounds are rejected too.
        if !(self.min < self.max) {
            return Err(SliderError::EmptyRange {
                caption,
                min: self.min,
                max: self.max,
            });
        }
        if self.scale == ScaleKind::Logarithmic && !(self.min > 0.0) {
            return Err(SliderError::NonPositiveLogMinimum {
                caption,
                min: self.min,
            });
        }
        if !(self.default >= self.min && self.default <= self.max) {
            return Err(SliderError::DefaultOutOfRange {
                caption,
                default: self.default,
                min: self.min,
                max: self.max,
            });
        }
        if !(self.track.width > 0.0) {
            return Err(SliderError::EmptyTrack { caption });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Horizontal slider driven by pointer events.
#[derive(Debug, Clone)]
pub struct Slider {
    spec: SliderSpec,
    value: f64,
    drag: DragState,
    touched: bool,
}

impl Slider {
    pub fn new(spec: SliderSpec) -> Result<Self, SliderError> {
        spec.validate()?;
        Ok(Self {
            value: spec.default,
            spec,
            drag: DragState::Idle,
            touched: false,
        })
    }

    pub fn spec(&self) -> &SliderSpec {
        &self.spec
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// True once the participant has grabbed the slider since the last reset.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Track proportion in `[0, 1]` for an arbitrary value.
    pub fn proportion_of(&self, value: f64) -> f64 {
        self.spec
            .scale
            .to_proportion(value, self.spec.min, self.spec.max)
    }

    /// Track x coordinate for an arbitrary value.
    pub fn x_for_value(&self, value: f64) -> f64 {
        self.spec.track.x + self.proportion_of(value) * self.spec.track.width
    }

    pub fn handle_center(&self) -> (f64, f64) {
        (self.x_for_value(self.value), self.spec.track.center().1)
    }

    pub fn center_marker_x(&self) -> Option<f64> {
        self.spec.center.map(|c| self.x_for_value(c))
    }

    /// Clamps `x` to the track and normalizes it. Non-finite input lands on
    /// the left end.
    pub fn proportion_at(&self, x: f64) -> f64 {
        let track = &self.spec.track;
        let clamped = x.max(track.x).min(track.right());
        (clamped - track.x) / track.width
    }

    /// Moves the value to the position under the pointer.
    pub fn set_from_pointer(&mut self, x: f64) {
        let p = self.proportion_at(x);
        let value = self.spec.scale.to_value(p, self.spec.min, self.spec.max);
        self.value = value.clamp(self.spec.min, self.spec.max);
    }

    fn grabs(&self, pos: (f64, f64)) -> bool {
        let (hx, hy) = self.handle_center();
        let distance = (pos.0 - hx).hypot(pos.1 - hy);
        distance <= self.spec.handle_radius || self.spec.track.contains(pos)
    }

    /// Feeds one pointer event through the drag state machine. Returns true
    /// when the value was updated.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Pressed { x, y } => {
                if self.grabs((x, y)) {
                    self.drag = DragState::Dragging;
                    self.touched = true;
                    self.set_from_pointer(x);
                    return true;
                }
                false
            }
            PointerEvent::Released { .. } => {
                self.drag = DragState::Idle;
                false
            }
            PointerEvent::Moved { x, .. } => {
                if self.drag == DragState::Dragging {
                    self.set_from_pointer(x);
                    return true;
                }
                false
            }
        }
    }

    /// Back to the default value, dropping any drag in progress.
    pub fn reset(&mut self) {
        self.value = self.spec.default;
        self.drag = DragState::Idle;
        self.touched = false;
    }
}
