pub mod button;
pub mod geometry;
pub mod input;
pub mod phase;
pub mod scale;
pub mod slider;
pub mod trial;

pub use button::Button;
pub use geometry::{CircleLayout, compute_layout};
pub use input::{InputEvent, PointerEvent, Rect};
pub use phase::SessionPhase;
pub use scale::ScaleKind;
pub use slider::{DragState, Slider, SliderError, SliderSpec, Tick};
pub use trial::{TrialResult, TrialSpec};
