use crate::config::{ExperimentConfig, SessionConfig};
use overlap_core::{
    Button, CircleLayout, InputEvent, PointerEvent, SessionPhase, Slider, SliderError, TrialResult,
    TrialSpec, compute_layout,
};
use overlap_timing::Timer;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TrialStarted(usize),
    TrialRecorded(usize),
    /// Next was pressed before both sliders had been adjusted.
    AdjustmentRequired,
    SessionComplete,
    Aborted,
}

/// Owns every piece of mutable experiment state: the phase, the widgets and
/// the result log. The event loop hands it input and reads it back to draw.
pub struct SessionStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub phase: SessionPhase,
    pub timer: T,
    pub rng: R,
    pub size_slider: Slider,
    pub overlap_slider: Slider,
    pub next_button: Button,
    settings: SessionConfig,
    base_radius: f64,
    left_center: (f64, f64),
    trials: Vec<TrialSpec>,
    participant_id: String,
    results: Vec<TrialResult>,
    trial_started_at: u64,
    swapped: bool,
    show_warning: bool,
}

impl<T, R> SessionStateMachine<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(
        config: &ExperimentConfig,
        trials: Vec<TrialSpec>,
        timer: T,
        rng: R,
    ) -> Result<Self, SliderError> {
        Ok(Self {
            phase: SessionPhase::default(),
            size_slider: Slider::new(config.size_slider.clone())?,
            overlap_slider: Slider::new(config.overlap_slider.clone())?,
            next_button: Button::new(config.next_button.rect, config.next_button.label.clone()),
            settings: config.session.clone(),
            base_radius: config.stimulus.base_radius,
            left_center: config.left_center(),
            trials,
            participant_id: String::new(),
            results: Vec::new(),
            trial_started_at: timer.now(),
            swapped: false,
            show_warning: false,
            timer,
            rng,
        })
    }

    /// Applies one input event. Finished sessions ignore everything.
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<SessionEvent> {
        if self.phase.is_finished() {
            return Vec::new();
        }
        match event {
            InputEvent::Quit | InputEvent::Cancel => vec![self.abort()],
            _ if self.phase.is_entry() => self.handle_entry_input(event),
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            // Keyboard has no effect during trials
            _ => Vec::new(),
        }
    }

    fn handle_entry_input(&mut self, event: InputEvent) -> Vec<SessionEvent> {
        match event {
            InputEvent::Text(text) => {
                for c in text.chars().filter(|&c| is_printable(c)) {
                    if self.participant_id.chars().count() >= self.settings.max_participant_id_len {
                        break;
                    }
                    self.participant_id.push(c);
                }
                Vec::new()
            }
            InputEvent::Backspace => {
                self.participant_id.pop();
                Vec::new()
            }
            InputEvent::Confirm if !self.participant_id.is_empty() => self.begin_trials(),
            _ => Vec::new(),
        }
    }

    /// Dispatch order is size slider, overlap slider, then the button.
    fn handle_pointer(&mut self, pointer: PointerEvent) -> Vec<SessionEvent> {
        self.size_slider.handle_pointer(pointer);
        self.overlap_slider.handle_pointer(pointer);

        if self.show_warning && self.adjusted() {
            self.show_warning = false;
        }

        if self.next_button.handle_pointer(pointer) {
            return self.confirm_trial();
        }
        Vec::new()
    }

    fn adjusted(&self) -> bool {
        self.size_slider.is_touched() && self.overlap_slider.is_touched()
    }

    fn begin_trials(&mut self) -> Vec<SessionEvent> {
        log::info!("Participant '{}' starting session", self.participant_id);
        if self.trials.is_empty() {
            self.phase = SessionPhase::SessionComplete;
            return vec![SessionEvent::SessionComplete];
        }
        self.start_trial(0);
        vec![SessionEvent::TrialStarted(0)]
    }

    fn start_trial(&mut self, index: usize) {
        self.phase = SessionPhase::RunningTrial(index);
        self.size_slider.reset();
        self.overlap_slider.reset();
        self.show_warning = false;
        self.swapped = self.settings.randomize_sides && self.rng.random_bool(0.5);
        self.trial_started_at = self.timer.now();
        log::debug!(
            "Trial {}/{} started (sides swapped: {})",
            index + 1,
            self.trials.len(),
            self.swapped
        );
    }

    /// Records the current slider values and moves on. With the adjustment
    /// gate on, an unadjusted trial only raises the warning.
    fn confirm_trial(&mut self) -> Vec<SessionEvent> {
        let Some(index) = self.phase.trial_index() else {
            return Vec::new();
        };
        if self.settings.require_adjustment && !self.adjusted() {
            self.show_warning = true;
            return vec![SessionEvent::AdjustmentRequired];
        }

        let spec = &self.trials[index];
        let response_time = self.timer.elapsed(self.trial_started_at).as_secs_f64();
        let result = TrialResult {
            participant_id: self.participant_id.clone(),
            trial: index + 1,
            label1: spec.label1.clone(),
            label2: spec.label2.clone(),
            size_percent: self.size_slider.value(),
            overlap_percent: self.overlap_slider.value(),
            timestamp: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            response_time,
            order_indicator: u8::from(self.swapped),
            label_type: spec.label_type.clone(),
        };
        log::info!(
            "Trial {} recorded: size {:.2}%, overlap {:.2}%, {:.2}s",
            result.trial,
            result.size_percent,
            result.overlap_percent,
            result.response_time
        );
        self.results.push(result);

        let mut events = vec![SessionEvent::TrialRecorded(index)];
        match SessionPhase::after_trial(index, self.trials.len()) {
            SessionPhase::RunningTrial(next) => {
                self.start_trial(next);
                events.push(SessionEvent::TrialStarted(next));
            }
            phase => {
                self.size_slider.reset();
                self.overlap_slider.reset();
                self.phase = phase;
                events.push(SessionEvent::SessionComplete);
            }
        }
        events
    }

    /// Ends the session early. Results collected so far are kept.
    pub fn abort(&mut self) -> SessionEvent {
        log::info!(
            "Session aborted in {:?} with {} results",
            self.phase,
            self.results.len()
        );
        self.phase = SessionPhase::Aborted;
        SessionEvent::Aborted
    }

    /// Whether the end of the session should write a results file.
    pub fn should_persist(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn layout(&self) -> CircleLayout {
        compute_layout(
            self.size_slider.value(),
            self.overlap_slider.value(),
            self.base_radius,
            self.left_center,
        )
    }

    pub fn current_phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn current_trial(&self) -> Option<&TrialSpec> {
        self.phase.trial_index().and_then(|i| self.trials.get(i))
    }

    /// Labels for the current trial as `(left, right)`.
    pub fn current_sides(&self) -> Option<(&str, &str)> {
        self.current_trial().map(|t| t.sides(self.swapped))
    }

    /// 1-based trial number and total.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.phase
            .trial_index()
            .map(|i| (i + 1, self.trials.len()))
    }

    pub fn show_warning(&self) -> bool {
        self.show_warning
    }

    pub fn warning_text(&self) -> &str {
        &self.settings.adjustment_warning
    }
}

/// Characters allowed in a participant id: no controls, no invisible
/// format characters, no private use, and space as the only separator.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E0000}'..='\u{E007F}'
            | '\u{F0000}'..='\u{10FFFF}'
    )
}
