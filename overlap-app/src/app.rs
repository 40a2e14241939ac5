use anyhow::{Context, Result, anyhow};
use overlap_core::{InputEvent, PointerEvent, SessionPhase, TrialSpec};
use overlap_experiment::{ExperimentConfig, SessionEvent, SessionStateMachine};
use overlap_render::{EntryScene, FontVec, Scene, SkiaRenderer, StimulusStyle, TrialScene};
use overlap_timing::{FrameLimiter, HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

pub type Session = SessionStateMachine<HighPrecisionTimer, ThreadRng>;

const CURSOR_BLINK_NS: u64 = 500_000_000;

pub fn style_from(config: &ExperimentConfig) -> StimulusStyle {
    let s = &config.stimulus;
    let pos = |[x, y]: [f64; 2]| (x as f32, y as f32);
    StimulusStyle {
        circle_alpha: s.circle_alpha,
        left_fill: s.left_fill,
        left_outline: s.left_outline,
        right_fill: s.right_fill,
        right_outline: s.right_outline,
        left_label_pos: pos(s.left_label_pos),
        right_label_pos: pos(s.right_label_pos),
        words_per_line: s.words_per_line,
    }
}

/// Text cursor on for the first half of every second.
fn cursor_visible(now_ns: u64) -> bool {
    (now_ns / CURSOR_BLINK_NS) % 2 == 0
}

pub struct App {
    config: ExperimentConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: SkiaRenderer,
    session: Session,

    // Input gathered between redraws, applied at the start of the next frame
    pending: Vec<InputEvent>,
    pointer: (f64, f64),

    limiter: FrameLimiter,
    render_timer: HighPrecisionTimer,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: ExperimentConfig, trials: Vec<TrialSpec>, font: FontVec) -> Result<Self> {
        let session =
            SessionStateMachine::new(&config, trials, HighPrecisionTimer::new(), rand::rng())
                .context("building session")?;
        let renderer = SkiaRenderer::new(
            config.window.width,
            config.window.height,
            font,
            style_from(&config),
        )?;
        let limiter = FrameLimiter::new(config.window.target_fps);

        Ok(Self {
            config,
            window: None,
            pixels: None,
            renderer,
            session,
            pending: Vec::with_capacity(16),
            pointer: (0.0, 0.0),
            limiter,
            render_timer: HighPrecisionTimer::new(),
            error: None,
        })
    }

    /// Runs the window until the session completes or is aborted and hands
    /// the finished session back for persistence.
    pub fn run(mut self) -> Result<Session> {
        let event_loop = EventLoop::new()?;
        log::info!(
            "Platform: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        event_loop.run_app(&mut self)?;

        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let stats = self.render_timer.frame_stats();
        log::debug!(
            "Render timing over {} frames: mean {:.3} ms, jitter {:.3} ms, max {:.3} ms",
            stats.samples,
            stats.average_frame_time_ns / 1e6,
            stats.jitter_ns / 1e6,
            stats.max_frame_time_ns / 1e6,
        );

        if !self.session.is_finished() {
            // Event loop ended without a close request, e.g. the platform tore it down
            self.session.abort();
        }
        Ok(self.session)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let win = &self.config.window;
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());

        let mut attributes = Window::default_attributes()
            .with_title(win.title.clone())
            .with_inner_size(LogicalSize::new(win.width, win.height))
            .with_resizable(true);
        if win.fullscreen {
            let monitor = monitor
                .clone()
                .ok_or_else(|| anyhow!("fullscreen requested but no monitor is available"))?;
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let physical: PhysicalSize<u32> = window.inner_size();

        log::info!(
            "Window {}x{} physical, scale factor {:.2}, canvas {}x{}",
            physical.width,
            physical.height,
            window.scale_factor(),
            win.width,
            win.height
        );
        if let Some(rate) = monitor.and_then(|m| m.refresh_rate_millihertz()) {
            log::info!("Refresh rate: {:.1} Hz", rate as f64 / 1000.0);
        }

        let surface = SurfaceTexture::new(physical.width, physical.height, window.clone());
        let (w, h) = self.renderer.size();
        self.pixels = Some(Pixels::new(w, h, surface).context("creating pixel surface")?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Maps a window position onto the canvas. Positions outside the
    /// letterboxed canvas keep their out-of-range coordinates so the sliders
    /// can clamp them.
    fn to_canvas(&self, position: PhysicalPosition<f64>) -> (f64, f64) {
        let Some(pixels) = &self.pixels else {
            return (position.x, position.y);
        };
        match pixels.window_pos_to_pixel((position.x as f32, position.y as f32)) {
            Ok((x, y)) => (x as f64, y as f64),
            Err((x, y)) => (x as f64, y as f64),
        }
    }

    fn apply_pending_input(&mut self) {
        for event in std::mem::take(&mut self.pending) {
            for outcome in self.session.handle_input(event) {
                match outcome {
                    SessionEvent::TrialStarted(i) => log::debug!("Trial {} started", i + 1),
                    SessionEvent::TrialRecorded(i) => log::debug!("Trial {} recorded", i + 1),
                    SessionEvent::AdjustmentRequired => {
                        log::debug!("Next pressed before both sliders were adjusted")
                    }
                    SessionEvent::SessionComplete => log::info!("All trials completed"),
                    SessionEvent::Aborted => log::debug!("Session aborted by participant"),
                }
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.apply_pending_input();
        if self.session.is_finished() {
            event_loop.exit();
            return Ok(());
        }

        self.render()?;

        self.limiter.throttle(&self.session.timer);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(());
        };
        let session = &self.session;
        let title = self.config.window.title.as_str();

        let scene = match session.current_phase() {
            SessionPhase::EnteringParticipantId => Scene::ParticipantEntry(EntryScene {
                title,
                participant_id: session.participant_id(),
                cursor_visible: cursor_visible(session.timer.now()),
            }),
            SessionPhase::RunningTrial(_) => {
                match (session.current_sides(), session.trial_progress()) {
                    (Some((left, right)), Some((trial, total))) => Scene::Trial(TrialScene {
                        title,
                        trial,
                        total,
                        layout: session.layout(),
                        left_label: left,
                        right_label: right,
                        size_slider: &session.size_slider,
                        overlap_slider: &session.overlap_slider,
                        button: &session.next_button,
                        warning: session.show_warning().then(|| session.warning_text()),
                    }),
                    _ => Scene::Blank,
                }
            }
            SessionPhase::SessionComplete | SessionPhase::Aborted => Scene::Blank,
        };

        let stats = self
            .renderer
            .render_frame(&scene, pixels.frame_mut(), &mut self.render_timer)?;
        pixels.render().context("presenting frame")?;
        log::trace!(
            "draw {:.3} ms, copy {:.3} ms",
            stats.draw.as_secs_f64() * 1e3,
            stats.copy.as_secs_f64() * 1e3
        );
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                log::error!("Failed to resize surface: {e}");
            }
        }
        log::debug!("Window resized to {}x{}", size.width, size.height);
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(event_loop, e.context("creating window"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.pending.push(InputEvent::Quit);
                self.apply_pending_input();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame(event_loop) {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.to_canvas(position);
                self.pointer = (x, y);
                self.pending.push(PointerEvent::Moved { x, y }.into());
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.pointer;
                let event = match state {
                    ElementState::Pressed => PointerEvent::Pressed { x, y },
                    ElementState::Released => PointerEvent::Released { x, y },
                };
                self.pending.push(event.into());
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                let input = match &event.logical_key {
                    Key::Named(NamedKey::Enter) => Some(InputEvent::Confirm),
                    Key::Named(NamedKey::Backspace) => Some(InputEvent::Backspace),
                    Key::Named(NamedKey::Escape) => Some(InputEvent::Cancel),
                    _ => event.text.as_ref().map(|t| InputEvent::Text(t.to_string())),
                };
                if let Some(input) = input {
                    self.pending.push(input);
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_blinks_every_half_second() {
        assert!(cursor_visible(0));
        assert!(cursor_visible(499_999_999));
        assert!(!cursor_visible(500_000_000));
        assert!(!cursor_visible(999_999_999));
        assert!(cursor_visible(1_000_000_000));
    }

    #[test]
    fn style_follows_stimulus_config() {
        let mut config = ExperimentConfig::default();
        config.stimulus.circle_alpha = 90;
        config.stimulus.right_label_pos = [900.0, 140.0];
        let style = style_from(&config);
        assert_eq!(style.circle_alpha, 90);
        assert_eq!(style.right_label_pos, (900.0, 140.0));
        assert_eq!(style.left_fill, [100, 150, 255]);
    }
}
