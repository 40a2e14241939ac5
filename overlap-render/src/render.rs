use crate::text::{TextCache, wrap_words};
use ab_glyph::FontVec;
use anyhow::{Result, anyhow, bail};
use overlap_core::{Button, CircleLayout, Rect, Slider};
use overlap_timing::Timer;
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];
pub const LIGHT_GRAY: [u8; 3] = [220, 220, 220];
pub const DARK_GRAY: [u8; 3] = [100, 100, 100];
pub const SLIDER_COLOR: [u8; 3] = [150, 150, 150];
pub const WARNING_RED: [u8; 3] = [200, 50, 50];

const TITLE_PX: f32 = 32.0;
const ENTRY_TITLE_PX: f32 = 42.0;
const BODY_PX: f32 = 26.0;
const PROGRESS_PX: f32 = 22.0;
const LABEL_PX: f32 = 24.0;
const TICK_PX: f32 = 18.0;
const HINT_PX: f32 = 20.0;
const LABEL_LINE_HEIGHT: f32 = 28.0;

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn paint(color: Color) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color(color);
    p.anti_alias = true;
    p
}

/// Path for `rect` with quadratic corners of `radius`.
pub fn rounded_rect(rect: &Rect, radius: f32) -> Option<Path> {
    let (x, y) = (rect.x as f32, rect.y as f32);
    let (w, h) = (rect.width as f32, rect.height as f32);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Colors and label placement for the two circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusStyle {
    pub circle_alpha: u8,
    pub left_fill: [u8; 3],
    pub left_outline: [u8; 3],
    pub right_fill: [u8; 3],
    pub right_outline: [u8; 3],
    pub left_label_pos: (f32, f32),
    pub right_label_pos: (f32, f32),
    pub words_per_line: usize,
}

impl Default for StimulusStyle {
    fn default() -> Self {
        Self {
            circle_alpha: 180,
            left_fill: [100, 150, 255],
            left_outline: [50, 75, 200],
            right_fill: [255, 100, 100],
            right_outline: [200, 50, 50],
            left_label_pos: (400.0, 120.0),
            right_label_pos: (800.0, 120.0),
            words_per_line: 5,
        }
    }
}

pub struct EntryScene<'a> {
    pub title: &'a str,
    pub participant_id: &'a str,
    pub cursor_visible: bool,
}

pub struct TrialScene<'a> {
    pub title: &'a str,
    /// 1-based.
    pub trial: usize,
    pub total: usize,
    pub layout: CircleLayout,
    pub left_label: &'a str,
    pub right_label: &'a str,
    pub size_slider: &'a Slider,
    pub overlap_slider: &'a Slider,
    pub button: &'a Button,
    pub warning: Option<&'a str>,
}

pub enum Scene<'a> {
    ParticipantEntry(EntryScene<'a>),
    Trial(TrialScene<'a>),
    Blank,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Screen-space box of a drawn string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextBounds {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Draws every frame from scratch into an opaque canvas of the design size,
/// then copies it into the presentation buffer.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    style: StimulusStyle,
    canvas: Pixmap,
    text_cache: TextCache<FontVec>,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec, style: StimulusStyle) -> Result<Self> {
        let mut canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate a {width}x{height} canvas"))?;
        canvas.fill(rgb(WHITE));
        Ok(Self {
            width,
            height,
            style,
            canvas,
            text_cache: TextCache::new(font),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn cached_text_count(&self) -> usize {
        self.text_cache.len()
    }

    pub fn render_frame<T: Timer<Timestamp = u64>>(
        &mut self,
        scene: &Scene<'_>,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<RenderStats> {
        let t_draw = {
            let t = timer.now();
            self.draw_scene(scene);
            timer.elapsed(t)
        };
        let t_copy = {
            let t = timer.now();
            self.present(frame_buffer)?;
            timer.elapsed(t)
        };
        let total = t_draw + t_copy;
        timer.record_frame(total);
        Ok(RenderStats {
            draw: t_draw,
            copy: t_copy,
            total,
        })
    }

    pub fn draw_scene(&mut self, scene: &Scene<'_>) {
        self.canvas.fill(rgb(WHITE));
        match scene {
            Scene::ParticipantEntry(entry) => self.draw_entry(entry),
            Scene::Trial(trial) => self.draw_trial(trial),
            Scene::Blank => {}
        }
    }

    /// Canvas is opaque, so premultiplied and straight RGBA coincide.
    pub fn present(&self, frame_buffer: &mut [u8]) -> Result<()> {
        let src = self.canvas.data();
        if frame_buffer.len() != src.len() {
            bail!(
                "frame buffer holds {} bytes, canvas {}x{} needs {}",
                frame_buffer.len(),
                self.width,
                self.height,
                src.len()
            );
        }
        frame_buffer.copy_from_slice(src);
        Ok(())
    }

    fn draw_entry(&mut self, entry: &EntryScene<'_>) {
        let cx = self.width as f32 / 2.0;
        self.text_centered(entry.title, ENTRY_TITLE_PX, BLACK, (cx, 200.0));
        self.text_centered("Please enter your Participant ID:", BODY_PX, BLACK, (cx, 300.0));

        let input = Rect::new(cx as f64 - 200.0, 360.0, 400.0, 50.0);
        self.fill_rect(&input, LIGHT_GRAY);
        self.stroke_rect(&input, BLACK, 3.0);

        let (bx, by) = input.center();
        let bounds =
            self.text_centered(entry.participant_id, BODY_PX, BLACK, (bx as f32, by as f32));
        if entry.cursor_visible {
            let x = if entry.participant_id.is_empty() {
                bx as f32
            } else {
                bounds.right() + 5.0
            };
            self.line((x, by as f32 - 15.0), (x, by as f32 + 15.0), BLACK, 2.0);
        }

        self.text_centered("Press ENTER to continue", HINT_PX, DARK_GRAY, (cx, 450.0));
    }

    fn draw_trial(&mut self, trial: &TrialScene<'_>) {
        let cx = self.width as f32 / 2.0;
        let style = self.style;

        self.text_centered(trial.title, TITLE_PX, BLACK, (cx, 40.0));
        let progress = format!("Trial {} of {}", trial.trial, trial.total);
        self.text_centered(&progress, PROGRESS_PX, DARK_GRAY, (cx, 75.0));

        // Right first so the left circle sits on top
        let l = &trial.layout;
        self.circle(
            l.right_center,
            l.right_radius,
            style.right_fill,
            style.right_outline,
        );
        self.circle(
            l.left_center,
            l.left_radius,
            style.left_fill,
            style.left_outline,
        );

        self.wrapped_label(trial.left_label, style.left_label_pos, style.left_outline);
        self.wrapped_label(trial.right_label, style.right_label_pos, style.right_outline);

        self.slider(trial.size_slider);
        self.slider(trial.overlap_slider);
        self.button(trial.button);

        if let Some(warning) = trial.warning {
            self.text_centered(warning, BODY_PX, WARNING_RED, (cx, 500.0));
        }
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: [u8; 3], outline: [u8; 3]) {
        let Some(path) = PathBuilder::from_circle(center.0 as f32, center.1 as f32, radius as f32)
        else {
            return;
        };
        let [r, g, b] = fill;
        let fill = paint(Color::from_rgba8(r, g, b, self.style.circle_alpha));
        self.canvas
            .fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        self.stroke_path(&path, outline, 3.0);
    }

    fn wrapped_label(&mut self, text: &str, pos: (f32, f32), color: [u8; 3]) {
        let lines = wrap_words(text, self.style.words_per_line);
        let top = pos.1 - (lines.len() - 1) as f32 * LABEL_LINE_HEIGHT / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * LABEL_LINE_HEIGHT;
            self.text_centered(line, LABEL_PX, color, (pos.0, y));
        }
    }

    fn slider(&mut self, slider: &Slider) {
        let spec = slider.spec();
        let track = spec.track;
        let (tcx, _) = track.center();

        if let Some(path) = rounded_rect(&track, 5.0) {
            self.fill_path(&path, LIGHT_GRAY);
            self.stroke_path(&path, DARK_GRAY, 2.0);
        }

        if let Some(mx) = slider.center_marker_x() {
            let mx = mx as f32;
            self.line(
                (mx, track.y as f32),
                (mx, track.bottom() as f32),
                BLACK,
                3.0,
            );
        }

        let (hx, hy) = slider.handle_center();
        let filled = Rect::new(track.x, track.y, hx - track.x, track.height);
        if filled.width > 0.0 {
            if let Some(path) = rounded_rect(&filled, 5.0) {
                self.fill_path(&path, SLIDER_COLOR);
            }
        }

        let r = spec.handle_radius as f32;
        let [cr, cg, cb, ca] = spec.handle_color;
        if let Some(outer) = PathBuilder::from_circle(hx as f32, hy as f32, r) {
            self.canvas.fill_path(
                &outer,
                &paint(Color::from_rgba8(cr, cg, cb, ca)),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(inner) = PathBuilder::from_circle(hx as f32, hy as f32, (r - 3.0).max(1.0)) {
            self.fill_path(&inner, WHITE);
        }

        self.text_centered(
            &spec.caption,
            LABEL_PX,
            BLACK,
            (tcx as f32, track.y as f32 - 38.0),
        );
        if spec.show_value {
            let value = format!("{:.0}%", slider.value());
            self.text_centered(
                &value,
                LABEL_PX,
                BLACK,
                (tcx as f32, track.bottom() as f32 + 25.0),
            );
        }
        for tick in &spec.ticks {
            let x = slider.x_for_value(tick.value) as f32;
            self.text_centered(&tick.text, TICK_PX, DARK_GRAY, (x, track.y as f32 - 12.0));
        }
    }

    fn button(&mut self, button: &Button) {
        let fill = if button.is_hovered() {
            SLIDER_COLOR
        } else {
            LIGHT_GRAY
        };
        if let Some(path) = rounded_rect(&button.rect, 8.0) {
            self.fill_path(&path, fill);
            self.stroke_path(&path, BLACK, 3.0);
        }
        let (x, y) = button.rect.center();
        self.text_centered(&button.label, BODY_PX, BLACK, (x as f32, y as f32));
    }

    fn fill_rect(&mut self, rect: &Rect, color: [u8; 3]) {
        if let Some(r) = tiny_skia::Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) {
            self.canvas
                .fill_rect(r, &paint(rgb(color)), Transform::identity(), None);
        }
    }

    fn stroke_rect(&mut self, rect: &Rect, color: [u8; 3], width: f32) {
        if let Some(r) = tiny_skia::Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) {
            self.stroke_path(&PathBuilder::from_rect(r), color, width);
        }
    }

    fn fill_path(&mut self, path: &Path, color: [u8; 3]) {
        self.canvas.fill_path(
            path,
            &paint(rgb(color)),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &Path, color: [u8; 3], width: f32) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.canvas.stroke_path(
            path,
            &paint(rgb(color)),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: [u8; 3], width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, color, width);
        }
    }

    /// Draws `text` centered on `pos` and returns where it landed.
    fn text_centered(
        &mut self,
        text: &str,
        size_px: f32,
        color: [u8; 3],
        pos: (f32, f32),
    ) -> TextBounds {
        let Some(pm) = self.text_cache.get_or_render(text, size_px, rgb(color)) else {
            log::warn!("could not rasterize {text:?} at {size_px}px");
            return TextBounds {
                x: pos.0,
                y: pos.1,
                width: 0.0,
                height: 0.0,
            };
        };
        let (w, h) = (pm.width() as f32, pm.height() as f32);
        let x = (pos.0 - w * 0.5).round() as i32;
        let y = (pos.1 - h * 0.5).round() as i32;
        self.blit_premultiplied(&pm, x, y);
        TextBounds {
            x: x as f32,
            y: y as f32,
            width: w,
            height: h,
        }
    }

    /// Source-over blend of a premultiplied pixmap at integer offset,
    /// clipped to the canvas.
    fn blit_premultiplied(&mut self, src: &Pixmap, x: i32, y: i32) {
        let (w, h) = (src.width() as i32, src.height() as i32);
        let (cw, ch) = (self.width as i32, self.height as i32);

        if x + w <= 0 || y + h <= 0 || x >= cw || y >= ch {
            return;
        }

        let dst_x = x.max(0) as usize;
        let dst_y = y.max(0) as usize;
        let src_x = (-x).max(0) as usize;
        let src_y = (-y).max(0) as usize;
        let copy_w = ((w as usize) - src_x).min(cw as usize - dst_x);
        let copy_h = ((h as usize) - src_y).min(ch as usize - dst_y);

        let src_stride = src.width() as usize * 4;
        let dst_stride = self.width as usize * 4;
        let src_data = src.data();
        let dst_data = self.canvas.data_mut();

        for row in 0..copy_h {
            let s_row = (src_y + row) * src_stride + src_x * 4;
            let d_row = (dst_y + row) * dst_stride + dst_x * 4;
            for i in 0..copy_w {
                let s = &src_data[s_row + i * 4..s_row + i * 4 + 4];
                let sa = s[3] as u32;
                if sa == 0 {
                    continue;
                }
                let d = &mut dst_data[d_row + i * 4..d_row + i * 4 + 4];
                if sa == 255 {
                    d.copy_from_slice(s);
                    continue;
                }
                let inv = 255 - sa;
                for c in 0..4 {
                    d[c] = (s[c] as u32 + (d[c] as u32 * inv + 127) / 255).min(255) as u8;
                }
            }
        }
    }
}
