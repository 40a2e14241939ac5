use ab_glyph::{Font, Glyph, PxScale, ScaleFont, point};
use std::collections::HashMap;
use std::sync::Arc;
use string_cache::DefaultAtom as Atom;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Rasterizes one line of text into a tightly cropped, premultiplied pixmap.
/// Text without visible glyphs yields a transparent 1×1 pixmap; `None` only
/// when the pixmap cannot be allocated.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: Color,
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Layout with baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlined: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlined {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    if outlined.is_empty() {
        return Pixmap::new(1, 1);
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;

    let stride = w as usize;
    let dst = pm.pixels_mut();
    let cu = color.to_color_u8();

    for out in &outlined {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // Source premultiplied by coverage * alpha, then Porter-Duff over
            let a = (cov * cu.alpha() as f32 / 255.0).clamp(0.0, 1.0);
            let sr = (cu.red() as f32 * a) as u8;
            let sg = (cu.green() as f32 * a) as u8;
            let sb = (cu.blue() as f32 * a) as u8;
            let sa = (a * 255.0) as u8;

            let bg = dst[i];
            let inv = 1.0 - a;
            let blend = |s: u8, d: u8| s.saturating_add((d as f32 * inv) as u8);
            let (r, g, b_, al) = (
                blend(sr, bg.red()),
                blend(sg, bg.green()),
                blend(sb, bg.blue()),
                blend(sa, bg.alpha()),
            );
            // Channels can exceed alpha by one after rounding
            if let Some(px) = PremultipliedColorU8::from_rgba(r.min(al), g.min(al), b_.min(al), al)
            {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

#[derive(Hash, Eq, PartialEq, Clone)]
struct TextKey {
    text: Atom,
    size_bits: u32,
    rgba: [u8; 4],
}

/// Rendered strings keyed by content, size and color. Labels repeat every
/// frame of a trial, so each is rasterized once.
pub struct TextCache<F: Font> {
    font: F,
    map: HashMap<TextKey, Arc<Pixmap>>,
}

impl<F: Font> TextCache<F> {
    pub fn new(font: F) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get_or_render(&mut self, text: &str, size_px: f32, color: Color) -> Option<Arc<Pixmap>> {
        let c = color.to_color_u8();
        let key = TextKey {
            text: Atom::from(text),
            size_bits: size_px.to_bits(),
            rgba: [c.red(), c.green(), c.blue(), c.alpha()],
        };
        if let Some(p) = self.map.get(&key) {
            return Some(Arc::clone(p));
        }
        let pm = Arc::new(render_text_pixmap(text, size_px, &self.font, color)?);
        self.map.insert(key, Arc::clone(&pm));
        Some(pm)
    }
}

/// Splits `text` into lines of at most `max_words` words.
pub fn wrap_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }
    words
        .chunks(max_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
