pub mod font;
pub mod render;
pub mod text;
pub use ab_glyph::FontVec;
pub use font::{load_font, locate_system_font, resolve_font};
pub use render::{
    EntryScene, RenderStats, Scene, SkiaRenderer, StimulusStyle, TextBounds, TrialScene,
};
pub use text::{TextCache, render_text_pixmap, wrap_words};
