use ab_glyph::FontVec;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Regular sans-serif faces shipped by common distributions and desktops.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// First existing candidate, or `None` when nothing is installed where we look.
pub fn locate_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs_err::read(path)?;
    FontVec::try_from_vec(bytes)
        .with_context(|| format!("{} is not a usable TrueType/OpenType font", path.display()))
}

/// Loads `explicit` if given, otherwise the first system font found.
pub fn resolve_font(explicit: Option<&Path>) -> Result<(PathBuf, FontVec)> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match locate_system_font() {
            Some(p) => p,
            None => bail!(
                "no font found in the usual system locations; pass --font or set font_path"
            ),
        },
    };
    let font = load_font(&path)?;
    log::info!("Using font {}", path.display());
    Ok((path, font))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_font_is_an_error() {
        let err = resolve_font(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        let path = std::env::temp_dir().join(format!("overlap-font-{}.ttf", std::process::id()));
        fs_err::write(&path, b"definitely not a font").unwrap();
        assert!(load_font(&path).is_err());
        let _ = fs_err::remove_file(&path);
    }
}
