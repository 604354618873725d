//! Font resolution and glyph rasterization.
//!
//! Each theme names a font family with an ordered list of candidate files.
//! The library walks those candidates across the configured font
//! directories and keeps the first face that parses. When nothing loads the
//! theme gets the bundled 8x8 bitmap face, so rendering never aborts for a
//! missing font.

use super::canvas::blend_pixel;
use crate::registry::{Rect, ThemeDefinition};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a face may come from, in the order they are tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Bundled,
}

pub enum FontFace {
    Outline(Font<'static>),
    Bitmap,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("FontFace::Outline"),
            Self::Bitmap => f.write_str("FontFace::Bitmap"),
        }
    }
}

impl FontFace {
    pub fn from_file(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        Font::try_from_vec(bytes).map(Self::Outline)
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap)
    }

    pub fn ascent(&self, px: f32) -> f32 {
        match self {
            Self::Outline(font) => font.v_metrics(Scale::uniform(px)).ascent,
            Self::Bitmap => px,
        }
    }

    pub fn line_height(&self, px: f32) -> f32 {
        match self {
            Self::Outline(font) => {
                let v = font.v_metrics(Scale::uniform(px));
                v.ascent - v.descent + v.line_gap
            }
            Self::Bitmap => px * 1.25,
        }
    }

    pub fn text_width(&self, text: &str, px: f32) -> f32 {
        match self {
            Self::Outline(font) => font
                .layout(text, Scale::uniform(px), point(0.0, 0.0))
                .last()
                .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                .unwrap_or(0.0),
            Self::Bitmap => text.chars().count() as f32 * bitmap_cell(px) as f32,
        }
    }

    /// Draw one line with its top edge at `y`, discarding pixels outside `clip`.
    pub fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        px: f32,
        color: Rgba<u8>,
        clip: Rect,
    ) {
        match self {
            Self::Outline(font) => {
                let scale = Scale::uniform(px);
                let ascent = font.v_metrics(scale).ascent;
                for glyph in font.layout(text, scale, point(x, y + ascent)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            let cx = gx as i64 + bb.min.x as i64;
                            let cy = gy as i64 + bb.min.y as i64;
                            if in_clip(clip, cx, cy) {
                                blend_pixel(canvas, cx, cy, color, coverage);
                            }
                        });
                    }
                }
            }
            Self::Bitmap => {
                let cell = bitmap_cell(px);
                let (ox, oy) = (x.round() as i64, y.round() as i64);
                for (i, ch) in text.chars().enumerate() {
                    let rows = bitmap_glyph(ch);
                    let gx0 = ox + (i as u32 * cell) as i64;
                    for dy in 0..cell {
                        let row = rows[(dy * 8 / cell) as usize];
                        for dx in 0..cell {
                            if row >> (dx * 8 / cell) & 1 == 0 {
                                continue;
                            }
                            let (cx, cy) = (gx0 + dx as i64, oy + dy as i64);
                            if in_clip(clip, cx, cy) {
                                blend_pixel(canvas, cx, cy, color, 1.0);
                            }
                        }
                    }
                }
            }
        }
    }
}

fn bitmap_cell(px: f32) -> u32 {
    (px.round() as u32).max(1)
}

fn bitmap_glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn in_clip(clip: Rect, x: i64, y: i64) -> bool {
    x >= clip.x as i64
        && y >= clip.y as i64
        && x < (clip.x + clip.width) as i64
        && y < (clip.y + clip.height) as i64
}

/// Candidate sources for a theme: each font file across every directory,
/// followed by the bundled face.
pub fn candidate_sources(theme: &ThemeDefinition, dirs: &[PathBuf]) -> Vec<FontSource> {
    let mut sources: Vec<FontSource> = theme
        .font_files
        .iter()
        .flat_map(|file| dirs.iter().map(move |dir| FontSource::File(dir.join(file))))
        .collect();
    sources.push(FontSource::Bundled);
    sources
}

fn load_first(sources: &[FontSource]) -> (FontFace, FontSource) {
    for source in sources {
        match source {
            FontSource::File(path) => match FontFace::from_file(path) {
                Some(face) => return (face, source.clone()),
                None => debug!("Font candidate unavailable: {}", path.display()),
            },
            FontSource::Bundled => return (FontFace::Bitmap, FontSource::Bundled),
        }
    }
    (FontFace::Bitmap, FontSource::Bundled)
}

/// Faces resolved once at startup, keyed by family and weight.
#[derive(Debug)]
pub struct FontLibrary {
    faces: HashMap<String, Arc<FontFace>>,
    fallback: Arc<FontFace>,
}

impl FontLibrary {
    pub fn load(themes: &[ThemeDefinition], dirs: &[PathBuf]) -> Self {
        let mut faces = HashMap::new();

        for theme in themes {
            let key = theme.font_key();
            if faces.contains_key(&key) {
                continue;
            }
            let (face, source) = load_first(&candidate_sources(theme, dirs));
            match source {
                FontSource::File(path) => {
                    info!("Font '{}' resolved to {}", key, path.display())
                }
                FontSource::Bundled => warn!(
                    "No font file found for '{}', using the bundled bitmap face",
                    key
                ),
            }
            faces.insert(key, Arc::new(face));
        }

        Self {
            faces,
            fallback: Arc::new(FontFace::Bitmap),
        }
    }

    /// A library that always renders with the bundled face.
    pub fn bundled() -> Self {
        Self {
            faces: HashMap::new(),
            fallback: Arc::new(FontFace::Bitmap),
        }
    }

    pub fn face_for(&self, theme: &ThemeDefinition) -> Arc<FontFace> {
        self.faces
            .get(&theme.font_key())
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }
}
