use image::Rgba;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    pub accent: Rgba<u8>,
    /// Drawn around glyphs when set, for themes with busy backgrounds.
    pub outline: Option<Rgba<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub name: String,
    pub palette: Palette,
    pub font_family: String,
    pub font_weight: FontWeight,
    /// Font file names tried in order inside each configured font directory.
    pub font_files: Vec<String>,
}

impl ThemeDefinition {
    /// Returns a copy with the palette overridden by `colors`, in the order
    /// foreground, background, accent. Missing entries keep the theme value.
    pub fn with_color_scheme(&self, colors: &[Rgba<u8>]) -> Self {
        let mut theme = self.clone();
        let slots = [
            &mut theme.palette.foreground,
            &mut theme.palette.background,
            &mut theme.palette.accent,
        ];
        for (slot, color) in slots.into_iter().zip(colors) {
            *slot = *color;
        }
        theme
    }

    /// Key used by the font library to share faces between themes.
    pub fn font_key(&self) -> String {
        format!("{}:{:?}", self.font_family, self.font_weight)
    }
}

const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255])
}

/// Parse `#RRGGBB` (or `RRGGBB`) into an opaque color.
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(rgb)
}

fn font_files(family: &str, weight: FontWeight) -> Vec<String> {
    let files: &[&str] = match (family, weight) {
        ("DejaVu Serif", FontWeight::Bold) => &[
            "DejaVuSerif-Bold.ttf",
            "LiberationSerif-Bold.ttf",
            "Georgia Bold.ttf",
            "georgiab.ttf",
        ],
        ("DejaVu Serif", FontWeight::Normal) => &[
            "DejaVuSerif.ttf",
            "LiberationSerif-Regular.ttf",
            "Georgia.ttf",
            "georgia.ttf",
        ],
        (_, FontWeight::Bold) => &[
            "DejaVuSans-Bold.ttf",
            "LiberationSans-Bold.ttf",
            "Arial Bold.ttf",
            "arialbd.ttf",
        ],
        (_, FontWeight::Normal) => &[
            "DejaVuSans.ttf",
            "LiberationSans-Regular.ttf",
            "Arial.ttf",
            "arial.ttf",
        ],
    };
    files.iter().map(|f| f.to_string()).collect()
}

fn theme(
    name: &str,
    (foreground, background, accent): (u32, u32, u32),
    outline: Option<u32>,
    font_family: &str,
    font_weight: FontWeight,
) -> ThemeDefinition {
    ThemeDefinition {
        name: name.to_string(),
        palette: Palette {
            foreground: rgb(foreground),
            background: rgb(background),
            accent: rgb(accent),
            outline: outline.map(rgb),
        },
        font_family: font_family.to_string(),
        font_weight,
        font_files: font_files(font_family, font_weight),
    }
}

const SANS: &str = "DejaVu Sans";
const SERIF: &str = "DejaVu Serif";

pub(crate) fn builtin_themes() -> Vec<ThemeDefinition> {
    use FontWeight::{Bold, Normal};

    vec![
        theme("modern", (0x2D3748, 0xF8FAFC, 0x667EEA), None, SANS, Bold),
        theme("classic", (0x3E2723, 0xF5F5DC, 0xDEB887), None, SERIF, Bold),
        theme("minimal", (0x2D3748, 0xFFFFFF, 0xE9ECEF), None, SANS, Normal),
        theme("vibrant", (0xFFFFFF, 0xFF6B6B, 0x45B7D1), Some(0x000000), SANS, Bold),
        theme("corporate", (0xFFFFFF, 0x2C3E50, 0x3498DB), None, SANS, Bold),
        theme("event", (0xFFFFFF, 0xE74C3C, 0x9B59B6), Some(0x000000), SANS, Bold),
        theme("sale", (0xFFFFFF, 0xE74C3C, 0xF1C40F), Some(0x000000), SANS, Bold),
        theme("professional", (0x2E3B4E, 0xF8F9FA, 0x7FC7D9), None, SANS, Bold),
        theme("creative", (0x2D3748, 0xF7F9FC, 0xFF6B6B), None, SANS, Bold),
        theme("dark", (0xF7FAFC, 0x171923, 0x4A5568), None, SANS, Bold),
        theme("retro", (0xC53030, 0xFDF2E9, 0xECC94B), None, SERIF, Bold),
        theme("elegant", (0x553C9A, 0xFAF5FF, 0xB794F6), None, SERIF, Normal),
    ]
}
