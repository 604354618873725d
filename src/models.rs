//! Data models and structures
//!
//! Defines the request/response shapes of the poster API and the record
//! persisted for every generated poster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_THEME: &str = "modern";
pub const DEFAULT_TEMPLATE: &str = "event_flyer";
pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_TEXT_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PosterSize {
    #[default]
    A4,
    Letter,
    SocialMedia,
    Banner,
    Custom,
}

impl PosterSize {
    /// Pixel dimensions of the preset sizes (300 DPI for print formats).
    pub fn preset_dimensions(self) -> Option<(u32, u32)> {
        match self {
            Self::A4 => Some((2480, 3508)),
            Self::Letter => Some((2550, 3300)),
            Self::SocialMedia => Some((1080, 1080)),
            Self::Banner => Some((1200, 400)),
            Self::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosterRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub size: PosterSize,
    #[serde(default, alias = "width")]
    pub custom_width: Option<u32>,
    #[serde(default, alias = "height")]
    pub custom_height: Option<u32>,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default)]
    pub background_prompt: Option<String>,
    #[serde(default)]
    pub include_logo: bool,
    #[serde(default)]
    pub additional_text: Option<String>,
    /// Hex colors overriding the theme palette: foreground, background, accent.
    #[serde(default)]
    pub color_scheme: Option<Vec<String>>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub generate_description: bool,
}

impl PosterRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            theme: default_theme(),
            size: PosterSize::default(),
            custom_width: None,
            custom_height: None,
            template: default_template(),
            background_prompt: None,
            include_logo: false,
            additional_text: None,
            color_scheme: None,
            tone: None,
            generate_description: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PosterResponse {
    pub poster_id: Uuid,
    pub image_url: String,
    pub download_url: String,
    pub filename: String,
    pub theme: String,
    pub template: String,
    pub width: u32,
    pub height: u32,
    pub message: String,
}

impl PosterResponse {
    pub fn from_poster(poster: &GeneratedPoster) -> Self {
        Self {
            poster_id: poster.poster_id,
            image_url: format!("/api/preview-poster/{}", poster.poster_id),
            download_url: format!("/api/download-poster/{}", poster.poster_id),
            filename: poster.filename.clone(),
            theme: poster.request.theme.clone(),
            template: poster.request.template.clone(),
            width: poster.width,
            height: poster.height,
            message: "Poster generated successfully!".to_string(),
        }
    }
}

/// Record persisted next to every stored poster image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPoster {
    pub poster_id: Uuid,
    pub filename: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub request: PosterRequest,
}

/// An encoded poster ready to be handed to a store.
#[derive(Debug, Clone)]
pub struct EncodedPoster {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextGenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationResponse {
    pub text: String,
    pub prompt: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationResponse {
    /// Base64-encoded PNG.
    pub image_data: String,
    pub width: u32,
    pub height: u32,
    pub prompt: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateSummary {
    pub key: String,
    pub name: String,
    pub description: String,
    pub has_logo_region: bool,
}
