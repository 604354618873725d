//! Runtime configuration loaded from the environment (and `.env`).

use crate::models::OutputFormat;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MAX_DIMENSION: u32 = 5000;
const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    fn parse(key: &str, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(Error::Config(format!(
                "{} must be 'openai' or 'gemini', got '{}'",
                key, other
            ))),
        }
    }

    pub fn default_text_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    pub fn default_image_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-image-1",
            Self::Gemini => "gemini-2.5-flash-image",
        }
    }
}

/// What to do when a provider call fails mid-poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Surface the failure as `Upstream`.
    None,
    /// Substitute canned text and the theme gradient, logging a warning.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub text_provider: AiProvider,
    pub image_provider: AiProvider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub text_timeout: Duration,
    pub image_timeout: Duration,
    pub max_width: u32,
    pub max_height: u32,
    pub max_file_size: u64,
    pub output_format: OutputFormat,
    pub font_dirs: Vec<PathBuf>,
    pub logo_path: Option<PathBuf>,
    pub fallback: FallbackPolicy,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let text_provider = match get("TEXT_PROVIDER") {
            Some(v) => AiProvider::parse("TEXT_PROVIDER", &v)?,
            None => AiProvider::Gemini,
        };
        let image_provider = match get("IMAGE_PROVIDER") {
            Some(v) => AiProvider::parse("IMAGE_PROVIDER", &v)?,
            None => AiProvider::Gemini,
        };

        let dry_run = get("DRY_RUN")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let openai_api_key = get("OPENAI_API_KEY");
        let gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));

        if !dry_run {
            for provider in [text_provider, image_provider] {
                match provider {
                    AiProvider::OpenAi if openai_api_key.is_none() => {
                        return Err(Error::Config("OPENAI_API_KEY not set".to_string()))
                    }
                    AiProvider::Gemini if gemini_api_key.is_none() => {
                        return Err(Error::Config("GEMINI_API_KEY not set".to_string()))
                    }
                    _ => {}
                }
            }
        }

        let output_format = match get("OUTPUT_FORMAT") {
            Some(v) => OutputFormat::parse(&v).ok_or_else(|| {
                Error::Config(format!(
                    "OUTPUT_FORMAT must be png, jpeg or webp, got '{}'",
                    v
                ))
            })?,
            None => OutputFormat::Png,
        };

        let fallback = match get("UPSTREAM_FALLBACK").as_deref() {
            None | Some("none") => FallbackPolicy::None,
            Some("placeholder") => FallbackPolicy::Placeholder,
            Some(other) => {
                return Err(Error::Config(format!(
                    "UPSTREAM_FALLBACK must be 'none' or 'placeholder', got '{}'",
                    other
                )))
            }
        };

        let font_dirs = match get("FONT_DIRS") {
            Some(v) => std::env::split_paths(&v).collect(),
            None => default_font_dirs(),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8000)?,
            output_dir: get("OUTPUT_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("generated_posters")),
            text_provider,
            image_provider,
            openai_api_key,
            gemini_api_key,
            text_model: get("TEXT_MODEL")
                .unwrap_or_else(|| text_provider.default_text_model().to_string()),
            image_model: get("IMAGE_MODEL")
                .unwrap_or_else(|| image_provider.default_image_model().to_string()),
            text_timeout: Duration::from_secs(parse_or(&get, "TEXT_TIMEOUT_SECS", 30)?),
            image_timeout: Duration::from_secs(parse_or(&get, "IMAGE_TIMEOUT_SECS", 120)?),
            max_width: parse_or(&get, "MAX_POSTER_WIDTH", DEFAULT_MAX_DIMENSION)?,
            max_height: parse_or(&get, "MAX_POSTER_HEIGHT", DEFAULT_MAX_DIMENSION)?,
            max_file_size: parse_or(&get, "MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE)?,
            output_format,
            font_dirs,
            logo_path: get("LOGO_PATH").map(PathBuf::from),
            fallback,
            dry_run,
        })
    }

    pub fn api_key_for(&self, provider: AiProvider) -> String {
        match provider {
            AiProvider::OpenAi => self.openai_api_key.clone(),
            AiProvider::Gemini => self.gemini_api_key.clone(),
        }
        .unwrap_or_default()
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, v))),
        None => Ok(default),
    }
}

fn default_font_dirs() -> Vec<PathBuf> {
    [
        "assets/fonts",
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/TTF",
        "/usr/share/fonts/dejavu",
        "/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}
