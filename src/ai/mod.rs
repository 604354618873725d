//! AI service integration for poster copy and background imagery
//!
//! Two narrow traits sit in front of the providers: one for text, one for
//! images. OpenAI and Gemini implement both; the mocks back tests and
//! `DRY_RUN`.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use crate::render::canvas::fit_to_dimensions;
pub use mock::{MockImageClient, MockTextClient};

use crate::config::{AiProvider, Config};
use crate::{Error, Result};
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

/// One text generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrompt {
    pub prompt: String,
    pub context: Option<String>,
    pub tone: String,
    /// Upper bound on the returned text, in characters.
    pub max_length: usize,
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String>;
}

/// Implementations return an image of exactly `width`x`height`.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str, width: u32, height: u32) -> Result<RgbaImage>;
}

pub fn text_client(config: &Config) -> Arc<dyn TextGenerationService> {
    if config.dry_run {
        return Arc::new(MockTextClient::new());
    }
    let api_key = config.api_key_for(config.text_provider);
    match config.text_provider {
        AiProvider::OpenAi => Arc::new(openai::OpenAiTextClient::new(
            api_key,
            config.text_model.clone(),
            config.text_timeout,
        )),
        AiProvider::Gemini => Arc::new(gemini::GeminiTextClient::new(
            api_key,
            config.text_model.clone(),
            config.text_timeout,
        )),
    }
}

pub fn image_client(config: &Config) -> Arc<dyn ImageGenerationService> {
    if config.dry_run {
        return Arc::new(MockImageClient::new());
    }
    let api_key = config.api_key_for(config.image_provider);
    match config.image_provider {
        AiProvider::OpenAi => Arc::new(openai::OpenAiImageClient::new(
            api_key,
            config.image_model.clone(),
            config.image_timeout,
        )),
        AiProvider::Gemini => Arc::new(gemini::GeminiImageClient::new(
            api_key,
            config.image_model.clone(),
            config.image_timeout,
        )),
    }
}

/// Trim a completion and cut it to `max_length` characters. An empty
/// completion counts as a provider failure.
pub fn clamp_text(text: &str, max_length: usize) -> Result<String> {
    let trimmed = text.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        return Err(Error::Upstream("Provider returned empty text".to_string()));
    }
    match trimmed.char_indices().nth(max_length) {
        Some((cut, _)) => Ok(trimmed[..cut].trim_end().to_string()),
        None => Ok(trimmed.to_string()),
    }
}

/// Completion token budget for a character limit, with headroom for models
/// that spend tokens before answering.
pub(crate) fn token_budget(max_length: usize) -> u32 {
    (max_length as u32).saturating_mul(2).clamp(256, 8000)
}

/// Decode provider image bytes and fit them to the requested size.
pub(crate) fn decode_and_fit(
    provider: &str,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let image: DynamicImage = image::load_from_memory(bytes).map_err(|e| {
        tracing::error!("{} returned undecodable image data: {}", provider, e);
        Error::Upstream(format!("{} returned undecodable image data: {}", provider, e))
    })?;
    tracing::debug!(
        "{} image is {}x{}, fitting to {}x{}",
        provider,
        image.width(),
        image.height(),
        width,
        height
    );
    Ok(fit_to_dimensions(&image, width, height))
}

/// Pick the candidate ratio closest to `width:height` on a log scale.
pub(crate) fn nearest_aspect(width: u32, height: u32, candidates: &[(u32, u32)]) -> (u32, u32) {
    let target = (width.max(1) as f64 / height.max(1) as f64).ln();
    candidates
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = ((a.0 as f64 / a.1 as f64).ln() - target).abs();
            let db = ((b.0 as f64 / b.1 as f64).ln() - target).abs();
            da.total_cmp(&db)
        })
        .unwrap_or((1, 1))
}
