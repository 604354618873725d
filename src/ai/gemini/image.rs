use super::client::{GeminiHttpClient, PROVIDER};
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{decode_and_fit, nearest_aspect, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use image::RgbaImage;
use serde::Serialize;
use std::time::Duration;

/// Aspect ratios the image models accept.
const SUPPORTED_RATIOS: [(u32, u32); 10] = [
    (1, 1),
    (2, 3),
    (3, 2),
    (3, 4),
    (4, 3),
    (4, 5),
    (5, 4),
    (9, 16),
    (16, 9),
    (21, 9),
];

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            http: GeminiHttpClient::new(api_key, model, timeout),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiImageClient);

pub(crate) fn aspect_ratio(width: u32, height: u32) -> String {
    let (w, h) = nearest_aspect(width, height, &SUPPORTED_RATIOS);
    format!("{}:{}", w, h)
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str, width: u32, height: u32) -> Result<RgbaImage> {
        let request = ImageRequest {
            contents: vec![Content::text(None, prompt.to_string())],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: aspect_ratio(width, height),
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let image_data = response
            .candidates
            .first()
            .and_then(|c| {
                c.content.parts.iter().find_map(|p| match p {
                    Part::InlineData { inline_data } => Some(inline_data),
                    _ => None,
                })
            })
            .ok_or_else(|| Error::Upstream("No image data in Gemini response".to_string()))?;

        tracing::debug!(
            "Gemini returned image with mime_type: {}",
            image_data.mime_type
        );

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image_data.data)
            .map_err(|e| Error::Upstream(format!("Failed to decode Gemini base64 image: {}", e)))?;

        decode_and_fit(PROVIDER, &bytes, width, height)
    }
}
