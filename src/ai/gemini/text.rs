use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{clamp_text, token_budget, TextGenerationService, TextPrompt};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TextRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    max_output_tokens: u32,
}

pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            http: GeminiHttpClient::new(api_key, model, timeout),
        }
    }

    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        response.candidates.first().and_then(|c| {
            c.content.parts.iter().find_map(|p| match p {
                Part::Text { text } => Some(text.clone()),
                Part::InlineData { .. } => None,
            })
        })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiTextClient);

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String> {
        let request = TextRequest {
            system_instruction: Content::text(
                None,
                prompts::text_system(&prompt.tone, prompt.max_length),
            ),
            contents: vec![Content::text(
                Some("user"),
                prompts::text_user(&prompt.prompt, prompt.context.as_deref()),
            )],
            generation_config: TextGenerationConfig {
                max_output_tokens: token_budget(prompt.max_length),
            },
        };
        tracing::debug!("Sending text request to Gemini model {}", self.http.model());

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = Self::extract_text(&response)
            .ok_or_else(|| Error::Upstream("No text in Gemini response".to_string()))?;
        clamp_text(&text, prompt.max_length)
    }
}
