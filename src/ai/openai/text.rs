use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::ai::{clamp_text, token_budget, TextGenerationService, TextPrompt};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiTextClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiTextClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, timeout),
            model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl TextGenerationService for OpenAiTextClient {
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new(
                    "system",
                    prompts::text_system(&prompt.tone, prompt.max_length),
                ),
                ChatMessage::new(
                    "user",
                    prompts::text_user(&prompt.prompt, prompt.context.as_deref()),
                ),
            ],
            max_completion_tokens: token_budget(prompt.max_length),
        };

        let response: ChatCompletionResponse =
            self.http.post("/v1/chat/completions", &request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Upstream("No response from OpenAI chat API".to_string()))?;
        tracing::debug!("OpenAI finish reason: {:?}", choice.finish_reason);

        let text = choice.message.content.unwrap_or_default();
        clamp_text(&text, prompt.max_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt(max_length: usize) -> TextPrompt {
        TextPrompt {
            prompt: "Describe a grand opening sale".to_string(),
            context: Some("Shoe store".to_string()),
            tone: "friendly".to_string(),
            max_length,
        }
    }

    fn client(server: &MockServer, model: &str) -> OpenAiTextClient {
        OpenAiTextClient::new("test-key".to_string(), model.to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_text_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("  Doors open at nine. Everything half off!  ")),
            )
            .mount(&server)
            .await;

        let text = client(&server, "gpt-4o-mini")
            .generate_text(&prompt(200))
            .await
            .unwrap();
        assert_eq!(text, "Doors open at nine. Everything half off!");
    }

    #[tokio::test]
    async fn test_request_carries_model_tone_and_context() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("\"model\":\"custom-model\""))
            .and(body_string_contains("friendly"))
            .and(body_string_contains("Context: Shoe store"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, "custom-model")
            .generate_text(&prompt(200))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_long_completion_is_clamped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&"a".repeat(50))))
            .mount(&server)
            .await;

        let text = client(&server, "m").generate_text(&prompt(10)).await.unwrap();
        assert_eq!(text.chars().count(), 10);
    }

    #[tokio::test]
    async fn test_api_error_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client(&server, "m").generate_text(&prompt(200)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server, "m").generate_text(&prompt(200)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_empty_completion_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
            .mount(&server)
            .await;

        let err = client(&server, "m").generate_text(&prompt(200)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OpenAiTextClient::new(
            "key".to_string(),
            "m".to_string(),
            Duration::from_millis(50),
        )
        .with_base_url(server.uri());

        let err = client.generate_text(&prompt(200)).await.unwrap_err();
        match err {
            Error::Upstream(message) => assert!(message.contains("timed out")),
            other => panic!("expected upstream timeout, got {:?}", other),
        }
    }
}
