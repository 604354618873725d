use super::client::{OpenAiHttpClient, PROVIDER};
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::{decode_and_fit, nearest_aspect, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use image::RgbaImage;
use std::time::Duration;

/// Sizes the images API accepts, as (width, height).
const SUPPORTED_SIZES: [(u32, u32); 3] = [(1024, 1024), (1536, 1024), (1024, 1536)];

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiImageClient {
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

pub(crate) fn request_size(width: u32, height: u32) -> String {
    let (w, h) = nearest_aspect(width, height, &SUPPORTED_SIZES);
    format!("{}x{}", w, h)
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate_image(&self, prompt: &str, width: u32, height: u32) -> Result<RgbaImage> {
        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: request_size(width, height),
            quality: "medium".to_string(),
        };
        tracing::debug!("Requesting OpenAI image at {}", request.size);

        let response: ImageGenerationResponse =
            self.http.post("/v1/images/generations", &request).await?;

        let image_data = response
            .data
            .first()
            .ok_or_else(|| Error::Upstream("No image data in OpenAI response".to_string()))?;

        let bytes = if let Some(b64_json) = &image_data.b64_json {
            base64::engine::general_purpose::STANDARD
                .decode(b64_json)
                .map_err(|e| Error::Upstream(format!("Failed to decode base64 image: {}", e)))?
        } else if let Some(url) = &image_data.url {
            self.http.download(url).await?
        } else {
            return Err(Error::Upstream(
                "No image data (neither base64 nor URL) in response".to_string(),
            ));
        };

        decode_and_fit(PROVIDER, &bytes, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255]))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn client(server: &MockServer) -> OpenAiImageClient {
        OpenAiImageClient::new(
            "key".to_string(),
            "gpt-image-1".to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    #[test]
    fn test_request_size_follows_aspect() {
        assert_eq!(request_size(2480, 3508), "1024x1536");
        assert_eq!(request_size(1200, 400), "1536x1024");
        assert_eq!(request_size(1080, 1080), "1024x1024");
    }

    #[tokio::test]
    async fn test_b64_response_is_fitted_to_target() {
        let server = MockServer::start().await;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png(64, 96));

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_string_contains("\"size\":\"1024x1536\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "b64_json": b64 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = client(&server)
            .generate_image("a storefront", 248, 351)
            .await
            .unwrap();
        assert_eq!(image.dimensions(), (248, 351));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let server = MockServer::start().await;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png(8, 8));

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": [{ "b64_json": b64 }] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OpenAiImageClient::new(
            "key".to_string(),
            "gpt-image-1".to_string(),
            Duration::from_millis(50),
        )
        .with_base_url(server.uri());

        let err = client.generate_image("a storefront", 64, 64).await.unwrap_err();
        match err {
            Error::Upstream(message) => assert!(message.contains("timed out")),
            other => panic!("expected upstream timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_url_response_is_downloaded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/bg.png", server.uri()) }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/bg.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png(32, 32)))
            .expect(1)
            .mount(&server)
            .await;

        let image = client(&server).generate_image("x", 100, 100).await.unwrap();
        assert_eq!(image.dimensions(), (100, 100));
    }

    #[tokio::test]
    async fn test_api_error_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .mount(&server)
            .await;

        let err = client(&server).generate_image("x", 10, 10).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_empty_data_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let err = client(&server).generate_image("x", 10, 10).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
