use super::{clamp_text, ImageGenerationService, TextGenerationService, TextPrompt};
use crate::{Error, Result};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

pub struct MockTextClient {
    responses: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    fail: bool,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            fail: false,
        }
    }

    /// A client whose every call fails with `Upstream`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, prompt: &TextPrompt) -> Result<String> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        if self.fail {
            return Err(Error::Upstream("mock text provider failure".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        let text = if responses.is_empty() {
            format!("A {} message about {}", prompt.tone, prompt.prompt)
        } else {
            responses[(count - 1) % responses.len()].clone()
        };
        clamp_text(&text, prompt.max_length)
    }
}

pub struct MockImageClient {
    color: Rgba<u8>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            color: Rgba([70, 110, 160, 255]),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, prompt: &str, width: u32, height: u32) -> Result<RgbaImage> {
        *self.call_count.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(Error::Upstream("mock image provider failure".to_string()));
        }
        Ok(RgbaImage::from_pixel(width, height, self.color))
    }
}
