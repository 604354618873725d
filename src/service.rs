//! Poster generation pipeline: validation, AI generation, composition and
//! storage for one request.

use crate::ai::{self, ImageGenerationService, TextGenerationService, TextPrompt};
use crate::config::{Config, FallbackPolicy};
use crate::models::{
    EncodedPoster, GeneratedPoster, ImageGenerationRequest, ImageGenerationResponse,
    OutputFormat, PosterRequest, PosterSize, TextGenerationRequest, DEFAULT_TEXT_LENGTH,
    DEFAULT_THEME, DEFAULT_TONE, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH,
};
use crate::registry::{parse_hex_color, Registry, TemplateDefinition, ThemeDefinition};
use crate::render::canvas::vertical_gradient;
use crate::render::{encode, load_logo, Composition, Compositor, FontLibrary, PosterContent};
use crate::store::{FilesystemStore, PosterStore};
use crate::{prompts, Error, Result};
use base64::Engine as _;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_IMAGE_SIZE: u32 = 1024;
const DEFAULT_IMAGE_STYLE: &str = "realistic";
const MAX_COLORS: usize = 3;

/// Limits and output choices applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct PosterSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub output_format: OutputFormat,
    pub fallback: FallbackPolicy,
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            max_width: 5000,
            max_height: 5000,
            output_format: OutputFormat::Png,
            fallback: FallbackPolicy::None,
        }
    }
}

impl From<&Config> for PosterSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            output_format: config.output_format,
            fallback: config.fallback,
        }
    }
}

/// Injectable service bundle used to construct [`PosterService`] in tests.
pub struct PosterServices {
    pub text: Arc<dyn TextGenerationService>,
    pub image: Arc<dyn ImageGenerationService>,
    pub store: Arc<dyn PosterStore>,
    pub registry: Arc<Registry>,
    pub compositor: Compositor,
}

pub struct PosterService {
    text: Arc<dyn TextGenerationService>,
    image: Arc<dyn ImageGenerationService>,
    store: Arc<dyn PosterStore>,
    registry: Arc<Registry>,
    compositor: Compositor,
    settings: PosterSettings,
}

/// A request that passed validation, with names resolved.
struct PosterPlan {
    width: u32,
    height: u32,
    theme: ThemeDefinition,
    template: TemplateDefinition,
    tone: String,
}

impl PosterService {
    pub fn with_services(services: PosterServices, settings: PosterSettings) -> Self {
        Self {
            text: services.text,
            image: services.image,
            store: services.store,
            registry: services.registry,
            compositor: services.compositor,
            settings,
        }
    }

    /// Build the service from configuration: live providers (or mocks under
    /// `DRY_RUN`), fonts, logo and the filesystem store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(Registry::builtin());
        let fonts = Arc::new(FontLibrary::load(registry.themes(), &config.font_dirs));
        let logo = Arc::new(load_logo(config.logo_path.as_deref()));
        let store = FilesystemStore::new(&config.output_dir, config.max_file_size)?;

        if config.dry_run {
            info!("DRY_RUN enabled, using mock AI clients");
        } else {
            info!(
                "Text provider: {:?} (model: {}), image provider: {:?} (model: {})",
                config.text_provider,
                config.text_model,
                config.image_provider,
                config.image_model
            );
        }

        Ok(Self::with_services(
            PosterServices {
                text: ai::text_client(config),
                image: ai::image_client(config),
                store: Arc::new(store),
                registry,
                compositor: Compositor::new(fonts, logo),
            },
            PosterSettings::from(config),
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> PosterSettings {
        self.settings
    }

    pub async fn generate_poster(&self, request: PosterRequest) -> Result<GeneratedPoster> {
        let plan = self.plan(&request)?;
        info!(
            "Generating {}x{} poster (theme: {}, template: {})",
            plan.width, plan.height, plan.theme.name, plan.template.key
        );

        let (description, background) = tokio::join!(
            self.poster_description(&request, &plan),
            self.poster_background(&request, &plan)
        );
        let description = description?;
        let background = background?;

        let (width, height) = (plan.width, plan.height);
        let mut stored_request = request.clone();
        stored_request.theme = plan.theme.name.clone();
        stored_request.template = plan.template.key.clone();
        stored_request.description = description.clone();

        let composition = Composition {
            width,
            height,
            theme: plan.theme,
            template: plan.template,
            content: PosterContent {
                title: request.title.trim().to_string(),
                description,
                additional_text: request.additional_text.clone(),
            },
            background,
            include_logo: request.include_logo,
        };
        let compositor = self.compositor.clone();
        let format = self.settings.output_format;

        let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let canvas = compositor.compose(&composition)?;
            encode(&canvas, format)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Render task failed: {}", e)))??;

        let encoded = EncodedPoster {
            bytes,
            format,
            width,
            height,
        };
        let poster = self.store.save(&encoded, &stored_request).await?;
        info!(
            "Poster {} stored ({} bytes)",
            poster.poster_id, poster.file_size
        );
        Ok(poster)
    }

    pub async fn load_poster(&self, poster_id: &str) -> Result<(Vec<u8>, GeneratedPoster)> {
        self.store.load(poster_id).await
    }

    pub async fn delete_poster(&self, poster_id: &str) -> Result<()> {
        self.store.delete(poster_id).await
    }

    pub async fn generate_text(&self, request: &TextGenerationRequest) -> Result<String> {
        let prompt = required_text("prompt", &request.prompt, MAX_TEXT_LENGTH)?;
        let max_length = request.max_length.unwrap_or(DEFAULT_TEXT_LENGTH);
        if !(1..=MAX_TEXT_LENGTH).contains(&max_length) {
            return Err(Error::validation(
                "max_length",
                format!("must be between 1 and {}", MAX_TEXT_LENGTH),
            ));
        }
        let tone = tone_or_default(request.tone.as_deref());

        let text_prompt = TextPrompt {
            prompt: prompt.to_string(),
            context: request.context.clone(),
            tone: tone.clone(),
            max_length,
        };
        match self.text.generate_text(&text_prompt).await {
            Ok(text) => Ok(text),
            Err(e) => self.text_fallback(e, &tone, prompt, max_length),
        }
    }

    pub async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        let prompt = required_text("prompt", &request.prompt, MAX_TEXT_LENGTH)?;
        let width = request.width.unwrap_or(DEFAULT_IMAGE_SIZE);
        let height = request.height.unwrap_or(DEFAULT_IMAGE_SIZE);
        check_dimension("width", width, self.settings.max_width)?;
        check_dimension("height", height, self.settings.max_height)?;
        let style = request
            .style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_IMAGE_STYLE);

        let image = match self
            .image
            .generate_image(&prompts::image(prompt, style), width, height)
            .await
        {
            Ok(image) => image,
            Err(e) => {
                self.image_fallback(e)?;
                let theme = self.registry.resolve_theme(DEFAULT_THEME)?;
                vertical_gradient(width, height, theme.palette.background, theme.palette.accent)
            }
        };

        let png = tokio::task::spawn_blocking(move || encode(&image, OutputFormat::Png))
            .await
            .map_err(|e| Error::Invariant(format!("Encode task failed: {}", e)))??;

        Ok(ImageGenerationResponse {
            image_data: base64::engine::general_purpose::STANDARD.encode(png),
            width,
            height,
            prompt: prompt.to_string(),
            message: "Image generated successfully!".to_string(),
        })
    }

    /// Validate everything that can be checked without a provider call.
    fn plan(&self, request: &PosterRequest) -> Result<PosterPlan> {
        let (width, height) = resolve_dimensions(request, &self.settings)?;
        required_text("title", &request.title, MAX_TITLE_LENGTH)?;
        optional_text("description", request.description.as_deref())?;
        optional_text("additional_text", request.additional_text.as_deref())?;
        optional_text("background_prompt", request.background_prompt.as_deref())?;

        let theme = self
            .registry
            .resolve_theme(&request.theme)
            .map_err(|_| {
                Error::validation(
                    "theme",
                    format!(
                        "unknown theme '{}', expected one of: {}",
                        request.theme,
                        self.registry.list_themes().join(", ")
                    ),
                )
            })?;
        let template = self
            .registry
            .resolve_template(&request.template)
            .map_err(|_| {
                let keys: Vec<String> = self
                    .registry
                    .list_templates()
                    .into_iter()
                    .map(|t| t.key)
                    .collect();
                Error::validation(
                    "template",
                    format!(
                        "unknown template '{}', expected one of: {}",
                        request.template,
                        keys.join(", ")
                    ),
                )
            })?;

        let theme = match &request.color_scheme {
            Some(colors) => theme.with_color_scheme(&parse_color_scheme(colors)?),
            None => theme.clone(),
        };

        Ok(PosterPlan {
            width,
            height,
            theme,
            template: template.clone(),
            tone: tone_or_default(request.tone.as_deref()),
        })
    }

    async fn poster_description(
        &self,
        request: &PosterRequest,
        plan: &PosterPlan,
    ) -> Result<Option<String>> {
        if let Some(text) = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Ok(Some(text.to_string()));
        }
        if !request.generate_description {
            return Ok(None);
        }

        let title = request.title.trim();
        let prompt = TextPrompt {
            prompt: prompts::description(&plan.theme.name, title),
            context: None,
            tone: plan.tone.clone(),
            max_length: DEFAULT_TEXT_LENGTH,
        };
        match self.text.generate_text(&prompt).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => self
                .text_fallback(e, &plan.tone, title, DEFAULT_TEXT_LENGTH)
                .map(Some),
        }
    }

    async fn poster_background(
        &self,
        request: &PosterRequest,
        plan: &PosterPlan,
    ) -> Result<Option<RgbaImage>> {
        let Some(prompt) = request
            .background_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };

        let prompt = prompts::background(prompt, &plan.theme.name);
        match self
            .image
            .generate_image(&prompt, plan.width, plan.height)
            .await
        {
            Ok(image) => Ok(Some(image)),
            Err(e) => self.image_fallback(e).map(|_| None),
        }
    }

    fn text_fallback(
        &self,
        err: Error,
        tone: &str,
        subject: &str,
        max_length: usize,
    ) -> Result<String> {
        match self.settings.fallback {
            FallbackPolicy::None => Err(err),
            FallbackPolicy::Placeholder => {
                warn!("Text generation failed ({}), using fallback copy", err);
                ai::clamp_text(&prompts::fallback_text(tone, subject), max_length)
            }
        }
    }

    fn image_fallback(&self, err: Error) -> Result<()> {
        match self.settings.fallback {
            FallbackPolicy::None => Err(err),
            FallbackPolicy::Placeholder => {
                warn!("Image generation failed ({}), using theme gradient", err);
                Ok(())
            }
        }
    }
}

/// Pixel dimensions for a request, checked against the configured maxima.
pub fn resolve_dimensions(request: &PosterRequest, settings: &PosterSettings) -> Result<(u32, u32)> {
    let (width, height) = match request.size {
        PosterSize::Custom => {
            let width = request.custom_width.ok_or_else(|| {
                Error::validation("custom_width", "required when size is CUSTOM")
            })?;
            let height = request.custom_height.ok_or_else(|| {
                Error::validation("custom_height", "required when size is CUSTOM")
            })?;
            check_dimension("custom_width", width, settings.max_width)?;
            check_dimension("custom_height", height, settings.max_height)?;
            (width, height)
        }
        preset => match preset.preset_dimensions() {
            Some(dims) => dims,
            None => return Err(Error::Invariant(format!("{:?} has no dimensions", preset))),
        },
    };

    if width > settings.max_width || height > settings.max_height {
        return Err(Error::validation(
            "size",
            format!(
                "{}x{} exceeds the configured maximum of {}x{}",
                width, height, settings.max_width, settings.max_height
            ),
        ));
    }
    Ok((width, height))
}

fn check_dimension(field: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::validation(field, "must be greater than 0"));
    }
    if value > max {
        return Err(Error::validation(field, format!("must be at most {}", max)));
    }
    Ok(())
}

fn required_text<'a>(field: &str, value: &'a str, max_chars: usize) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(Error::validation(
            field,
            format!("must be at most {} characters", max_chars),
        ));
    }
    Ok(trimmed)
}

fn optional_text(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LENGTH => Err(Error::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LENGTH),
        )),
        _ => Ok(()),
    }
}

fn parse_color_scheme(colors: &[String]) -> Result<Vec<image::Rgba<u8>>> {
    if colors.len() > MAX_COLORS {
        return Err(Error::validation(
            "color_scheme",
            format!("at most {} colors are supported", MAX_COLORS),
        ));
    }
    colors
        .iter()
        .map(|c| {
            parse_hex_color(c).ok_or_else(|| {
                Error::validation("color_scheme", format!("'{}' is not a #RRGGBB color", c))
            })
        })
        .collect()
}

fn tone_or_default(tone: Option<&str>) -> String {
    tone.map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE)
        .to_ascii_lowercase()
}
