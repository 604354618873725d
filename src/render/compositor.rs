//! Poster composition
//!
//! Stacks background, text regions and logo onto one canvas and encodes the
//! result. Everything here is synchronous and CPU bound; callers on the async
//! runtime go through `spawn_blocking`.

use super::canvas::{cover, overlay_color, paste_contained, vertical_gradient};
use super::font::{FontFace, FontLibrary};
use super::layout::{fit_text, FitPolicy, TextBlock};
use crate::models::OutputFormat;
use crate::registry::{
    HAlign, Rect, TemplateDefinition, TextField, TextRegion, ThemeDefinition, VAlign,
    REFERENCE_HEIGHT, REFERENCE_WIDTH,
};
use crate::{Error, Result};
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Smallest font size drawn unless the region itself is shorter than one
/// line at this size, in canvas pixels.
const MIN_RENDER_PX: f32 = 6.0;
/// Shrink step of the fit loop, in reference pixels.
const FIT_STEP: f32 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosterContent {
    pub title: String,
    pub description: Option<String>,
    pub additional_text: Option<String>,
}

impl PosterContent {
    fn field(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::Title => Some(self.title.as_str()),
            TextField::Description => self.description.as_deref(),
            TextField::AdditionalText => self.additional_text.as_deref(),
        };
        value.map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Everything needed to render one poster.
#[derive(Debug, Clone)]
pub struct Composition {
    pub width: u32,
    pub height: u32,
    pub theme: ThemeDefinition,
    pub template: TemplateDefinition,
    pub content: PosterContent,
    /// Generated background; `None` draws the theme gradient.
    pub background: Option<RgbaImage>,
    pub include_logo: bool,
}

#[derive(Debug, Clone)]
pub struct Compositor {
    fonts: Arc<FontLibrary>,
    logo: Arc<RgbaImage>,
}

impl Compositor {
    pub fn new(fonts: Arc<FontLibrary>, logo: Arc<RgbaImage>) -> Self {
        Self { fonts, logo }
    }

    pub fn compose(&self, composition: &Composition) -> Result<RgbaImage> {
        let (width, height) = (composition.width, composition.height);
        if width == 0 || height == 0 {
            return Err(Error::Render(format!(
                "Cannot render a {}x{} poster",
                width, height
            )));
        }
        let palette = composition.theme.palette;

        let mut canvas = match &composition.background {
            Some(background) => {
                let mut canvas =
                    cover(&DynamicImage::ImageRgba8(background.clone()), width, height);
                overlay_color(
                    &mut canvas,
                    palette.background,
                    composition.template.overlay_opacity,
                );
                canvas
            }
            None => vertical_gradient(width, height, palette.background, palette.accent),
        };

        let face = self.fonts.face_for(&composition.theme);
        for region in &composition.template.regions {
            if let Some(text) = composition.content.field(region.field) {
                draw_region(&mut canvas, &face, region, text, &composition.theme);
            }
        }

        if composition.include_logo {
            if let Some(rect) = composition.template.logo_region {
                paste_contained(&mut canvas, &self.logo, rect.scaled(width, height));
            }
        }

        if canvas.dimensions() != (width, height) {
            return Err(Error::Invariant(format!(
                "Composed canvas is {:?}, expected {}x{}",
                canvas.dimensions(),
                width,
                height
            )));
        }
        Ok(canvas)
    }
}

/// Font scale factor for a canvas; uses the tighter axis so text never
/// overflows a region that shrank more in one direction.
fn font_scale(width: u32, height: u32) -> f32 {
    f32::min(
        width as f32 / REFERENCE_WIDTH as f32,
        height as f32 / REFERENCE_HEIGHT as f32,
    )
}

fn region_policy(region: &TextRegion, scale: f32) -> FitPolicy {
    let max_px = region.max_font_size * scale;
    let min_px = (region.min_font_size * scale).max(MIN_RENDER_PX);
    FitPolicy::new(max_px, min_px, FIT_STEP * scale)
}

/// Lower the minimum so that one line still fits a very short region.
fn fit_line_height(policy: FitPolicy, face: &FontFace, region_height: u32) -> FitPolicy {
    let one_line_px = region_height as f32 / face.line_height(1.0);
    if policy.min_px <= one_line_px {
        return policy;
    }
    FitPolicy::new(policy.max_px.min(one_line_px), one_line_px, policy.step)
}

fn draw_region(
    canvas: &mut RgbaImage,
    face: &FontFace,
    region: &TextRegion,
    text: &str,
    theme: &ThemeDefinition,
) {
    let (width, height) = canvas.dimensions();
    let rect = region.rect.scaled(width, height);
    let policy = fit_line_height(
        region_policy(region, font_scale(width, height)),
        face,
        rect.height,
    );
    let block = fit_text(face, text, rect.width as f32, rect.height as f32, policy);

    debug!(
        "Region {:?}: {} line(s) at {:.1}px{}",
        region.field,
        block.lines.len(),
        block.font_px,
        if block.truncated { " (truncated)" } else { "" }
    );

    draw_block(canvas, face, &block, rect, region.align, region.valign, theme);
}

fn draw_block(
    canvas: &mut RgbaImage,
    face: &FontFace,
    block: &TextBlock,
    rect: Rect,
    align: HAlign,
    valign: VAlign,
    theme: &ThemeDefinition,
) {
    let px = block.font_px;
    let line_height = face.line_height(px);
    let block_height = block.height(face);
    let top = match valign {
        VAlign::Top => rect.y as f32,
        VAlign::Middle => rect.y as f32 + (rect.height as f32 - block_height) / 2.0,
        VAlign::Bottom => (rect.y + rect.height) as f32 - block_height,
    };
    let outline_radius = (px / 24.0).round().max(1.0);

    for (i, line) in block.lines.iter().enumerate() {
        let line_width = face.text_width(line, px);
        let x = match align {
            HAlign::Left => rect.x as f32,
            HAlign::Center => rect.x as f32 + (rect.width as f32 - line_width) / 2.0,
            HAlign::Right => (rect.x + rect.width) as f32 - line_width,
        };
        let y = top + i as f32 * line_height;

        if let Some(outline) = theme.palette.outline {
            for (dx, dy) in outline_offsets(outline_radius) {
                face.draw_line(canvas, line, x + dx, y + dy, px, outline, rect);
            }
        }
        face.draw_line(canvas, line, x, y, px, theme.palette.foreground, rect);
    }
}

fn outline_offsets(radius: f32) -> [(f32, f32); 8] {
    let r = radius;
    [
        (-r, -r),
        (0.0, -r),
        (r, -r),
        (-r, 0.0),
        (r, 0.0),
        (-r, r),
        (0.0, r),
        (r, r),
    ]
}

/// Encode a composed poster. JPEG has no alpha channel, so it is dropped.
pub fn encode(canvas: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgba8(canvas.clone())
            .to_rgb8()
            .write_to(&mut buffer, format.image_format()),
        _ => canvas.write_to(&mut buffer, format.image_format()),
    };
    result.map_err(|e| Error::Render(format!("Failed to encode {:?}: {}", format, e)))?;
    Ok(buffer.into_inner())
}
