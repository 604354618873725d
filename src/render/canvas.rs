//! Pixel-level helpers: cover fitting, gradients, overlays and blending.

use crate::registry::Rect;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// Relative aspect-ratio difference tolerated before cropping.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Alpha-blend `color` onto one pixel with the given coverage (0..=1).
/// Coordinates outside the canvas are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = 255;
}

/// Crop the largest centered region of `image` matching `width:height`.
pub fn center_crop_to_aspect(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (iw, ih) = (image.width(), image.height());
    if iw == 0 || ih == 0 || width == 0 || height == 0 {
        return image.clone();
    }
    let target = width as f64 / height as f64;
    let source = iw as f64 / ih as f64;

    let (cw, ch) = if source > target {
        (((ih as f64 * target).round() as u32).clamp(1, iw), ih)
    } else {
        (iw, ((iw as f64 / target).round() as u32).clamp(1, ih))
    };
    image.crop_imm((iw - cw) / 2, (ih - ch) / 2, cw, ch)
}

/// Scale to fill `width`x`height` preserving aspect ratio, cropping the
/// overflow from the center. Never letterboxes.
pub fn cover(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image.to_rgba8();
    }
    center_crop_to_aspect(image, width, height)
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8()
}

/// Deterministic fit for provider output: crop only when the aspect ratio
/// is off by more than [`ASPECT_TOLERANCE`], then resize to the exact size.
pub fn fit_to_dimensions(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let target = width as f64 / height as f64;
    let source = image.width() as f64 / image.height().max(1) as f64;
    let cropped = if ((source - target) / target).abs() > ASPECT_TOLERANCE {
        center_crop_to_aspect(image, width, height)
    } else {
        image.clone()
    };
    if cropped.width() == width && cropped.height() == height {
        return cropped.to_rgba8();
    }
    cropped
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8()
}

pub fn vertical_gradient(width: u32, height: u32, top: Rgba<u8>, bottom: Rgba<u8>) -> RgbaImage {
    let span = height.saturating_sub(1).max(1) as f32;
    let mut canvas = RgbaImage::new(width, height);
    for y in 0..height {
        let t = y as f32 / span;
        let mut color = Rgba([0, 0, 0, 255]);
        for c in 0..3 {
            color.0[c] = (top.0[c] as f32 * (1.0 - t) + bottom.0[c] as f32 * t).round() as u8;
        }
        for x in 0..width {
            canvas.put_pixel(x, y, color);
        }
    }
    canvas
}

/// Blend a flat color over the whole canvas.
pub fn overlay_color(canvas: &mut RgbaImage, color: Rgba<u8>, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    for pixel in canvas.pixels_mut() {
        for c in 0..3 {
            pixel.0[c] =
                (color.0[c] as f32 * opacity + pixel.0[c] as f32 * (1.0 - opacity)).round() as u8;
        }
        pixel.0[3] = 255;
    }
}

/// Scale `image` to fit inside `region` without distortion and composite it
/// centered there.
pub fn paste_contained(canvas: &mut RgbaImage, image: &RgbaImage, region: Rect) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let scale = f64::min(
        region.width as f64 / image.width() as f64,
        region.height as f64 / image.height() as f64,
    );
    let w = ((image.width() as f64 * scale).floor() as u32).clamp(1, region.width);
    let h = ((image.height() as f64 * scale).floor() as u32).clamp(1, region.height);
    let scaled = imageops::resize(image, w, h, FilterType::Lanczos3);

    let x = region.x + (region.width - w) / 2;
    let y = region.y + (region.height - h) / 2;
    imageops::overlay(canvas, &scaled, x as i64, y as i64);
}
