use super::font::FontFace;
use crate::registry::Rect;
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::{info, warn};

const PLACEHOLDER_WIDTH: u32 = 400;
const PLACEHOLDER_HEIGHT: u32 = 200;
const PLACEHOLDER_BORDER: u32 = 4;
const PLACEHOLDER_GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Load the configured logo, or the placeholder when none is configured or
/// the file cannot be decoded.
pub fn load_logo(path: Option<&Path>) -> RgbaImage {
    let Some(path) = path else {
        return placeholder_logo();
    };
    match image::open(path) {
        Ok(img) => {
            info!("Loaded logo from {}", path.display());
            img.to_rgba8()
        }
        Err(e) => {
            warn!(
                "Failed to load logo from {}: {}. Using placeholder",
                path.display(),
                e
            );
            placeholder_logo()
        }
    }
}

/// Transparent box with a gray border and the word "LOGO".
pub fn placeholder_logo() -> RgbaImage {
    let mut logo = RgbaImage::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    for (x, y, pixel) in logo.enumerate_pixels_mut() {
        let on_border = x < PLACEHOLDER_BORDER
            || y < PLACEHOLDER_BORDER
            || x >= PLACEHOLDER_WIDTH - PLACEHOLDER_BORDER
            || y >= PLACEHOLDER_HEIGHT - PLACEHOLDER_BORDER;
        if on_border {
            *pixel = PLACEHOLDER_GRAY;
        }
    }

    let face = FontFace::Bitmap;
    let px = 48.0;
    let text = "LOGO";
    let x = (PLACEHOLDER_WIDTH as f32 - face.text_width(text, px)) / 2.0;
    let y = (PLACEHOLDER_HEIGHT as f32 - px) / 2.0;
    let clip = Rect::new(0, 0, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    face.draw_line(&mut logo, text, x, y, px, PLACEHOLDER_GRAY, clip);
    logo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_border_and_transparent_interior_corner() {
        let logo = placeholder_logo();
        assert_eq!(logo.dimensions(), (400, 200));
        assert_eq!(*logo.get_pixel(0, 0), PLACEHOLDER_GRAY);
        assert_eq!(logo.get_pixel(20, 20).0[3], 0);
    }

    #[test]
    fn test_placeholder_draws_label() {
        let logo = placeholder_logo();
        let center_ink = (150..250)
            .flat_map(|x| (80..120).map(move |y| (x, y)))
            .any(|(x, y)| logo.get_pixel(x, y).0[3] > 0);
        assert!(center_ink);
    }

    #[test]
    fn test_unreadable_logo_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let logo = load_logo(Some(&path));

        assert_eq!(logo, placeholder_logo());
    }

    #[test]
    fn test_logo_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(30, 10, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let logo = load_logo(Some(&path));

        assert_eq!(logo.dimensions(), (30, 10));
    }
}
