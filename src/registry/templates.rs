use serde::Serialize;

/// Templates are authored against an 800x1000 canvas and scaled per axis.
pub const REFERENCE_WIDTH: u32 = 800;
pub const REFERENCE_HEIGHT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Description,
    AdditionalText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a reference-space rectangle onto a canvas of the given size.
    pub fn scaled(&self, canvas_width: u32, canvas_height: u32) -> Rect {
        let sx = canvas_width as f64 / REFERENCE_WIDTH as f64;
        let sy = canvas_height as f64 / REFERENCE_HEIGHT as f64;
        let x = (self.x as f64 * sx).round() as u32;
        let y = (self.y as f64 * sy).round() as u32;
        let width = ((self.width as f64 * sx).round() as u32).max(1);
        let height = ((self.height as f64 * sy).round() as u32).max(1);
        Rect {
            x: x.min(canvas_width.saturating_sub(1)),
            y: y.min(canvas_height.saturating_sub(1)),
            width: width.min(canvas_width.saturating_sub(x)).max(1),
            height: height.min(canvas_height.saturating_sub(y)).max(1),
        }
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRegion {
    pub field: TextField,
    pub rect: Rect,
    pub align: HAlign,
    pub valign: VAlign,
    /// Font sizes in reference pixels; scaled with the canvas.
    pub max_font_size: f32,
    pub min_font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub regions: Vec<TextRegion>,
    pub logo_region: Option<Rect>,
    /// Opacity of the palette background blended over generated imagery.
    pub overlay_opacity: f32,
}

impl TemplateDefinition {
    pub fn region(&self, field: TextField) -> Option<&TextRegion> {
        self.regions.iter().find(|r| r.field == field)
    }
}

const fn region(
    field: TextField,
    rect: Rect,
    align: HAlign,
    valign: VAlign,
    max_font_size: f32,
    min_font_size: f32,
) -> TextRegion {
    TextRegion {
        field,
        rect,
        align,
        valign,
        max_font_size,
        min_font_size,
    }
}

pub(crate) fn builtin_templates() -> Vec<TemplateDefinition> {
    use HAlign::{Center, Left};
    use TextField::{AdditionalText, Description, Title};
    use VAlign::{Middle, Top};

    vec![
        TemplateDefinition {
            key: "event_flyer".to_string(),
            name: "Event Flyer".to_string(),
            description: "Perfect for events, concerts, and gatherings".to_string(),
            regions: vec![
                region(Title, Rect::new(50, 100, 700, 150), Center, Middle, 48.0, 14.0),
                region(Description, Rect::new(50, 270, 700, 80), Center, Top, 24.0, 10.0),
                region(AdditionalText, Rect::new(50, 910, 700, 80), Center, Middle, 18.0, 8.0),
            ],
            logo_region: None,
            overlay_opacity: 0.35,
        },
        TemplateDefinition {
            key: "business_poster".to_string(),
            name: "Business Poster".to_string(),
            description: "Professional design for business promotions".to_string(),
            regions: vec![
                region(Title, Rect::new(270, 50, 480, 100), Left, Middle, 36.0, 12.0),
                region(Description, Rect::new(50, 490, 700, 300), Left, Top, 20.0, 8.0),
                region(AdditionalText, Rect::new(50, 810, 700, 100), Center, Middle, 20.0, 8.0),
            ],
            logo_region: Some(Rect::new(50, 50, 200, 100)),
            overlay_opacity: 0.45,
        },
        TemplateDefinition {
            key: "social_media".to_string(),
            name: "Social Media Post".to_string(),
            description: "Optimized for social media platforms".to_string(),
            regions: vec![
                region(Title, Rect::new(100, 200, 600, 150), Center, Middle, 42.0, 12.0),
                region(Description, Rect::new(100, 400, 600, 200), Center, Top, 18.0, 8.0),
                region(AdditionalText, Rect::new(100, 650, 600, 50), Center, Middle, 14.0, 8.0),
            ],
            logo_region: None,
            overlay_opacity: 0.6,
        },
        TemplateDefinition {
            key: "announcement".to_string(),
            name: "Announcement".to_string(),
            description: "Clean design for announcements and notices".to_string(),
            regions: vec![
                region(Title, Rect::new(50, 170, 700, 120), Left, Middle, 36.0, 12.0),
                region(Description, Rect::new(50, 310, 700, 400), Left, Top, 16.0, 8.0),
                region(AdditionalText, Rect::new(50, 950, 700, 40), Left, Middle, 12.0, 6.0),
            ],
            logo_region: None,
            overlay_opacity: 0.3,
        },
        TemplateDefinition {
            key: "creative_poster".to_string(),
            name: "Creative Poster".to_string(),
            description: "Artistic and creative design with flexible layout".to_string(),
            regions: vec![
                region(Title, Rect::new(100, 150, 600, 200), Center, Middle, 52.0, 14.0),
                region(Description, Rect::new(100, 400, 600, 200), Center, Middle, 24.0, 8.0),
                region(AdditionalText, Rect::new(100, 850, 600, 100), Center, Middle, 18.0, 8.0),
            ],
            logo_region: None,
            overlay_opacity: 0.2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_scales_per_axis() {
        let rect = Rect::new(50, 100, 700, 150);
        let scaled = rect.scaled(1600, 500);
        assert_eq!(scaled, Rect::new(100, 50, 1400, 75));
    }

    #[test]
    fn test_rect_scaling_stays_inside_canvas() {
        let rect = Rect::new(700, 950, 100, 50);
        let scaled = rect.scaled(7, 3);
        assert!(scaled.x + scaled.width <= 7);
        assert!(scaled.y + scaled.height <= 3);
        assert!(scaled.width >= 1 && scaled.height >= 1);
    }

    #[test]
    fn test_regions_fit_reference_canvas() {
        for template in builtin_templates() {
            for region in &template.regions {
                assert!(region.rect.x + region.rect.width <= REFERENCE_WIDTH);
                assert!(region.rect.y + region.rect.height <= REFERENCE_HEIGHT);
                assert!(region.min_font_size <= region.max_font_size);
            }
        }
    }

    #[test]
    fn test_only_business_poster_has_logo_region() {
        let with_logo: Vec<String> = builtin_templates()
            .into_iter()
            .filter(|t| t.logo_region.is_some())
            .map(|t| t.key)
            .collect();
        assert_eq!(with_logo, vec!["business_poster".to_string()]);
    }
}
