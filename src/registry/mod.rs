//! Theme and template registry
//!
//! Built once at startup and shared read-only; every lookup is pure.

pub mod templates;
pub mod themes;

pub use templates::{
    HAlign, Rect, TemplateDefinition, TextField, TextRegion, VAlign, REFERENCE_HEIGHT,
    REFERENCE_WIDTH,
};
pub use themes::{parse_hex_color, FontWeight, Palette, ThemeDefinition};

use crate::models::TemplateSummary;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Registry {
    themes: Vec<ThemeDefinition>,
    templates: Vec<TemplateDefinition>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            themes: themes::builtin_themes(),
            templates: templates::builtin_templates(),
        }
    }

    pub fn resolve_theme(&self, name: &str) -> Result<&ThemeDefinition> {
        let wanted = name.trim().to_ascii_lowercase();
        self.themes
            .iter()
            .find(|t| t.name == wanted)
            .ok_or_else(|| Error::NotFound(format!("theme '{}'", name)))
    }

    pub fn resolve_template(&self, name: &str) -> Result<&TemplateDefinition> {
        let wanted = name.trim().to_ascii_lowercase();
        self.templates
            .iter()
            .find(|t| t.key == wanted)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", name)))
    }

    pub fn list_themes(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn list_templates(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|t| TemplateSummary {
                key: t.key.clone(),
                name: t.name.clone(),
                description: t.description.clone(),
                has_logo_region: t.logo_region.is_some(),
            })
            .collect()
    }

    pub fn themes(&self) -> &[ThemeDefinition] {
        &self.themes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_theme_template_pair_resolves_with_non_empty_fields() {
        let registry = Registry::builtin();

        for theme_name in registry.list_themes() {
            let theme = registry.resolve_theme(theme_name).unwrap();
            assert!(!theme.name.is_empty());
            assert!(!theme.font_family.is_empty());
            assert!(!theme.font_files.is_empty());

            for summary in registry.list_templates() {
                let template = registry.resolve_template(&summary.key).unwrap();
                assert!(!template.key.is_empty());
                assert!(!template.name.is_empty());
                assert!(!template.description.is_empty());
                assert!(!template.regions.is_empty());
                assert!(template.region(TextField::Title).is_some());
            }
        }
    }

    #[test]
    fn test_listing_order_is_stable() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.list_themes(),
            vec![
                "modern",
                "classic",
                "minimal",
                "vibrant",
                "corporate",
                "event",
                "sale",
                "professional",
                "creative",
                "dark",
                "retro",
                "elegant"
            ]
        );
        let keys: Vec<String> = registry.list_templates().into_iter().map(|t| t.key).collect();
        assert_eq!(
            keys,
            vec![
                "event_flyer",
                "business_poster",
                "social_media",
                "announcement",
                "creative_poster"
            ]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = Registry::builtin();
        assert_eq!(registry.resolve_theme(" Corporate ").unwrap().name, "corporate");
    }

    #[test]
    fn test_unknown_names_are_not_found() {
        let registry = Registry::builtin();
        assert!(matches!(
            registry.resolve_theme("neon"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            registry.resolve_template("billboard"),
            Err(Error::NotFound(_))
        ));
    }
}
