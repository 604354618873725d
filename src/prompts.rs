pub const TEXT_SYSTEM: &str = include_str!("../data/prompts/text_system.txt");
pub const TEXT_USER: &str = include_str!("../data/prompts/text_user.txt");
pub const DESCRIPTION: &str = include_str!("../data/prompts/description.txt");
pub const BACKGROUND: &str = include_str!("../data/prompts/background.txt");
pub const IMAGE: &str = include_str!("../data/prompts/image.txt");

/// Replace `{{key}}` placeholders in a template string. Substituted values
/// are never scanned again; unknown placeholders are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };
        let key = &after[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    result.push_str(rest);
    result
}

/// Render the user turn of a text request, prefixing the optional context.
pub fn text_user(prompt: &str, context: Option<&str>) -> String {
    let context = match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("Context: {}\n\n", c),
        None => String::new(),
    };
    render(TEXT_USER, &[("context", &context), ("prompt", prompt)])
        .trim()
        .to_string()
}

pub fn text_system(tone: &str, max_length: usize) -> String {
    render(
        TEXT_SYSTEM,
        &[("tone", tone), ("max_length", &max_length.to_string())],
    )
    .trim()
    .to_string()
}

pub fn description(theme: &str, title: &str) -> String {
    render(DESCRIPTION, &[("theme", theme), ("title", title)])
        .trim()
        .to_string()
}

pub fn background(prompt: &str, style: &str) -> String {
    render(BACKGROUND, &[("prompt", prompt), ("style", style)])
        .trim()
        .to_string()
}

pub fn image(prompt: &str, style: &str) -> String {
    render(IMAGE, &[("prompt", prompt), ("style", style)])
        .trim()
        .to_string()
}

/// Canned copy used when the text provider is unavailable.
pub fn fallback_text(tone: &str, subject: &str) -> String {
    match tone.trim().to_ascii_lowercase().as_str() {
        "professional" => format!("Professional content for: {}", subject),
        "casual" => format!("Exciting announcement about: {}", subject),
        "urgent" => format!("Don't miss out on: {}", subject),
        "friendly" => format!("Join us for: {}", subject),
        _ => format!("Learn more about: {}", subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        assert_eq!(
            image("a {{style}} cat", "watercolor"),
            "a {{style}} cat, watercolor style, high quality."
        );
        assert_eq!(
            render("{{a}} {{b}}", &[("a", "{{b}}"), ("b", "x")]),
            "{{b}} x"
        );
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        assert_eq!(render("{{x}} {{a}}", &[("a", "1")]), "{{x}} 1");
        assert_eq!(render("open {{a", &[("a", "1")]), "open {{a");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!TEXT_SYSTEM.is_empty());
        assert!(!TEXT_USER.is_empty());
        assert!(!DESCRIPTION.is_empty());
        assert!(!BACKGROUND.is_empty());
        assert!(!IMAGE.is_empty());
    }

    #[test]
    fn test_text_system_mentions_tone_and_limit() {
        let system = text_system("urgent", 120);
        assert!(system.contains("urgent"));
        assert!(system.contains("120 characters"));
        assert!(!system.contains("{{"));
    }

    #[test]
    fn test_text_user_with_and_without_context() {
        assert_eq!(text_user("a sale", None), "Request: a sale");
        assert_eq!(
            text_user("a sale", Some("shoes")),
            "Context: shoes\n\nRequest: a sale"
        );
    }

    #[test]
    fn test_description_names_theme_and_title() {
        let rendered = description("corporate", "Grand Opening Sale");
        assert!(rendered.contains("corporate"));
        assert!(rendered.contains("\"Grand Opening Sale\""));
    }

    #[test]
    fn test_background_has_placeholders_filled() {
        assert!(BACKGROUND.contains("{{prompt}}"));
        let rendered = background("sunset", "watercolor");
        assert!(rendered.contains("sunset"));
        assert!(rendered.contains("watercolor"));
    }

    #[test]
    fn test_fallback_text_by_tone() {
        assert_eq!(fallback_text("urgent", "the sale"), "Don't miss out on: the sale");
        assert_eq!(fallback_text("Friendly", "the fair"), "Join us for: the fair");
        assert_eq!(fallback_text("whimsical", "x"), "Learn more about: x");
    }
}
