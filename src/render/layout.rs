//! Word wrapping and the font-size reduction loop.

use super::font::FontFace;

pub const ELLIPSIS: &str = "...";

/// Bounds for the shrink loop, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPolicy {
    pub max_px: f32,
    pub min_px: f32,
    pub step: f32,
}

impl FitPolicy {
    /// Normalizes the bounds so the loop always terminates: `step >= 1`,
    /// `min_px >= 1` and `max_px >= min_px`.
    pub fn new(max_px: f32, min_px: f32, step: f32) -> Self {
        let min_px = if min_px.is_finite() { min_px.max(1.0) } else { 1.0 };
        let max_px = if max_px.is_finite() { max_px.max(min_px) } else { min_px };
        let step = if step.is_finite() { step.max(1.0) } else { 1.0 };
        Self {
            max_px,
            min_px,
            step,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub font_px: f32,
    pub lines: Vec<String>,
    pub truncated: bool,
}

impl TextBlock {
    pub fn height(&self, face: &FontFace) -> f32 {
        self.lines.len() as f32 * face.line_height(self.font_px)
    }
}

struct Wrapped {
    lines: Vec<String>,
    broke_word: bool,
}

/// Greedy word wrap. Explicit newlines start a new line; words wider than
/// `max_width` are split between characters.
fn wrap(face: &FontFace, text: &str, px: f32, max_width: f32) -> Wrapped {
    let mut lines = Vec::new();
    let mut broke_word = false;

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if face.text_width(&candidate, px) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if face.text_width(word, px) <= max_width {
                current = word.to_string();
                continue;
            }
            broke_word = true;
            for ch in word.chars() {
                current.push(ch);
                if face.text_width(&current, px) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    Wrapped { lines, broke_word }
}

pub fn wrap_text(face: &FontFace, text: &str, px: f32, max_width: f32) -> Vec<String> {
    wrap(face, text, px, max_width).lines
}

fn block_fits(face: &FontFace, lines: &[String], px: f32, width: f32, height: f32) -> bool {
    lines.len() as f32 * face.line_height(px) <= height
        && lines.iter().all(|l| face.text_width(l, px) <= width)
}

/// Pick the largest font size on the policy's step grid at which `text`
/// wraps into the box without splitting words. If none does, lay the text
/// out at the minimum size and cut it with [`ELLIPSIS`].
pub fn fit_text(face: &FontFace, text: &str, width: f32, height: f32, policy: FitPolicy) -> TextBlock {
    let text = text.trim();
    if text.is_empty() {
        return TextBlock {
            font_px: policy.max_px,
            lines: Vec::new(),
            truncated: false,
        };
    }

    let mut px = policy.max_px;
    loop {
        let wrapped = wrap(face, text, px, width);
        if !wrapped.broke_word && block_fits(face, &wrapped.lines, px, width, height) {
            return TextBlock {
                font_px: px,
                lines: wrapped.lines,
                truncated: false,
            };
        }
        if px <= policy.min_px {
            break;
        }
        px = (px - policy.step).max(policy.min_px);
    }

    truncate_to_fit(face, text, policy.min_px, width, height)
}

fn truncate_to_fit(face: &FontFace, text: &str, px: f32, width: f32, height: f32) -> TextBlock {
    let all = wrap_text(face, text, px, width);
    // At least one line survives; the draw clips whatever overhangs the box.
    let max_lines = ((height / face.line_height(px)).floor() as usize).max(1);

    let mut lines: Vec<String> = all.iter().take(max_lines).cloned().collect();
    let mut dropped = all.len() > lines.len();

    for line in lines.iter_mut() {
        while !line.is_empty() && face.text_width(line, px) > width {
            line.pop();
            dropped = true;
        }
    }

    if dropped {
        if let Some(last) = lines.last_mut() {
            loop {
                let candidate = format!("{}{}", last.trim_end(), ELLIPSIS);
                if face.text_width(&candidate, px) <= width {
                    *last = candidate;
                    break;
                }
                if last.pop().is_none() {
                    *last = ELLIPSIS
                        .chars()
                        .scan(String::new(), |acc, c| {
                            acc.push(c);
                            Some(acc.clone())
                        })
                        .take_while(|s| face.text_width(s, px) <= width)
                        .last()
                        .unwrap_or_default();
                    break;
                }
            }
        }
    }

    let overflows = lines.len() as f32 * face.line_height(px) > height;
    TextBlock {
        font_px: px,
        lines,
        truncated: dropped || overflows,
    }
}
