//! Prompt context construction and model selection for predictions.

use crate::models::{ConversationItem, PredictionModel};

/// How many trailing transcript items feed the prediction prompt.
const CONTEXT_ITEMS: usize = 5;

/// Per-paragraph character cap for a context line.
const PARAGRAPH_LIMIT: usize = 2000;

/// Render the tail of the transcript as prediction context.
///
/// Each of the last five items becomes one role-prefixed line built from the
/// last paragraph of its text, capped at 2000 characters. Lines are joined
/// with blank lines. Returns `None` when nothing usable remains; no request
/// should be issued in that case.
pub fn build_context(items: &[ConversationItem]) -> Option<String> {
    let start = items.len().saturating_sub(CONTEXT_ITEMS);
    let lines: Vec<String> = items[start..]
        .iter()
        .filter_map(|item| {
            let text = item.content.text()?;
            let paragraph = last_paragraph(text);
            if paragraph.is_empty() {
                return None;
            }
            Some(format!(
                "{}: {}",
                item.content.role_label(),
                truncate_chars(paragraph, PARAGRAPH_LIMIT)
            ))
        })
        .collect();

    let context = lines.join("\n\n");
    if context.trim().is_empty() {
        None
    } else {
        Some(context)
    }
}

/// Pick the model id for the prediction call.
///
/// The candidate list is scanned from the end toward the start, so the most
/// recently added entry wins ties: first anything matching "spark", then
/// anything matching "mini", otherwise no model is specified.
pub fn select_model(models: &[PredictionModel]) -> Option<String> {
    for needle in ["spark", "mini"] {
        if let Some(found) = models.iter().rev().find(|m| m.matches(needle)) {
            return Some(found.id.clone());
        }
    }
    None
}

/// The last non-empty paragraph of possibly multi-paragraph text.
fn last_paragraph(text: &str) -> &str {
    text.rsplit("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or("")
}

/// Truncate at a character boundary, never mid code point.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
