//! Text fitting helpers for Discord limits
//!
//! - **Version**: 1.1.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 1.1.0: Add select-menu previews and component limits, drop message chunking
//! - 1.0.0: Extracted from duplicate implementations in the command handlers

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;
/// Discord embed field value limit
pub const FIELD_LIMIT: usize = 1024;
/// Characters of a plugin description shown in the plugin picker
pub const MENU_PREVIEW_CHARS: usize = 45;

/// Truncate text to `limit` bytes on a UTF-8 boundary, adding an ellipsis if cut
pub fn truncate_to(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        // Find a safe UTF-8 boundary
        let mut end = limit.saturating_sub(3); // Room for "..."
        while !text.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Truncate text to fit embed limit, adding ellipsis if needed
pub fn truncate_for_embed(text: &str) -> String {
    truncate_to(text, EMBED_LIMIT)
}

/// Truncate text to fit an embed field value
pub fn truncate_for_field(text: &str) -> String {
    truncate_to(text, FIELD_LIMIT)
}

/// Short preview used as a select-menu option description.
///
/// Always ends in `...`, even when the text is shorter than the preview width,
/// so every entry in the picker reads the same way.
pub fn menu_preview(text: &str) -> String {
    let head: String = text.chars().take(MENU_PREVIEW_CHARS).collect();
    format!("{head}...")
}
