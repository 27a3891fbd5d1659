//! Color palette shared across screens.

use ratatui::style::Color;

pub const COLOR_BORDER: Color = Color::DarkGray;
pub const COLOR_ACCENT: Color = Color::Cyan;
pub const COLOR_DIM: Color = Color::DarkGray;
pub const COLOR_PINNED: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
