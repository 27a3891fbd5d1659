//! UI rendering for the weft client.
//!
//! Two screens: the dashboard (hierarchical thread rows, pinned section on
//! top) and the conversation view (transcript, pending prompts, composer
//! with ghost text). Rendering is a pure function of [`App`] state; nothing
//! here mutates the store.

mod conversation;
mod dashboard;
mod theme;

pub use theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, COLOR_ERROR, COLOR_PINNED};

use ratatui::Frame;

use crate::app::{App, Screen};
use conversation::render_conversation;
use dashboard::render_dashboard;

/// Render the current screen.
pub fn draw(frame: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Dashboard => render_dashboard(frame, app),
        Screen::Conversation => render_conversation(frame, app),
    }
    app.needs_redraw = false;
}
