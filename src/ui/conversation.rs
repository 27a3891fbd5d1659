//! Conversation screen: transcript, pending prompts, composer.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::models::{ConversationItem, ItemContent};

use super::theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, COLOR_ERROR};

pub fn render_conversation(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let Some(key) = app.active_thread.clone() else {
        return;
    };

    let pending_approval = app.store.pending_approvals(&key).first().cloned();
    let pending_input = app.store.pending_inputs(&key).first().cloned();
    let prompt_height = if pending_approval.is_some() || pending_input.is_some() {
        4
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                  // Transcript
            Constraint::Length(prompt_height),   // Pending prompt, if any
            Constraint::Length(3),               // Composer
        ])
        .split(area);

    render_transcript(frame, chunks[0], app, &key);
    if let Some(request) = pending_approval {
        render_approval_prompt(frame, chunks[1], &request);
    } else if let Some(request) = pending_input {
        render_input_prompt(frame, chunks[1], &request);
    }
    render_composer(frame, chunks[2], app);
}

fn render_transcript(frame: &mut Frame, area: Rect, app: &App, key: &crate::models::ThreadKey) {
    let title = match app.store.custom_name(key) {
        Some(name) => format!(" {name} "),
        None => format!(" {key} "),
    };
    let processing = app.store.is_processing(key);

    let mut lines: Vec<Line> = Vec::new();
    for item in app.store.items(key) {
        push_item_lines(&mut lines, item);
    }
    if processing {
        lines.push(Line::from(Span::styled(
            "\u{2026} working",
            Style::default().fg(COLOR_DIM),
        )));
    }

    // Show the tail when the transcript outgrows the viewport.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

fn push_item_lines(lines: &mut Vec<Line<'static>>, item: &ConversationItem) {
    let label_style = match item.content {
        ItemContent::Error { .. } => Style::default().fg(COLOR_ERROR),
        _ => Style::default().fg(COLOR_ACCENT),
    };
    lines.push(Line::from(Span::styled(
        format!("{}:", item.content.role_label()),
        label_style.add_modifier(Modifier::BOLD),
    )));

    let body = match &item.content {
        ItemContent::Command {
            command, output, ..
        } => format!("$ {}\n{output}", command.join(" ")),
        other => other.text().unwrap_or_default().to_string(),
    };
    for line in body.lines() {
        lines.push(Line::from(Span::raw(line.to_string())));
    }
    lines.push(Line::default());
}

fn render_approval_prompt(frame: &mut Frame, area: Rect, request: &crate::models::ApprovalRequest) {
    let lines = vec![
        Line::from(Span::raw(request.description.clone())),
        Line::from(vec![
            Span::styled("^Y", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" approve  "),
            Span::styled("^A", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" always  "),
            Span::styled("^N", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" deny"),
        ]),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_ACCENT))
            .title(" approval requested "),
    );
    frame.render_widget(paragraph, area);
}

fn render_input_prompt(
    frame: &mut Frame,
    area: Rect,
    request: &crate::models::PendingUserInputRequest,
) {
    let mut lines = vec![Line::from(Span::raw(request.prompt.clone()))];
    if !request.options.is_empty() {
        lines.push(Line::from(Span::styled(
            request.options.join(" / "),
            Style::default().fg(COLOR_DIM),
        )));
    }
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_ACCENT))
            .title(" input requested "),
    );
    frame.render_widget(paragraph, area);
}

fn render_composer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(app.draft.clone())];

    // Ghost text renders dim after the (empty) draft, clipped to the line.
    if let Some(ghost) = app.prediction.ghost_text(app.draft.is_empty()) {
        let budget = area.width.saturating_sub(2) as usize;
        let ghost = clip_to_width(ghost, budget);
        spans.push(Span::styled(
            ghost,
            Style::default().fg(COLOR_DIM).add_modifier(Modifier::ITALIC),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(" message (tab accepts suggestion) "),
    );
    frame.render_widget(paragraph, area);
}

/// Truncate to at most `budget` terminal columns.
fn clip_to_width(text: &str, budget: usize) -> String {
    if text.width() <= budget {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
