//! Dashboard rendering: the hierarchical thread list.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::rows::ThreadRow;

use super::theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, COLOR_PINNED};

pub fn render_dashboard(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Thread list
            Constraint::Length(1), // Key hints / status
        ])
        .split(area);

    render_thread_list(frame, chunks[0], app);
    render_footer(frame, chunks[1], app);
}

fn render_thread_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let workspace_id = app.workspace_id.clone();
    let selected = app.dashboard_index;
    let collapsed = app.collapsed.clone();

    let rows = app.visible_rows();
    let pinned_count = rows.pinned.len();

    let mut items: Vec<ListItem> = Vec::with_capacity(pinned_count + rows.unpinned.len());
    for (i, row) in rows.pinned.iter().chain(rows.unpinned.iter()).enumerate() {
        let pinned = i < pinned_count;
        items.push(thread_row_line(row, pinned, i == selected, &collapsed));
    }

    let title = format!(" weft \u{2502} {workspace_id} ");
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(title),
    );
    frame.render_widget(list, area);
}

fn thread_row_line(
    row: &ThreadRow,
    pinned: bool,
    selected: bool,
    collapsed: &std::collections::BTreeSet<String>,
) -> ListItem<'static> {
    let indent = "  ".repeat(row.depth);
    let marker = if row.has_children {
        if collapsed.contains(&row.thread.id) {
            "\u{25b8} " // collapsed
        } else {
            "\u{25be} " // expanded
        }
    } else {
        "  "
    };
    let pin = if pinned { "\u{2605} " } else { "" };
    let name = row
        .thread
        .name
        .clone()
        .unwrap_or_else(|| row.thread.id.clone());

    let mut style = Style::default();
    if pinned {
        style = style.fg(COLOR_PINNED);
    }
    if row.thread.is_subagent {
        style = style.fg(COLOR_DIM);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    ListItem::new(Line::from(vec![
        Span::raw(indent),
        Span::raw(marker.to_string()),
        Span::styled(format!("{pin}{name}"), style),
    ]))
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.status_line {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(COLOR_DIM))),
        None => Line::from(vec![
            Span::styled("\u{21b5}", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" open  "),
            Span::styled("p", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" pin  "),
            Span::styled("c", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" collapse  "),
            Span::styled("h", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" hide  "),
            Span::styled("a", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" archive  "),
            Span::styled("s", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" subagents  "),
            Span::styled("q", Style::default().fg(COLOR_ACCENT)),
            Span::raw(" quit"),
        ]),
    };
    frame.render_widget(Paragraph::new(text), area);
}
