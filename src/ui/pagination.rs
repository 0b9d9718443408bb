use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{List, ListItem, ListState},
};

use super::Pane;
use crate::backend::QueueEntry;
use crate::config::ThemeConfig;

pub fn render_pagination(
    f: &mut Frame,
    area: Rect,
    entries: &[QueueEntry],
    state: &mut ListState,
    theme: &ThemeConfig,
) {
    // Available width: area minus borders (2) minus highlight symbol (2)
    let avail_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = page_labels(entries)
        .into_iter()
        .map(|label| ListItem::new(Line::raw(truncate(&label, avail_width))))
        .collect();

    let title = format!("Inbox ({})", entries.len());
    let list = List::new(items)
        .block(Pane::new(&title, true, theme).block())
        .style(Style::default().fg(theme.fg()))
        .highlight_style(
            Style::default()
                .bg(theme.selected_bg())
                .fg(theme.primary())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, state);
}

/// One label per queue entry: 1-based position, plus the title when the backend sent one
pub fn page_labels(entries: &[QueueEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{:>3}  {}", i + 1, name),
            _ => format!("{:>3}", i + 1),
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if max < 4 {
        return s.chars().take(max).collect();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}
