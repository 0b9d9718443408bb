use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::Pane;
use crate::app::App;
use crate::backend::OptionKind;
use crate::config::{QuickTagConfig, ThemeConfig};

pub const LOAD_FAILED_TEXT: &str = "Could not load document. Press j/k to pick one or r to reload.";

/// Document fields, tag badges, and the classification controls
pub fn render_details(f: &mut Frame, area: Rect, app: &App, theme: &ThemeConfig) {
    let label_style = Style::default().fg(theme.fg_muted());
    let value_style = Style::default().fg(theme.fg());

    let mut lines = Vec::new();

    match &app.detail {
        Some(detail) => {
            lines.push(Line::from(vec![
                Span::styled("Title: ", label_style),
                Span::styled(
                    detail.title.as_str(),
                    value_style.add_modifier(Modifier::BOLD),
                ),
            ]));
            for (kind, key) in [
                (OptionKind::Correspondent, 'c'),
                (OptionKind::DocumentType, 't'),
                (OptionKind::StoragePath, 'p'),
            ] {
                lines.push(selector_line(kind, key, app.selector_label(kind), theme));
            }

            let mut tags = vec![Span::styled("Tags: ", label_style)];
            tags.extend(tag_badges(&detail.tags, theme));
            lines.push(Line::from(tags));
        }
        None if app.load_failed => {
            lines.push(Line::styled(
                LOAD_FAILED_TEXT,
                Style::default().fg(theme.error()),
            ));
        }
        None if app.selected.is_none() && !app.queue.is_empty() => {
            lines.push(Line::styled("Loading...", label_style));
        }
        None => {}
    }

    if app.selected.is_some() {
        lines.push(Line::raw(""));
        lines.push(Line::from(quick_tag_spans(&app.config.quick_tags, theme)));
    }

    let title = app
        .selected
        .as_ref()
        .map(|id| format!("Document {id}"))
        .unwrap_or_else(|| "Document".to_string());
    let paragraph = Paragraph::new(lines)
        .block(Pane::new(&title, false, theme).block())
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn selector_line<'a>(kind: OptionKind, key: char, label: &'a str, theme: &ThemeConfig) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", kind.label()),
            Style::default().fg(theme.fg_muted()),
        ),
        Span::styled(label, Style::default().fg(theme.fg())),
        Span::styled(format!("  [{key}]"), Style::default().fg(theme.primary())),
    ])
}

/// One badge per tag, in the order received. Tag text is shown as-is.
pub fn tag_badges<'a>(tags: &'a [String], theme: &ThemeConfig) -> Vec<Span<'a>> {
    let badge = Style::default().bg(theme.badge_bg()).fg(theme.badge_fg());
    let mut spans = Vec::with_capacity(tags.len() * 2);
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!(" {tag} "), badge));
    }
    spans
}

fn quick_tag_spans<'a>(quick_tags: &'a [QuickTagConfig], theme: &ThemeConfig) -> Vec<Span<'a>> {
    let key_style = Style::default().fg(theme.primary());
    let text_style = Style::default().fg(theme.fg_subtle());
    quick_tags
        .iter()
        .flat_map(|q| {
            [
                Span::styled(q.key.to_string(), key_style),
                Span::styled(format!(" {}  ", q.label), text_style),
            ]
        })
        .collect()
}
