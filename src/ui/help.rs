use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{Toast, ToastKind};
use crate::backend::ConnectionStatus;
use crate::config::ThemeConfig;

pub fn render_help(
    f: &mut Frame,
    area: Rect,
    menu_open: bool,
    toast: Option<&Toast>,
    connection: Option<ConnectionStatus>,
    theme: &ThemeConfig,
) {
    let key_style = Style::default().fg(theme.primary());
    let text_style = Style::default().fg(theme.fg_subtle());

    let mut spans = if menu_open {
        vec![
            Span::styled("j/k", key_style),
            Span::styled(" nav  ", text_style),
            Span::styled("Enter", key_style),
            Span::styled(" choose  ", text_style),
            Span::styled("Esc", key_style),
            Span::styled(" cancel", text_style),
        ]
    } else {
        vec![
            Span::styled("j/k", key_style),
            Span::styled(" page  ", text_style),
            Span::styled("c/t/p", key_style),
            Span::styled(" classify  ", text_style),
            Span::styled("r", key_style),
            Span::styled(" reload  ", text_style),
            Span::styled("R", key_style),
            Span::styled(" metadata  ", text_style),
            Span::styled("A/P", key_style),
            Span::styled(" connect  ", text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ]
    };

    let separator = || Span::styled("  │  ", Style::default().fg(theme.border()));

    spans.push(separator());
    spans.extend(connection_spans(connection, theme));

    // Add toast if present
    if let Some(toast) = toast {
        let color = match toast.kind {
            ToastKind::Success => theme.success(),
            ToastKind::Error => theme.error(),
            ToastKind::Info => theme.info(),
        };
        spans.push(separator());
        spans.push(Span::styled(toast.text.as_str(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg_panel()));

    f.render_widget(paragraph, area);
}

/// AI and Paperless indicators; unknown until the first status check
pub fn connection_spans(
    connection: Option<ConnectionStatus>,
    theme: &ThemeConfig,
) -> Vec<Span<'static>> {
    let Some(status) = connection else {
        return vec![Span::styled(
            "Checking connections...",
            Style::default().fg(theme.fg_muted()),
        )];
    };

    let indicator = |name: &str, connected: bool| {
        let (text, color) = if connected {
            (format!("{name} connected"), theme.success())
        } else {
            (format!("{name} not connected"), theme.error())
        };
        Span::styled(text, Style::default().fg(color))
    };

    vec![
        indicator("AI", status.ai_connected),
        Span::raw("  "),
        indicator("Paperless", status.paperless_connected),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_connection_indicators() {
        let theme = ThemeConfig::default();
        let spans = connection_spans(
            Some(ConnectionStatus {
                ai_connected: true,
                paperless_connected: false,
            }),
            &theme,
        );
        assert_eq!(text(&spans), "AI connected  Paperless not connected");
        assert_eq!(spans[0].style.fg, Some(theme.success()));
        assert_eq!(spans[2].style.fg, Some(theme.error()));
    }

    #[test]
    fn test_unknown_connection_before_first_poll() {
        let spans = connection_spans(None, &ThemeConfig::default());
        assert_eq!(text(&spans), "Checking connections...");
    }
}
