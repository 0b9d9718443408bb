use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Clear, List, ListItem, Paragraph},
};

use super::Modal;
use crate::app::OptionMenu;
use crate::config::ThemeConfig;

/// Centered choice list for a selector
pub fn render_menu(f: &mut Frame, area: Rect, menu: &mut OptionMenu, theme: &ThemeConfig) {
    let title = format!(" {} ", menu.kind.label());
    let modal = Modal::new(&title, theme);
    // Borders plus one row per option, capped by the modal helper
    let height = menu.options.len().max(1) as u16 + 2;
    let modal_area = modal.centered_rect(40, height, area);

    f.render_widget(Clear, modal_area);
    let block = modal.block();

    if menu.loading || menu.options.is_empty() {
        let text = if menu.loading {
            "Loading..."
        } else {
            "No options"
        };
        let paragraph = Paragraph::new(Line::styled(text, Style::default().fg(theme.fg_muted())))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, modal_area);
        return;
    }

    let items: Vec<ListItem> = menu
        .options
        .iter()
        .map(|o| ListItem::new(Line::raw(o.name.as_str())))
        .collect();
    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(theme.fg()))
        .highlight_style(
            Style::default()
                .bg(theme.selected_bg())
                .fg(theme.primary())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, modal_area, &mut menu.state);
}
