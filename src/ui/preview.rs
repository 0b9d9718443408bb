use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
};
use ratatui_image::{Resize, StatefulImage, protocol::StatefulProtocol};

use super::Pane;
use crate::app::{EMPTY_INBOX_TEXT, Preview, THUMBNAIL_FAILED_TEXT, THUMBNAIL_MISSING_TEXT};
use crate::config::ThemeConfig;

const NO_GRAPHICS_TEXT: &str = "Thumbnail loaded, but this terminal cannot display images.";

/// Thumbnail pane. `image` is the protocol state for the current thumbnail, if any.
pub fn render_preview(
    f: &mut Frame,
    area: Rect,
    preview: Preview,
    image: Option<&mut StatefulProtocol>,
    max_height: u16,
    theme: &ThemeConfig,
) {
    let block = Pane::new("Preview", false, theme).block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    if preview == Preview::Ready {
        if let Some(protocol) = image {
            let mut target = inner;
            if max_height > 0 {
                target.height = target.height.min(max_height);
            }
            f.render_stateful_widget(
                StatefulImage::default().resize(Resize::Fit(None)),
                target,
                protocol,
            );
            return;
        }
    }

    let text = placeholder(preview).unwrap_or(NO_GRAPHICS_TEXT);
    let style = match preview {
        Preview::Failed => Style::default().fg(theme.error()),
        _ => Style::default().fg(theme.fg_muted()),
    };
    let paragraph = Paragraph::new(Line::styled(text, style)).alignment(Alignment::Center);
    f.render_widget(paragraph, inner);
}

/// Text shown in place of an image
pub fn placeholder(preview: Preview) -> Option<&'static str> {
    match preview {
        Preview::Empty => Some(EMPTY_INBOX_TEXT),
        Preview::Loading => Some("Loading..."),
        Preview::Failed => Some(THUMBNAIL_FAILED_TEXT),
        Preview::NotAvailable => Some(THUMBNAIL_MISSING_TEXT),
        Preview::Ready => None,
    }
}
