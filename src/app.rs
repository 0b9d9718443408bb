use image::DynamicImage;
use ratatui::{layout::Rect, widgets::ListState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::{
    Classification, ClassificationAction, ConnectionStatus, DocId, DocumentDetail, Integration,
    NamedOption, OptionKind, QueueEntry,
};
use crate::config::Config;
use crate::event::{Command, Msg, Token};

pub const EMPTY_INBOX_TEXT: &str = "No Documents to process";
pub const THUMBNAIL_MISSING_TEXT: &str = "Thumbnail not available.";
pub const THUMBNAIL_FAILED_TEXT: &str = "Failed to load image.";

/// What the preview pane shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    /// Inbox is empty
    Empty,
    Loading,
    /// Thumbnail decoded and ready to draw
    Ready,
    Failed,
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    pub shown_at: Instant,
}

/// Choice menu for one selector, bound to the document it was opened for
#[derive(Debug, Clone)]
pub struct OptionMenu {
    pub kind: OptionKind,
    pub doc_id: DocId,
    pub options: Vec<NamedOption>,
    pub loading: bool,
    pub state: ListState,
}

impl OptionMenu {
    fn new(kind: OptionKind, doc_id: DocId) -> Self {
        Self {
            kind,
            doc_id,
            options: Vec::new(),
            loading: true,
            state: ListState::default(),
        }
    }

    pub fn selected(&self) -> Option<&NamedOption> {
        self.state.selected().and_then(|i| self.options.get(i))
    }
}

/// Latest token per resource. Anything else in flight is stale.
#[derive(Debug, Default)]
struct RequestTokens {
    counter: Token,
    queue: Token,
    document: Token,
    thumbnail: Token,
    options: Token,
}

impl RequestTokens {
    fn next(&mut self) -> Token {
        self.counter += 1;
        self.counter
    }
}

pub struct App {
    pub config: Arc<Config>,
    pub queue: Vec<QueueEntry>,
    /// Cursor over the pagination controls
    pub pagination: ListState,
    /// Document whose detail is on screen; `None` when the inbox is empty
    pub selected: Option<DocId>,
    pub detail: Option<DocumentDetail>,
    pub preview: Preview,
    /// Cap for the thumbnail height, derived from the viewport
    pub preview_max_height: u16,
    pub menu: Option<OptionMenu>,
    /// `None` until the first status check returns
    pub connection: Option<ConnectionStatus>,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    /// Set when a detail load failed and there is no earlier document to fall back on
    pub load_failed: bool,
    // Mouse tracking
    pub pagination_area: Rect,
    selector_labels: HashMap<OptionKind, String>,
    pending_thumbnail: Option<DynamicImage>,
    viewport_height: u16,
    tokens: RequestTokens,
}

impl App {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            queue: Vec::new(),
            pagination: ListState::default(),
            selected: None,
            detail: None,
            preview: Preview::Loading,
            preview_max_height: 0,
            menu: None,
            connection: None,
            toast: None,
            should_quit: false,
            load_failed: false,
            pagination_area: Rect::default(),
            selector_labels: HashMap::new(),
            pending_thumbnail: None,
            viewport_height: 0,
            tokens: RequestTokens::default(),
        }
    }

    /// Initial load: fetch the queue, which then loads the first document
    pub fn start(&mut self) -> Vec<Command> {
        self.load_inbox_queue()
    }

    pub fn load_inbox_queue(&mut self) -> Vec<Command> {
        let token = self.tokens.next();
        self.tokens.queue = token;
        vec![Command::FetchQueue { token }]
    }

    /// Show a document, or the empty state for `None`
    pub fn load_document(&mut self, id: Option<DocId>) -> Vec<Command> {
        self.menu = None;
        // Anything still loading belongs to the previous document
        self.tokens.thumbnail = self.tokens.next();

        match id {
            None => {
                self.tokens.document = self.tokens.next();
                self.selected = None;
                self.detail = None;
                self.selector_labels.clear();
                self.pending_thumbnail = None;
                self.preview = Preview::Empty;
                self.load_failed = false;
                Vec::new()
            }
            Some(id) => {
                let token = self.tokens.next();
                self.tokens.document = token;
                vec![Command::FetchDocument { token, id }]
            }
        }
    }

    pub fn select_page(&mut self, index: usize) -> Vec<Command> {
        let Some(entry) = self.queue.get(index) else {
            return Vec::new();
        };
        let id = entry.id.clone();
        self.pagination.select(Some(index));
        self.load_document(Some(id))
    }

    pub fn next_page(&mut self) -> Vec<Command> {
        if self.queue.is_empty() {
            return Vec::new();
        }
        let max = self.queue.len() - 1;
        let i = match self.pagination.selected() {
            Some(i) => (i + 1).min(max),
            None => 0,
        };
        if Some(i) == self.pagination.selected() {
            return Vec::new();
        }
        self.select_page(i)
    }

    pub fn previous_page(&mut self) -> Vec<Command> {
        if self.queue.is_empty() {
            return Vec::new();
        }
        let i = match self.pagination.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        if Some(i) == self.pagination.selected() {
            return Vec::new();
        }
        self.select_page(i)
    }

    /// Reload whatever is under the pagination cursor
    pub fn open_current_page(&mut self) -> Vec<Command> {
        match self.pagination.selected() {
            Some(i) => self.select_page(i),
            None => Vec::new(),
        }
    }

    /// Apply the tag set of a quick-action control to the shown document
    pub fn quick_tag(&mut self, slot: usize) -> Vec<Command> {
        let Some(quick) = self.config.quick_tags.get(slot) else {
            return Vec::new();
        };
        let Some(doc_id) = self.selected.clone() else {
            debug!(slot, "quick tag ignored, no document shown");
            return Vec::new();
        };
        let action = ClassificationAction::new(doc_id, Classification::Tags(quick.tag_list()));
        self.submit(action)
    }

    /// Quick-action slot bound to a key, if any
    pub fn quick_tag_slot(&self, key: char) -> Option<usize> {
        self.config.quick_tags.iter().position(|q| q.key == key)
    }

    pub fn open_selector(&mut self, kind: OptionKind) -> Vec<Command> {
        let Some(doc_id) = self.selected.clone() else {
            return Vec::new();
        };
        let token = self.tokens.next();
        self.tokens.options = token;
        self.menu = Some(OptionMenu::new(kind, doc_id.clone()));
        vec![Command::FetchOptions {
            token,
            kind,
            doc_id,
        }]
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    pub fn menu_next(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            if menu.options.is_empty() {
                return;
            }
            let max = menu.options.len() - 1;
            let i = match menu.state.selected() {
                Some(i) => (i + 1).min(max),
                None => 0,
            };
            menu.state.select(Some(i));
        }
    }

    pub fn menu_previous(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            if menu.options.is_empty() {
                return;
            }
            let i = match menu.state.selected() {
                Some(i) => i.saturating_sub(1),
                None => 0,
            };
            menu.state.select(Some(i));
        }
    }

    /// Commit the highlighted option for the document the menu was opened on
    pub fn choose_option(&mut self) -> Vec<Command> {
        let Some(menu) = self.menu.take() else {
            return Vec::new();
        };
        let Some(option) = menu.selected().cloned() else {
            return Vec::new();
        };
        self.selector_labels.insert(menu.kind, option.name.clone());
        let action = ClassificationAction::new(menu.doc_id, menu.kind.classify(option.name));
        self.submit(action)
    }

    /// Label shown on a selector control
    pub fn selector_label(&self, kind: OptionKind) -> &str {
        self.selector_labels
            .get(&kind)
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .unwrap_or(kind.label())
    }

    pub fn submit(&mut self, action: ClassificationAction) -> Vec<Command> {
        if !action.is_submittable() {
            warn!(?action, "not submitting classification without a document or value");
            return Vec::new();
        }
        info!(
            doc = %action.doc_id,
            field = action.classification.field_name(),
            "submitting classification"
        );
        vec![Command::Submit(action)]
    }

    pub fn refresh_metadata(&mut self) -> Vec<Command> {
        vec![Command::RefreshMetadata]
    }

    pub fn connect(&mut self, integration: Integration) -> Vec<Command> {
        vec![Command::Connect(integration)]
    }

    /// Fold a backend response into the view state
    pub fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::QueueLoaded { token, result } => {
                if token != self.tokens.queue {
                    debug!(token, "dropping stale inbox response");
                    return Vec::new();
                }
                match result {
                    Ok(entries) => self.apply_queue(entries),
                    Err(e) => {
                        self.notify(ToastKind::Error, format!("Error loading inbox: {e}"));
                        Vec::new()
                    }
                }
            }
            Msg::DocumentLoaded { token, id, result } => {
                if token != self.tokens.document {
                    debug!(token, doc = %id, "dropping stale document response");
                    return Vec::new();
                }
                match result {
                    Ok(detail) => self.apply_document(id, detail),
                    Err(e) => {
                        // Cursor goes back to whatever is still on screen
                        self.sync_cursor();
                        if self.detail.is_none() {
                            self.load_failed = true;
                            self.preview = Preview::NotAvailable;
                        }
                        self.notify(ToastKind::Error, format!("Error loading document {id}: {e}"));
                        Vec::new()
                    }
                }
            }
            Msg::ThumbnailLoaded { token, result } => {
                if token != self.tokens.thumbnail {
                    debug!(token, "dropping stale thumbnail");
                    return Vec::new();
                }
                match result {
                    Ok(img) => {
                        self.pending_thumbnail = Some(img);
                        self.preview = Preview::Ready;
                        self.recompute_preview_height();
                    }
                    Err(e) => {
                        warn!(error = %e, "thumbnail failed to load");
                        self.preview = Preview::Failed;
                    }
                }
                Vec::new()
            }
            Msg::OptionsLoaded {
                token,
                kind,
                doc_id,
                result,
            } => {
                if token != self.tokens.options {
                    debug!(token, "dropping stale option list");
                    return Vec::new();
                }
                match result {
                    Ok(options) => {
                        if let Some(menu) = self
                            .menu
                            .as_mut()
                            .filter(|m| m.kind == kind && m.doc_id == doc_id)
                        {
                            menu.state
                                .select(if options.is_empty() { None } else { Some(0) });
                            menu.options = options;
                            menu.loading = false;
                        }
                    }
                    Err(e) => {
                        // Option lists fail quietly
                        warn!(kind = kind.label(), error = %e, "could not load options");
                        self.menu = None;
                    }
                }
                Vec::new()
            }
            Msg::Submitted { action, result } => match result {
                Ok(()) => {
                    self.notify(
                        ToastKind::Success,
                        format!(
                            "Updated {} for document {}",
                            action.classification.field_name(),
                            action.doc_id
                        ),
                    );
                    self.load_inbox_queue()
                }
                Err(e) => {
                    self.notify(
                        ToastKind::Error,
                        format!(
                            "Could not update {} for document {}: {e}",
                            action.classification.field_name(),
                            action.doc_id
                        ),
                    );
                    Vec::new()
                }
            },
            Msg::MetadataRefreshed(result) => {
                match result {
                    Ok(()) => self.notify(ToastKind::Success, "Metadata refreshed".to_string()),
                    Err(e) => {
                        self.notify(ToastKind::Error, format!("Failed to refresh metadata: {e}"))
                    }
                }
                Vec::new()
            }
            Msg::Connected {
                integration,
                result,
            } => {
                match result {
                    Ok(()) => self.notify(
                        ToastKind::Success,
                        format!("Connected to {}", integration.label()),
                    ),
                    Err(e) => self.notify(
                        ToastKind::Error,
                        format!("Could not connect to {}: {e}", integration.label()),
                    ),
                }
                Vec::new()
            }
            Msg::StatusPolled(result) => {
                match result {
                    Ok(status) => self.connection = Some(status),
                    Err(e) => warn!(error = %e, "status check failed"),
                }
                Vec::new()
            }
        }
    }

    fn apply_queue(&mut self, entries: Vec<QueueEntry>) -> Vec<Command> {
        info!(count = entries.len(), "inbox loaded");
        let first = entries.first().map(|e| e.id.clone());
        self.queue = entries;
        self.pagination = ListState::default();
        if first.is_some() {
            self.pagination.select(Some(0));
        }
        self.load_document(first)
    }

    fn apply_document(&mut self, id: DocId, detail: DocumentDetail) -> Vec<Command> {
        self.selector_labels = OptionKind::ALL
            .iter()
            .map(|&kind| (kind, detail.value_of(kind).to_string()))
            .collect();

        self.pending_thumbnail = None;
        let commands = match detail.thumbnail() {
            Some(url) => {
                let token = self.tokens.next();
                self.tokens.thumbnail = token;
                self.preview = Preview::Loading;
                vec![Command::FetchThumbnail {
                    token,
                    url: url.to_string(),
                }]
            }
            None => {
                self.preview = Preview::NotAvailable;
                Vec::new()
            }
        };

        self.selected = Some(id);
        self.detail = Some(detail);
        self.load_failed = false;
        commands
    }

    /// Point the pagination cursor at the shown document, or nowhere
    fn sync_cursor(&mut self) {
        let index = self
            .selected
            .as_ref()
            .and_then(|id| self.queue.iter().position(|e| &e.id == id));
        self.pagination.select(index);
    }

    /// Newly decoded thumbnail, handed over once for protocol setup
    pub fn take_thumbnail(&mut self) -> Option<DynamicImage> {
        self.pending_thumbnail.take()
    }

    /// Track terminal height; the preview cap follows it
    pub fn set_viewport_height(&mut self, rows: u16) {
        self.viewport_height = rows;
        self.recompute_preview_height();
    }

    fn recompute_preview_height(&mut self) {
        self.preview_max_height = self
            .viewport_height
            .saturating_sub(self.config.layout.navbar_rows);
    }

    pub fn notify(&mut self, kind: ToastKind, text: String) {
        match kind {
            ToastKind::Error => warn!("{text}"),
            _ => info!("{text}"),
        }
        self.toast = Some(Toast {
            kind,
            text,
            shown_at: Instant::now(),
        });
    }

    /// Drop the toast once it has been visible long enough
    pub fn expire_toast(&mut self) {
        let ttl = Duration::from_secs(self.config.ui.toast_secs);
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.shown_at.elapsed() >= ttl)
        {
            self.toast = None;
        }
    }

    /// Update pane areas (called during render)
    pub fn set_pagination_area(&mut self, area: Rect) {
        self.pagination_area = area;
    }

    /// Handle click at (x, y) on the pagination pane
    pub fn handle_click(&mut self, x: u16, y: u16) -> Vec<Command> {
        let area = self.pagination_area;
        if x < area.x || x >= area.x + area.width || y < area.y || y >= area.y + area.height {
            return Vec::new();
        }
        // Border rows
        if y == area.y || y == area.y + area.height - 1 {
            return Vec::new();
        }
        // +1 for the top border
        let row = y.saturating_sub(area.y + 1) as usize + self.pagination.offset();
        self.select_page(row)
    }
}
