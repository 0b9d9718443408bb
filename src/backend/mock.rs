//! Scripted in-memory backend for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    Backend, BackendError, ClassificationAction, ConnectionStatus, DocId, DocumentDetail,
    Integration, NamedOption, OptionKind, QueueEntry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListInbox,
    DocumentInfo(DocId),
    ListOptions(OptionKind),
    Classify(ClassificationAction),
    RefreshMetadata,
    ConnectionStatus,
    Connect(Integration),
    FetchThumbnail(String),
}

#[derive(Default)]
pub struct MockBackend {
    queue: Mutex<Option<Vec<QueueEntry>>>,
    details: Mutex<HashMap<DocId, DocumentDetail>>,
    options: Mutex<HashMap<OptionKind, Vec<NamedOption>>>,
    status: Mutex<Option<ConnectionStatus>>,
    thumbnail: Mutex<Option<Vec<u8>>>,
    fail_writes: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(self, ids: &[i64]) -> Self {
        self.set_queue(ids);
        self
    }

    pub fn set_queue(&self, ids: &[i64]) {
        let entries = ids
            .iter()
            .map(|&id| QueueEntry {
                id: DocId::from(id),
                name: None,
            })
            .collect();
        *self.queue.lock().unwrap() = Some(entries);
    }

    pub fn with_detail(self, id: i64, detail: DocumentDetail) -> Self {
        self.details.lock().unwrap().insert(DocId::from(id), detail);
        self
    }

    pub fn with_options(self, kind: OptionKind, names: &[&str]) -> Self {
        let options = names
            .iter()
            .map(|name| NamedOption {
                name: name.to_string(),
                id: None,
            })
            .collect();
        self.options.lock().unwrap().insert(kind, options);
        self
    }

    pub fn with_status(self, status: ConnectionStatus) -> Self {
        *self.status.lock().unwrap() = Some(status);
        self
    }

    pub fn with_thumbnail(self, bytes: Vec<u8>) -> Self {
        *self.thumbnail.lock().unwrap() = Some(bytes);
        self
    }

    pub fn failing_writes(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> Result<(), BackendError> {
        if *self.fail_writes.lock().unwrap() {
            Err(BackendError::Status {
                status: 500,
                message: Some("write rejected".to_string()),
            })
        } else {
            Ok(())
        }
    }
}

fn not_found() -> BackendError {
    BackendError::Status {
        status: 404,
        message: None,
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_inbox(&self) -> Result<Vec<QueueEntry>, BackendError> {
        self.record(Call::ListInbox);
        self.queue.lock().unwrap().clone().ok_or_else(|| BackendError::Status {
            status: 503,
            message: None,
        })
    }

    async fn document_info(&self, id: &DocId) -> Result<DocumentDetail, BackendError> {
        self.record(Call::DocumentInfo(id.clone()));
        self.details.lock().unwrap().get(id).cloned().ok_or_else(not_found)
    }

    async fn list_options(&self, kind: OptionKind) -> Result<Vec<NamedOption>, BackendError> {
        self.record(Call::ListOptions(kind));
        self.options.lock().unwrap().get(&kind).cloned().ok_or_else(not_found)
    }

    async fn classify(&self, action: &ClassificationAction) -> Result<(), BackendError> {
        self.record(Call::Classify(action.clone()));
        self.write_result()
    }

    async fn refresh_metadata(&self) -> Result<(), BackendError> {
        self.record(Call::RefreshMetadata);
        self.write_result()
    }

    async fn connection_status(&self) -> Result<ConnectionStatus, BackendError> {
        self.record(Call::ConnectionStatus);
        self.status.lock().unwrap().ok_or_else(|| BackendError::Status {
            status: 503,
            message: None,
        })
    }

    async fn connect(&self, integration: Integration) -> Result<(), BackendError> {
        self.record(Call::Connect(integration));
        self.write_result()
    }

    async fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        self.record(Call::FetchThumbnail(url.to_string()));
        self.thumbnail.lock().unwrap().clone().ok_or_else(not_found)
    }
}

/// Tiny valid PNG for thumbnail tests
pub fn png_bytes() -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    let img = DynamicImage::ImageRgb8(RgbImage::new(4, 6));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
