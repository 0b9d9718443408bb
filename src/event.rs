use image::DynamicImage;

use crate::backend::{
    BackendError, ClassificationAction, ConnectionStatus, DocId, DocumentDetail, Integration,
    NamedOption, OptionKind, QueueEntry,
};

/// Identifies one load request; responses carrying an older token are dropped
pub type Token = u64;

/// A backend request the app wants issued
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchQueue { token: Token },
    FetchDocument { token: Token, id: DocId },
    FetchThumbnail { token: Token, url: String },
    FetchOptions {
        token: Token,
        kind: OptionKind,
        doc_id: DocId,
    },
    Submit(ClassificationAction),
    RefreshMetadata,
    Connect(Integration),
}

/// Outcome of a backend request, fed back into `App::update`
#[derive(Debug)]
pub enum Msg {
    QueueLoaded {
        token: Token,
        result: Result<Vec<QueueEntry>, BackendError>,
    },
    DocumentLoaded {
        token: Token,
        id: DocId,
        result: Result<DocumentDetail, BackendError>,
    },
    ThumbnailLoaded {
        token: Token,
        result: Result<DynamicImage, BackendError>,
    },
    OptionsLoaded {
        token: Token,
        kind: OptionKind,
        doc_id: DocId,
        result: Result<Vec<NamedOption>, BackendError>,
    },
    Submitted {
        action: ClassificationAction,
        result: Result<(), BackendError>,
    },
    MetadataRefreshed(Result<(), BackendError>),
    Connected {
        integration: Integration,
        result: Result<(), BackendError>,
    },
    StatusPolled(Result<ConnectionStatus, BackendError>),
}
