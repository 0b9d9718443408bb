use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{Backend, BackendError};
use crate::event::{Command, Msg};

/// Run one command against the backend and wrap the outcome
pub async fn execute(backend: &dyn Backend, command: Command) -> Msg {
    match command {
        Command::FetchQueue { token } => Msg::QueueLoaded {
            token,
            result: backend.list_inbox().await,
        },
        Command::FetchDocument { token, id } => {
            let result = backend.document_info(&id).await;
            Msg::DocumentLoaded { token, id, result }
        }
        Command::FetchThumbnail { token, url } => {
            let result = match backend.fetch_thumbnail(&url).await {
                Ok(bytes) => decode_thumbnail(bytes).await,
                Err(e) => Err(e),
            };
            Msg::ThumbnailLoaded { token, result }
        }
        Command::FetchOptions {
            token,
            kind,
            doc_id,
        } => Msg::OptionsLoaded {
            token,
            kind,
            doc_id,
            result: backend.list_options(kind).await,
        },
        Command::Submit(action) => {
            let result = backend.classify(&action).await;
            Msg::Submitted { action, result }
        }
        Command::RefreshMetadata => Msg::MetadataRefreshed(backend.refresh_metadata().await),
        Command::Connect(integration) => Msg::Connected {
            integration,
            result: backend.connect(integration).await,
        },
    }
}

async fn decode_thumbnail(bytes: Vec<u8>) -> Result<DynamicImage, BackendError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| BackendError::Image(e.to_string()))?
        .map_err(|e| BackendError::Image(e.to_string()))
}

/// Runs commands in the background and reports results on a channel
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    tx: UnboundedSender<Msg>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>, tx: UnboundedSender<Msg>) -> Self {
        Self { backend, tx }
    }

    /// Spawn one task per command. Must be called inside a tokio runtime.
    pub fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            debug!(?command, "dispatch");
            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let msg = execute(backend.as_ref(), command).await;
                // Receiver gone means the app is shutting down
                let _ = tx.send(msg);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Call, MockBackend, png_bytes};
    use crate::backend::{Classification, ClassificationAction, DocId, DocumentDetail};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_execute_fetch_document() {
        let backend = MockBackend::new().with_detail(
            7,
            DocumentDetail {
                title: "Letter".to_string(),
                ..Default::default()
            },
        );
        let msg = execute(
            &backend,
            Command::FetchDocument {
                token: 3,
                id: DocId::from(7),
            },
        )
        .await;
        match msg {
            Msg::DocumentLoaded { token, id, result } => {
                assert_eq!(token, 3);
                assert_eq!(id, DocId::from(7));
                assert_eq!(result.unwrap().title, "Letter");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_decodes_thumbnail() {
        let backend = MockBackend::new().with_thumbnail(png_bytes());
        let msg = execute(
            &backend,
            Command::FetchThumbnail {
                token: 1,
                url: "/doc/get_thumbnail/1".to_string(),
            },
        )
        .await;
        match msg {
            Msg::ThumbnailLoaded { result: Ok(img), .. } => {
                assert_eq!((img.width(), img.height()), (4, 6));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_garbage_thumbnail() {
        let backend = MockBackend::new().with_thumbnail(b"not an image".to_vec());
        let msg = execute(
            &backend,
            Command::FetchThumbnail {
                token: 1,
                url: "/thumb".to_string(),
            },
        )
        .await;
        assert!(matches!(
            msg,
            Msg::ThumbnailLoaded {
                result: Err(BackendError::Image(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_dispatcher_reports_each_command() {
        let backend = Arc::new(MockBackend::new().with_queue(&[1]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(backend.clone(), tx);

        let action = ClassificationAction::new(
            DocId::from(1),
            Classification::Tags(vec!["done".to_string()]),
        );
        dispatcher.dispatch(vec![
            Command::FetchQueue { token: 1 },
            Command::Submit(action.clone()),
        ]);

        let mut queue_seen = false;
        let mut submit_seen = false;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                Msg::QueueLoaded { result, .. } => queue_seen = result.is_ok(),
                Msg::Submitted { result, .. } => submit_seen = result.is_ok(),
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert!(queue_seen && submit_seen);
        assert!(backend.calls().contains(&Call::Classify(action)));
    }
}
