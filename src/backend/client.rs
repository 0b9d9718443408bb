use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::error::BackendError;
use super::types::{
    ApiFlavor, ClassificationAction, ConnectionStatus, DocId, DocumentDetail, InboxListing,
    Integration, NamedOption, OptionKind, QueueEntry,
};
use crate::config::ServerConfig;

const USER_AGENT: &str = concat!("inboxreview/", env!("CARGO_PKG_VERSION"));

/// Everything the review client asks of the document backend
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_inbox(&self) -> Result<Vec<QueueEntry>, BackendError>;
    async fn document_info(&self, id: &DocId) -> Result<DocumentDetail, BackendError>;
    async fn list_options(&self, kind: OptionKind) -> Result<Vec<NamedOption>, BackendError>;
    async fn classify(&self, action: &ClassificationAction) -> Result<(), BackendError>;
    async fn refresh_metadata(&self) -> Result<(), BackendError>;
    async fn connection_status(&self) -> Result<ConnectionStatus, BackendError>;
    async fn connect(&self, integration: Integration) -> Result<(), BackendError>;
    async fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, BackendError>;
}

/// Backend reached over HTTP with reqwest
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    api: ApiFlavor,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> Result<Self, BackendError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Trailing slash so relative thumbnail paths resolve under the base
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client,
            base: Url::parse(&base)?,
            api: config.api,
        })
    }

    pub fn api(&self) -> ApiFlavor {
        self.api
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read_body(response: Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::from_status(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!(%url, "GET");
        self.send_get(&url)
            .await
            .inspect_err(|e| warn!(%url, error = %e, "GET failed"))
    }

    async fn send_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let response = self.client.get(url).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET where only the status matters
    async fn get_ok(&self, path: &str) -> Result<(), BackendError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let result = match self.client.get(&url).send().await {
            Ok(response) => Self::read_body(response).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        result.inspect_err(|e| warn!(%url, error = %e, "GET failed"))
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<(), BackendError> {
        let url = self.url(path);
        debug!(%url, ?body, "POST");
        self.send_post(&url, body)
            .await
            .inspect_err(|e| warn!(%url, error = %e, "POST failed"))
    }

    async fn send_thumbnail(&self, url: &Url) -> Result<Vec<u8>, BackendError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), &body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn send_post(&self, url: &str, body: Option<Value>) -> Result<(), BackendError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Self::read_body(response).await.map(|_| ())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_inbox(&self) -> Result<Vec<QueueEntry>, BackendError> {
        let listing: InboxListing = self.get_json(self.api.inbox_path()).await?;
        Ok(listing.into_entries())
    }

    async fn document_info(&self, id: &DocId) -> Result<DocumentDetail, BackendError> {
        self.get_json(&self.api.document_path(id)).await
    }

    async fn list_options(&self, kind: OptionKind) -> Result<Vec<NamedOption>, BackendError> {
        self.get_json(kind.list_path()).await
    }

    async fn classify(&self, action: &ClassificationAction) -> Result<(), BackendError> {
        self.post(
            &action.endpoint(self.api),
            Some(action.request_body(self.api)),
        )
        .await
    }

    async fn refresh_metadata(&self) -> Result<(), BackendError> {
        self.get_ok("/refreshMetadata").await
    }

    async fn connection_status(&self) -> Result<ConnectionStatus, BackendError> {
        self.get_json("/status/check").await
    }

    async fn connect(&self, integration: Integration) -> Result<(), BackendError> {
        self.post(integration.connect_path(), None).await
    }

    async fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let url = self
            .base
            .join(url)
            .inspect_err(|e| warn!(%url, error = %e, "bad thumbnail url"))?;
        debug!(%url, "GET thumbnail");
        self.send_thumbnail(&url)
            .await
            .inspect_err(|e| warn!(%url, error = %e, "thumbnail fetch failed"))
    }
}
