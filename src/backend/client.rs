//! Hosted backend client.
//!
//! # Responsibilities
//! - Hold the backend URL, anon key, auth session and transport
//! - Build table requests (select, insert, update, delete)
//! - Turn non-success responses into `BackendError`s
//! - Decode rows into typed records
//!
//! The client is constructed once at process start and cloned into every
//! consumer; clones share the same transport and session.

use std::sync::Arc;

use reqwest::header::{HeaderName, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use url::Url;
use uuid::Uuid;

use crate::backend::auth::Session;
use crate::backend::errors::{BackendError, ClientError};
use crate::backend::query::Query;
use crate::backend::records::Record;
use crate::config::schema::{AppConfig, StorageConfig};
use crate::resilience::{RetrySettings, RetryingTransport};
use crate::transport::{HttpTransport, RequestDescriptor, Transport, TransportResponse};

pub(crate) const APIKEY: HeaderName = HeaderName::from_static("apikey");
const PREFER: HeaderName = HeaderName::from_static("prefer");
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Transport used by clients built from configuration.
pub type DefaultTransport = RetryingTransport<HttpTransport>;

pub(crate) struct ClientInner<T> {
    pub(crate) transport: T,
    pub(crate) base_url: Url,
    pub(crate) anon_key: String,
    pub(crate) session: RwLock<Option<Session>>,
    /// Serializes refresh grants so one expiring session is exchanged once.
    pub(crate) refresh_lock: Mutex<()>,
    pub(crate) uploads: reqwest::Client,
    pub(crate) storage: StorageConfig,
}

/// Client for the hosted backend's REST, storage and auth APIs.
pub struct BackendClient<T = DefaultTransport> {
    pub(crate) inner: Arc<ClientInner<T>>,
}

impl<T> Clone for BackendClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for BackendClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish()
    }
}

impl BackendClient<DefaultTransport> {
    /// Build the production client: reqwest transport wrapped in the retry layer.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::new();
        let transport = RetryingTransport::new(
            HttpTransport::with_client(http.clone()),
            RetrySettings::from(&config.retries),
        );

        tracing::info!(
            url = %config.backend.url,
            max_retries = config.retries.max_retries,
            timeout_ms = config.retries.timeout_ms,
            "Backend client initialized"
        );

        Self::with_options(
            transport,
            &config.backend.url,
            &config.backend.anon_key,
            http,
            config.storage.clone(),
        )
    }
}

impl<T> BackendClient<T> {
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }
}

impl<T: Transport> BackendClient<T> {
    pub fn new(transport: T, base_url: &str, anon_key: &str) -> Result<Self, ClientError> {
        Self::with_options(transport, base_url, anon_key, reqwest::Client::new(), StorageConfig::default())
    }

    /// Like `new`, with an explicit reqwest client and settings for storage uploads.
    pub fn with_options(
        transport: T,
        base_url: &str,
        anon_key: &str,
        uploads: reqwest::Client,
        storage: StorageConfig,
    ) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                anon_key: anon_key.to_string(),
                session: RwLock::new(None),
                refresh_lock: Mutex::new(()),
                uploads,
                storage,
            }),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn table_url(&self, table: &str, pairs: Vec<(String, String)>) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn query_url(&self, table: &str, query: &Query) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        query.apply(&mut url);
        Ok(url)
    }

    /// Attach `apikey` and the bearer token of the current session (or the anon key).
    pub(crate) async fn authorized(&self, request: RequestDescriptor) -> RequestDescriptor {
        let token = self.bearer_token().await;
        request
            .header(APIKEY, &self.inner.anon_key)
            .header(AUTHORIZATION, &format!("Bearer {}", token))
    }

    /// Execute a request and return the body of a successful response.
    pub(crate) async fn send(&self, request: RequestDescriptor) -> Result<Vec<u8>, ClientError> {
        let url = request.url.clone();
        let response = self.inner.transport.execute(request).await?;
        let status = response.status();
        let body = response.into_body().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error = BackendError::from_body(&body);
        tracing::warn!(
            url = %url,
            status = %status,
            code = error.code.as_deref().unwrap_or("-"),
            message = %error.message,
            "Backend request failed"
        );
        Err(ClientError::Backend {
            status: status.as_u16(),
            error,
        })
    }

    fn decode<R: serde::de::DeserializeOwned>(resource: &str, body: &[u8]) -> Result<R, ClientError> {
        serde_json::from_slice(body).map_err(|e| ClientError::Decode {
            resource: resource.to_string(),
            reason: e.to_string(),
        })
    }

    fn encode<B: Serialize + ?Sized>(request: RequestDescriptor, row: &B) -> Result<RequestDescriptor, ClientError> {
        request.json(row).map_err(|e| ClientError::Encode(e.to_string()))
    }

    /// Rows of `R::TABLE` matching `query`.
    pub async fn select<R: Record>(&self, query: &Query) -> Result<Vec<R>, ClientError> {
        let url = self.query_url(R::TABLE, query)?;
        let request = self.authorized(RequestDescriptor::get(url)).await;
        let body = self.send(request).await?;
        Self::decode(R::TABLE, &body)
    }

    /// Exactly one row. Zero (or several) matching rows yield a backend error
    /// with code `PGRST116`.
    pub async fn select_single<R: Record>(&self, query: &Query) -> Result<R, ClientError> {
        let url = self.query_url(R::TABLE, query)?;
        let request = self
            .authorized(RequestDescriptor::get(url).header(ACCEPT, SINGLE_OBJECT))
            .await;
        let body = self.send(request).await?;
        Self::decode(R::TABLE, &body)
    }

    /// Untyped rows of any table.
    pub async fn select_json(&self, table: &str, query: &Query) -> Result<Vec<serde_json::Value>, ClientError> {
        let url = self.query_url(table, query)?;
        let request = self.authorized(RequestDescriptor::get(url)).await;
        let body = self.send(request).await?;
        Self::decode(table, &body)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<R: Record, B: Serialize + ?Sized>(&self, row: &B) -> Result<Vec<R>, ClientError> {
        let url = self.table_url(R::TABLE, Vec::new())?;
        let request = Self::encode(
            RequestDescriptor::new(Method::POST, url).header(PREFER, "return=representation"),
            row,
        )?;
        let body = self.send(self.authorized(request).await).await?;
        Self::decode(R::TABLE, &body)
    }

    /// Apply `changes` to the row with `id` and return the updated rows.
    pub async fn update_by_id<R: Record, B: Serialize + ?Sized>(
        &self,
        id: Uuid,
        changes: &B,
    ) -> Result<Vec<R>, ClientError> {
        let url = self.table_url(R::TABLE, Query::new().eq("id", id).filter_pairs())?;
        let request = Self::encode(
            RequestDescriptor::new(Method::PATCH, url).header(PREFER, "return=representation"),
            changes,
        )?;
        let body = self.send(self.authorized(request).await).await?;
        Self::decode(R::TABLE, &body)
    }

    /// Delete the row with `id`.
    pub async fn delete_by_id<R: Record>(&self, id: Uuid) -> Result<(), ClientError> {
        let url = self.table_url(R::TABLE, Query::new().eq("id", id).filter_pairs())?;
        let request = self.authorized(RequestDescriptor::new(Method::DELETE, url)).await;
        self.send(request).await?;
        tracing::info!(table = R::TABLE, id = %id, "Row deleted");
        Ok(())
    }
}
