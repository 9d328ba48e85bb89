//! Object storage: uploads with progress events, public URLs, removal.
//!
//! # Upload events
//! ```text
//! Progress(0) → Progress(n)... → Progress(100) → Completed { path, public_url }
//!                                             ↘ Failed { message }
//!                          (cancel at any time) ↘ Cancelled
//! ```
//!
//! Uploads stream the body in chunks and are never retried; a streamed body
//! cannot be replayed.

use std::time::Duration;

use futures_util::stream;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use crate::backend::client::{BackendClient, APIKEY};
use crate::backend::errors::{user_message, BackendError, ClientError};
use crate::observability::metrics;
use crate::transport::http::map_reqwest_error;
use crate::transport::{RequestDescriptor, Transport, TransportError};

/// Events emitted by an upload. Exactly one terminal event is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(u8),
    Completed { path: String, public_url: String },
    Failed { message: String },
    Cancelled,
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

/// A running upload. Dropping the handle cancels the upload.
#[derive(Debug)]
pub struct UploadHandle {
    events: mpsc::UnboundedReceiver<UploadEvent>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl UploadHandle {
    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        self.events.recv().await
    }

    /// Request cancellation. A `Cancelled` event follows unless the upload already finished.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Drain progress events and return the terminal event.
    pub async fn finish(mut self) -> UploadEvent {
        while let Some(event) = self.events.recv().await {
            if event.is_terminal() {
                return event;
            }
        }
        UploadEvent::Failed {
            message: "upload task ended without a result".to_string(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Object path `<prefix>/<uuid v4>.<ext>`, keeping the extension of `file_name`.
pub fn object_path(prefix: &str, file_name: &str) -> String {
    let id = Uuid::new_v4();
    let prefix = prefix.trim_matches('/');
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains('/'));

    let name = match ext {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    };
    if prefix.is_empty() {
        name
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Object path inside `bucket` referenced by a public URL.
pub fn object_path_from_public_url(public_url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/storage/v1/object/public/{}/", bucket);
    let url = Url::parse(public_url).ok()?;
    let path = url.path();
    let start = path.find(&marker)? + marker.len();
    let object = &path[start..];
    if object.is_empty() {
        None
    } else {
        Some(object.to_string())
    }
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((sent as u128 * 100) / total as u128).min(100) as u8
    }
}

impl<T: Transport> BackendClient<T> {
    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, ClientError> {
        self.endpoint(&format!("storage/v1/object/public/{}/{}", bucket, path))
            .map(String::from)
    }

    /// Delete objects from `bucket`.
    pub async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("storage/v1/object/{}", bucket))?;
        let request = RequestDescriptor::new(Method::DELETE, url)
            .json(&serde_json::json!({ "prefixes": paths }))
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        self.send(self.authorized(request).await).await?;
        tracing::info!(bucket, count = paths.len(), "Storage objects removed");
        Ok(())
    }

    /// Start uploading `data` to `bucket/path`.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadHandle, ClientError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, path))?;
        let public_url = self.public_url(bucket, path)?;
        let token = self.bearer_token().await;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let total = data.len();
        let chunk_size = self.inner.storage.chunk_size.max(1);
        let chunks: Vec<Vec<u8>> = data.chunks(chunk_size).map(<[u8]>::to_vec).collect();
        let progress_tx = events_tx.clone();
        let mut sent = 0usize;
        let mut last = 0u8;
        let _ = events_tx.send(UploadEvent::Progress(0));
        if total == 0 {
            let _ = events_tx.send(UploadEvent::Progress(100));
        }
        let body = stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len();
            let pct = percent(sent, total);
            if pct > last {
                last = pct;
                let _ = progress_tx.send(UploadEvent::Progress(pct));
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let request = self
            .inner
            .uploads
            .post(url)
            .header(APIKEY, &self.inner.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(body));

        let timeout = Duration::from_secs(self.inner.storage.upload_timeout_secs);
        let object = path.to_string();
        let bucket = bucket.to_string();

        tracing::info!(bucket = %bucket, path = %object, bytes = total, "Upload started");

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel_rx => UploadEvent::Cancelled,
                result = tokio::time::timeout(timeout, request.send()) => match result {
                    Err(_) => UploadEvent::Failed {
                        message: user_message(&TransportError::Timeout(timeout)),
                    },
                    Ok(Err(e)) => UploadEvent::Failed {
                        message: user_message(&map_reqwest_error(e)),
                    },
                    Ok(Ok(response)) if response.status().is_success() => UploadEvent::Completed {
                        path: object.clone(),
                        public_url,
                    },
                    Ok(Ok(response)) => {
                        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                        let error = BackendError::from_body(&body);
                        UploadEvent::Failed {
                            message: user_message(&error),
                        }
                    }
                },
            };

            let label = match &outcome {
                UploadEvent::Completed { .. } => "completed",
                UploadEvent::Cancelled => "cancelled",
                _ => "failed",
            };
            metrics::record_upload(label);
            tracing::info!(bucket = %bucket, path = %object, outcome = label, "Upload finished");
            let _ = events_tx.send(outcome);
        });

        Ok(UploadHandle {
            events: events_rx,
            cancel: Some(cancel_tx),
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::scripted::{ScriptedTransport, Step};
    use std::sync::Arc;

    fn client(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, BackendClient<Arc<ScriptedTransport>>) {
        let transport = Arc::new(transport);
        let client = BackendClient::new(transport.clone(), "https://project.supabase.co", "anon").unwrap();
        (transport, client)
    }

    #[test]
    fn test_object_path_keeps_extension() {
        let path = object_path("alumni", "portrait.JPG");
        assert!(path.starts_with("alumni/"));
        assert!(path.ends_with(".jpg"));
        assert_eq!(path.len(), "alumni/".len() + 36 + ".jpg".len());

        let bare = object_path("/logos/", "README");
        assert!(bare.starts_with("logos/"));
        assert!(!bare.contains('.'));
    }

    #[test]
    fn test_object_path_from_public_url() {
        let url = "https://project.supabase.co/storage/v1/object/public/alumni-images/alumni/abc.png";
        assert_eq!(object_path_from_public_url(url, "alumni-images").as_deref(), Some("alumni/abc.png"));
        assert_eq!(object_path_from_public_url(url, "gallery"), None);
        assert_eq!(object_path_from_public_url("not a url", "gallery"), None);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(200, 200), 100);
    }

    #[test]
    fn test_public_url() {
        let (_, client) = client(ScriptedTransport::new());
        assert_eq!(
            client.public_url("gallery", "campus/1.png").unwrap(),
            "https://project.supabase.co/storage/v1/object/public/gallery/campus/1.png"
        );
    }

    #[tokio::test]
    async fn test_remove_sends_prefixes() {
        let (transport, client) = client(ScriptedTransport::new().script("/storage/v1/object/alumni-images", vec![Step::ok("[]")]));

        client.remove("alumni-images", &["alumni/abc.png".to_string()]).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::DELETE);
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "prefixes": ["alumni/abc.png"] }));
    }
}
