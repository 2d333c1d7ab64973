use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::models::{FetchResponse, PushNote, RemoteNote, SyncRequest};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// The notes backend as seen by the sync coordinator
#[async_trait]
pub trait RemoteNotes: Send + Sync {
    /// Upsert (or tombstone) notes on the server
    async fn push(&self, token: &str, notes: Vec<PushNote>) -> Result<(), SyncError>;

    /// Every note the server holds for the user, tombstones included
    async fn fetch(&self, token: &str) -> Result<Vec<RemoteNote>, SyncError>;
}

/// HTTP client for the notes backend (bearer auth, JSON)
pub struct CloudClient {
    client: Client,
    base_url: String,
}

impl CloudClient {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SyncError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Map non-success statuses to errors
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::AuthFailed),
        status if !status.is_success() => Err(SyncError::Server {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
        _ => Ok(response),
    }
}

#[async_trait]
impl RemoteNotes for CloudClient {
    async fn push(&self, token: &str, notes: Vec<PushNote>) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url("notes/sync"))
            .bearer_auth(token)
            .json(&SyncRequest { notes: &notes })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn fetch(&self, token: &str) -> Result<Vec<RemoteNote>, SyncError> {
        let response = self
            .client
            .get(self.url("notes"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: FetchResponse = response.json().await?;
        Ok(body.into_notes())
    }
}

/// Stand-in used when the backend URL is unusable
///
/// Every call fails with `InvalidUrl`, so sync degrades the same way it does
/// when offline and the app keeps running locally.
pub struct DisabledRemote {
    reason: String,
}

impl DisabledRemote {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RemoteNotes for DisabledRemote {
    async fn push(&self, _token: &str, _notes: Vec<PushNote>) -> Result<(), SyncError> {
        Err(SyncError::InvalidUrl(self.reason.clone()))
    }

    async fn fetch(&self, _token: &str) -> Result<Vec<RemoteNote>, SyncError> {
        Err(SyncError::InvalidUrl(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{}/api/", addr)
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            CloudClient::new("ftp://example.com"),
            Err(SyncError::InvalidUrl(_))
        ));
        let client = CloudClient::new("https://example.com/api/").unwrap();
        assert_eq!(client.base_url(), "https://example.com/api");
    }

    #[tokio::test]
    async fn test_push_and_fetch_over_http() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route(
                "/api/notes/sync",
                post(
                    |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((bearer(&headers), body));
                        Json(serde_json::json!({"ok": true}))
                    },
                ),
            )
            .route(
                "/api/notes",
                get(|| async {
                    Json(serde_json::json!([
                        {"id": "r1", "content": "remote", "updated_at": "2030-01-01T00:00:00Z"}
                    ]))
                }),
            )
            .with_state(Arc::clone(&seen));
        let base = serve(router).await;

        let client = CloudClient::new(&base).unwrap();
        client
            .push("tok", vec![PushNote::tombstone("gone")])
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer tok"));
        assert_eq!(seen[0].1["notes"][0]["isDeleted"], true);

        let fetched = client.fetch("tok").await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content.as_deref(), Some("remote"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_failed() {
        let router = Router::new().route(
            "/api/notes",
            get(|| async { (axum::http::StatusCode::UNAUTHORIZED, "nope") }),
        );
        let base = serve(router).await;

        let client = CloudClient::new(&base).unwrap();
        assert!(matches!(client.fetch("bad").await, Err(SyncError::AuthFailed)));
    }

    #[tokio::test]
    async fn test_disabled_remote_reports_invalid_url() {
        let remote = DisabledRemote::new("notes.example.com/api");
        assert!(matches!(
            remote.fetch("tok").await,
            Err(SyncError::InvalidUrl(reason)) if reason == "notes.example.com/api"
        ));
        assert!(matches!(
            remote.push("tok", vec![PushNote::tombstone("n")]).await,
            Err(SyncError::InvalidUrl(_))
        ));
    }
}
