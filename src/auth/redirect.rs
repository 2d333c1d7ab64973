//! One-shot loopback listener that captures the OAuth redirect.
//!
//! Binds a random port on 127.0.0.1, serves `/callback` until the first
//! hit, then shuts down.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::AuthError;

const CALLBACK_PATH: &str = "/callback";

const DONE_PAGE: &str = "<!doctype html><html><body style=\"font-family: sans-serif\">\
<h3>Signed in to Ghost Notes</h3><p>You can close this tab.</p></body></html>";

const STALE_PAGE: &str = "<!doctype html><html><body style=\"font-family: sans-serif\">\
<p>This sign-in link was already used.</p></body></html>";

/// Query parameters of the provider redirect
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

type ResultSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

pub struct RedirectListener {
    port: u16,
    result_rx: oneshot::Receiver<CallbackParams>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl RedirectListener {
    pub async fn bind() -> Result<Self, AuthError> {
        let (result_tx, result_rx) = oneshot::channel();
        let slot: ResultSlot = Arc::new(Mutex::new(Some(result_tx)));

        let app = Router::new()
            .route(CALLBACK_PATH, get(callback))
            .with_state(slot);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        log::info!("Auth: waiting for redirect on 127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            port,
            result_rx,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, CALLBACK_PATH)
    }

    /// Wait for the browser to hit the callback
    pub async fn wait(mut self, timeout: Duration) -> Result<CallbackParams, AuthError> {
        let received = tokio::time::timeout(timeout, &mut self.result_rx).await;
        self.shutdown();
        match received {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(AuthError::Cancelled),
            Err(_) => Err(AuthError::Timeout),
        }
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for RedirectListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn callback(
    State(slot): State<ResultSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let sender = slot.lock().ok().and_then(|mut s| s.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(params);
            Html(DONE_PAGE)
        }
        None => Html(STALE_PAGE),
    }
}
