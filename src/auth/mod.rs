//! Sign-in through an external identity provider.

mod login;
mod pkce;
mod redirect;

pub use login::LoginFlow;
pub use pkce::{random_token, Pkce};
pub use redirect::{CallbackParams, RedirectListener};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in is not configured (missing OAuth client id)")]
    NotConfigured,

    #[error("Redirect listener error: {0}")]
    Listener(#[from] std::io::Error),

    #[error("Could not open the browser: {0}")]
    Browser(String),

    #[error("Sign-in timed out")]
    Timeout,

    #[error("Sign-in was cancelled")]
    Cancelled,

    #[error("Sign-in was denied: {0}")]
    Denied(String),

    #[error("Sign-in response did not match the request")]
    StateMismatch,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Identity provider returned no id_token")]
    MissingIdToken,

    #[error("Backend rejected the sign-in")]
    Rejected,

    #[error("Backend login failed: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("A sign-in is already in progress")]
    InProgress,
}
