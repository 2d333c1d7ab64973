use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::pkce::{random_token, Pkce};
use super::redirect::RedirectListener;
use super::AuthError;
use crate::config::CloudSettings;
use crate::sync::{LoginRequest, LoginResponse};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// Browser sign-in: authorization code with PKCE, then backend login
pub struct LoginFlow {
    settings: CloudSettings,
    client: Client,
}

impl LoginFlow {
    pub fn new(settings: CloudSettings) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &CloudSettings {
        &self.settings
    }

    pub fn authorization_url(&self, redirect_uri: &str, state: &str, challenge: &str) -> String {
        let oauth = &self.settings.oauth;
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&code_challenge={}&code_challenge_method=S256",
            oauth.authorization_endpoint,
            urlencoding::encode(&oauth.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&oauth.scopes.join(" ")),
            urlencoding::encode(state),
            urlencoding::encode(challenge),
        )
    }

    /// Trade the authorization code for the provider's identity token
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<String, AuthError> {
        let oauth = &self.settings.oauth;
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
            ("client_id", oauth.client_id.as_str()),
        ];
        if let Some(secret) = &oauth.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .client
            .post(&oauth.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange(format!("{} - {}", status, message)));
        }

        let body: TokenResponse = response.json().await?;
        body.id_token.ok_or(AuthError::MissingIdToken)
    }

    /// Trade the identity token for an app session
    pub async fn backend_login(&self, id_token: &str) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.settings.api_base))
            .json(&LoginRequest { id_token })
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Rejected),
            status if !status.is_success() => Err(AuthError::Backend {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response.json().await?),
        }
    }

    /// Run the whole flow
    ///
    /// `open_browser` is handed the authorization URL. Fails with
    /// [`AuthError::Timeout`] if the redirect does not arrive in time.
    pub async fn run<F, E>(&self, open_browser: F) -> Result<LoginResponse, AuthError>
    where
        F: FnOnce(&str) -> Result<(), E>,
        E: std::fmt::Display,
    {
        if self.settings.oauth.client_id.is_empty() {
            return Err(AuthError::NotConfigured);
        }

        let listener = RedirectListener::bind().await?;
        let redirect_uri = listener.redirect_uri();
        let state = random_token(32);
        let pkce = Pkce::generate();

        let url = self.authorization_url(&redirect_uri, &state, &pkce.challenge);
        open_browser(&url).map_err(|e| AuthError::Browser(e.to_string()))?;

        let params = listener
            .wait(self.settings.oauth.login_timeout())
            .await?;

        if let Some(error) = params.error {
            return Err(AuthError::Denied(error));
        }
        if params.state.as_deref() != Some(state.as_str()) {
            return Err(AuthError::StateMismatch);
        }
        let code = params
            .code
            .ok_or_else(|| AuthError::Denied("no authorization code".to_string()))?;

        let id_token = self
            .exchange_code(&code, &pkce.verifier, &redirect_uri)
            .await?;
        let session = self.backend_login(&id_token).await?;
        log::info!("Auth: signed in as {}", session.user.id);
        Ok(session)
    }
}
