use std::path::{Path, PathBuf};

use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::credentials::{Credential, CredentialStore};
use crate::api::{BadgrError, Result};

/// Where a single logical request stands in the refresh-once protocol.
///
/// `Authorized` -> 401 -> `RefreshPending` -> refresh -> `Reauthorized`;
/// a 401 in any state other than `Authorized` fails the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Using the token the session started with
    Authorized,
    /// Server rejected the access token; one refresh is due
    RefreshPending,
    /// Retrying with a freshly refreshed token
    Reauthorized,
}

impl AuthState {
    /// Transition taken when the server answers 401.
    pub fn on_unauthorized(self) -> Result<AuthState> {
        match self {
            AuthState::Authorized => Ok(AuthState::RefreshPending),
            AuthState::RefreshPending | AuthState::Reauthorized => {
                Err(BadgrError::TokenAndRefreshExpired)
            }
        }
    }

    /// Transition taken once the refresh succeeded.
    pub fn on_refreshed(self) -> AuthState {
        match self {
            AuthState::RefreshPending => AuthState::Reauthorized,
            other => other,
        }
    }
}

/// Holds the token pair and executes requests on its behalf.
pub struct AuthSession {
    http: Client,
    token_url: String,
    token_path: PathBuf,
    credential: Credential,
}

impl AuthSession {
    /// Load the token file and start a session against `token_url`.
    pub fn open(
        http: Client,
        token_url: impl Into<String>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let token_path = token_path.into();
        let credential = CredentialStore::load(&token_path)?;
        Ok(Self {
            http,
            token_url: token_url.into(),
            token_path,
            credential,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Headers for an authorized JSON request
    pub fn headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.credential.access_token))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Exchange the refresh token for a new token pair and persist it.
    pub async fn refresh(&mut self) -> Result<()> {
        debug!(url = %self.token_url, "Refreshing access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credential.refresh_token.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                warn!("Refresh token rejected");
                Err(BadgrError::TokenAndRefreshExpired)
            }
            StatusCode::OK => {
                let body = response.text().await?;
                self.credential = Credential::from_json(&body).map_err(|reason| {
                    BadgrError::ProtocolViolation(format!(
                        "Unusable token from token endpoint: {}",
                        reason
                    ))
                })?;
                CredentialStore::save(&self.token_path, &self.credential)?;
                info!(path = %self.token_path.display(), "Access token refreshed");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, "Unexpected token endpoint response");
                Err(BadgrError::unexpected_status(status, &body))
            }
        }
    }

    async fn execute(&self, method: &Method, url: &str, body: Option<&Value>) -> Result<Response> {
        debug!(method = %method, url = url, "Sending request");
        let mut request = self.http.request(method.clone(), url).headers(self.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send an authorized request, refreshing and retrying once on 401.
    ///
    /// Returns the first response that is not a 401; its status is left for
    /// the caller to interpret.
    pub async fn send(
        &mut self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut state = AuthState::Authorized;
        loop {
            let response = self.execute(&method, url, body).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }
            warn!(url = url, state = ?state, "Request unauthorized");
            state = state.on_unauthorized()?;
            self.refresh().await?;
            state = state.on_refreshed();
        }
    }

    /// Send an authorized request that must answer 200 with a JSON body.
    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let response = self.send(method, url, body).await?;
        let status = response.status();
        let text = response.text().await?;
        if status != StatusCode::OK {
            warn!(url = url, status = %status, "Unexpected response status");
            return Err(BadgrError::unexpected_status(status, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| BadgrError::ProtocolViolation(format!("Invalid JSON from {}: {}", url, e)))
    }
}
