//! API client for the Badgr REST API.
//!
//! `BadgrClient` owns the authenticated session and maps the badge-class
//! listing and award endpoints onto typed results.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::AuthSession;
use crate::config::Config;
use crate::models::{AwardRequest, Badge};

use super::{BadgrError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the Badgr API
pub const DEFAULT_API_BASE_URL: &str = "https://api.badgr.io";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Envelope around every listing response
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    result: Option<Vec<Value>>,
}

/// Envelope around a successful award response
#[derive(Debug, Deserialize)]
struct AwardEnvelope {
    status: AwardStatus,
    #[serde(default)]
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AwardStatus {
    #[serde(default)]
    success: bool,
}

pub struct BadgrClient {
    session: AuthSession,
    base_url: Url,
}

impl BadgrClient {
    /// Create a client for the API at `base_url`, loading the token file.
    pub fn new(base_url: &str, token_path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BadgrError::Config(format!("Invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BadgrError::Config(format!(
                "API base URL cannot have a path: {}",
                base_url
            )));
        }
        let http = Client::builder().timeout(timeout).build()?;
        let token_url = Self::endpoint(&base_url, &["o", "token"]);
        let session = AuthSession::open(http, token_url.as_str(), token_path)?;
        Ok(Self { session, base_url })
    }

    /// Create a client from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url(), config.token_file(), config.request_timeout())
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Append path segments to `base`, percent-encoding each one.
    fn endpoint(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn badge_classes_url(&self) -> Url {
        Self::endpoint(&self.base_url, &["v2", "badgeclasses"])
    }

    fn assertions_url(&self, badge_class_id: &str) -> Result<Url> {
        // Dot segments would be dropped from the path and hit another endpoint
        if badge_class_id.is_empty() || badge_class_id == "." || badge_class_id == ".." {
            return Err(BadgrError::BadBadgeId(badge_class_id.to_string()));
        }
        Ok(Self::endpoint(
            &self.base_url,
            &["v2", "badgeclasses", badge_class_id, "assertions"],
        ))
    }

    /// Fetch all badge classes visible to the token's owner
    pub async fn list_badge_classes(&mut self) -> Result<Vec<Badge>> {
        let url = self.badge_classes_url();
        let body = self.session.request(Method::GET, url.as_str(), None).await?;

        let envelope: ListEnvelope = serde_json::from_value(body).map_err(|e| {
            BadgrError::ProtocolViolation(format!("Invalid badge class listing: {}", e))
        })?;
        let raw = envelope.result.ok_or_else(|| {
            BadgrError::ProtocolViolation("Badge class listing has no result list".to_string())
        })?;
        debug!("Received {} badge classes", raw.len());

        raw.into_iter().map(Badge::from_value).collect()
    }

    /// Award the badge class `badge_class_id` to the request's recipient.
    pub async fn award(&mut self, badge_class_id: &str, request: &AwardRequest) -> Result<Badge> {
        let url = self.assertions_url(badge_class_id)?;
        let payload = serde_json::to_value(request)
            .map_err(|e| BadgrError::ProtocolViolation(format!("Failed to encode award: {}", e)))?;

        let response = self
            .session
            .send(Method::POST, url.as_str(), Some(&payload))
            .await?;
        let status = response.status();
        let text = response.text().await?;

        match status {
            StatusCode::NOT_FOUND => Err(BadgrError::BadBadgeId(badge_class_id.to_string())),
            StatusCode::BAD_REQUEST => {
                let detail = serde_json::from_str(&text).unwrap_or(Value::String(text));
                warn!(badge_class_id = badge_class_id, "Award rejected by server");
                Err(BadgrError::AwardBadgeBadData(detail))
            }
            StatusCode::CREATED => {
                let badge = Self::parse_award(&text)?;
                info!(
                    badge_class_id = badge_class_id,
                    assertion = %badge.entity_id,
                    "Badge awarded"
                );
                Ok(badge)
            }
            other => Err(BadgrError::unexpected_status(other, &text)),
        }
    }

    fn parse_award(text: &str) -> Result<Badge> {
        let envelope: AwardEnvelope = serde_json::from_str(text)
            .map_err(|e| BadgrError::ProtocolViolation(format!("Invalid award response: {}", e)))?;
        if !envelope.status.success {
            return Err(BadgrError::ProtocolViolation(
                "Award response did not report success".to_string(),
            ));
        }
        let mut result = envelope.result;
        if result.len() != 1 {
            return Err(BadgrError::ProtocolViolation(format!(
                "Award response carried {} results, expected 1",
                result.len()
            )));
        }
        Badge::from_value(result.remove(0))
    }
}
