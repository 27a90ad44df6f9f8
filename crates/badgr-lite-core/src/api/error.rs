use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BadgrError {
    #[error("Token file not found: {}", .0.display())]
    CredentialFileNotFound(PathBuf),

    #[error("Failed to parse token file {}: {reason}", .path.display())]
    CredentialParse { path: PathBuf, reason: String },

    #[error("Token and refresh token expired - prime a new token")]
    TokenAndRefreshExpired,

    #[error("Required badge attributes missing: {}", .0.join(", "))]
    RequiredAttributesMissing(Vec<String>),

    #[error("Badge id not found: {0}")]
    BadBadgeId(String),

    #[error("Award rejected by server: {0}")]
    AwardBadgeBadData(Value),

    #[error("Unexpected server response: {0}")]
    ProtocolViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access token is not a valid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BadgrError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl BadgrError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a protocol violation for a status the operation does not expect.
    pub fn unexpected_status(status: reqwest::StatusCode, body: &str) -> Self {
        BadgrError::ProtocolViolation(format!("Status {}: {}", status, Self::truncate_body(body)))
    }

    /// True when the caller has to obtain a fresh token pair out of band.
    pub fn needs_new_token(&self) -> bool {
        matches!(
            self,
            BadgrError::TokenAndRefreshExpired | BadgrError::CredentialFileNotFound(_)
        )
    }
}
