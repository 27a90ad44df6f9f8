//! Authentication module for the Badgr OAuth2 token pair.
//!
//! This module provides:
//! - `CredentialStore`: loads and persists the JSON token file
//! - `AuthSession`: executes authorized requests, refreshing the access
//!   token once when the server answers 401
//!
//! The token file is rewritten after every successful refresh.

pub mod credentials;
pub mod session;

pub use credentials::{Credential, CredentialStore};
pub use session::{AuthSession, AuthState};
