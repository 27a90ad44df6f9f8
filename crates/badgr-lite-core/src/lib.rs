//! badgr-lite core library.
//!
//! Loads a stored Badgr OAuth2 token pair, lists badge classes and awards
//! badges, refreshing the access token once when the server rejects it.
//!
//! ```no_run
//! use badgr_lite_core::{AwardRequest, BadgrClient, Config};
//!
//! # async fn run() -> badgr_lite_core::Result<()> {
//! let mut client = BadgrClient::from_config(&Config::load()?)?;
//! for badge in client.list_badge_classes().await? {
//!     println!("{}", badge);
//! }
//! let request = AwardRequest::new("joe@example.com").notify(true);
//! let assertion = client.award("2TfNNqMLT8CoAhfGKqSv6Q", &request).await?;
//! println!("{}", assertion);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{BadgrClient, BadgrError, Result};
pub use auth::{AuthSession, AuthState, Credential, CredentialStore};
pub use config::Config;
pub use models::{AwardRequest, Badge, CreatedAt, Evidence, Recipient};
