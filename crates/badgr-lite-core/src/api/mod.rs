//! REST API client module for the Badgr service.
//!
//! This module provides the `BadgrClient` for listing badge classes and
//! awarding badges, and the `BadgrError` type every operation in this crate
//! reports.
//!
//! The API uses OAuth2 bearer tokens; an expired access token is refreshed
//! once per operation using the stored refresh token.

pub mod client;
pub mod error;

pub use client::BadgrClient;
pub use error::{BadgrError, Result};
