//! Data models for Badgr entities.
//!
//! - `Badge`: a badge class or assertion as returned by the API
//! - `AwardRequest`: the body sent when awarding a badge

pub mod award;
pub mod badge;

pub use award::{AwardRequest, Evidence, Recipient};
pub use badge::{Badge, CreatedAt, REQUIRED_ATTRIBUTES};
