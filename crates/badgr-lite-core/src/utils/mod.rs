//! Utility functions for API name and timestamp handling.

pub mod format;

pub use format::{parse_timestamp, to_snake_case};
