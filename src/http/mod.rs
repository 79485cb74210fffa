//! HTTP client module: streaming downloads and status classification.

mod client;
mod status;

pub use client::HttpClient;
pub use status::{HttpStatusError, classify_status, describe_status_error};
