//! HTTP client module
//!
//! Provides the vendor transport and the classifier that turns each
//! exchange into a parsed body or a categorized error.
//!
//! # Classification
//!
//! - **Transport failure**: connect error or timeout, raised by the client
//! - **Vendor failure**: an `errors` envelope with the vendor's code, any status
//! - **Rejection**: 4xx/5xx without an envelope
//! - **Success**: 2xx with a JSON body

mod classify;
mod client;

pub use classify::classify;
pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, Outcome, RequestConfig};
