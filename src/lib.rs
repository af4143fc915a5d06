// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Falcon Connector
//!
//! A read-only connector that pages identity, endpoint, incident, detection
//! and alert records out of the Falcon APIs behind one opaque cursor.
//!
//! ## Features
//!
//! - **One Page Contract**: entity kind, page size and cursor in; normalized
//!   records and the next cursor out
//! - **Three Pagination Strategies**: GraphQL forward cursor, REST offset,
//!   REST search-after
//! - **Selector Trees**: declarative extraction of attributes and nested
//!   child collections from heterogeneous vendor records
//! - **Categorized Errors**: unreachable, rejected, vendor-failed, invalid
//!   cursor and unsupported entity, never retried internally
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_falcon::{ConnectorConfig, EntityKind, FalconConnector};
//!
//! #[tokio::main]
//! async fn main() -> solidafy_falcon::Result<()> {
//!     let config = ConnectorConfig::load("falcon.yaml")?;
//!     let connector = FalconConnector::new(&config)?;
//!
//!     let mut request = config.page_request(EntityKind::User);
//!     loop {
//!         let page = connector.get_page(&request).await?;
//!         for record in &page.records {
//!             println!("{}", serde_json::to_string(record)?);
//!         }
//!         match page.next_cursor {
//!             Some(cursor) => request = request.with_cursor(Some(cursor)),
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     FalconConnector::get_page                   │
//! │  PageRequest → decode cursor → vendor call(s) → PageResult      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Cursor  │   Query   │   Paginate    │   HTTP    │  Normalize  │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ base64   │ User      │ Cursor        │ Bearer    │ Attributes  │
//! │ JSON     │ Endpoint  │ Offset        │ Timeout   │ Children    │
//! │          │ Incident  │ Search-after  │ Classify  │ Coercion    │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Opaque cursor codec
pub mod cursor;

/// Entity kinds and vendor bindings
pub mod entity;

/// GraphQL query builders
pub mod query;

/// HTTP client and response classification
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response normalization
pub mod normalize;

/// Connector configuration
pub mod config;

/// Datasource trait and the Falcon connector
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConnectorConfig, EntityConfig};
pub use connector::{Datasource, FalconConnector};
pub use entity::EntityKind;
pub use error::{Error, ErrorCode, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
