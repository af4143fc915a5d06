//! CLI module
//!
//! Command-line interface for the connector.
//!
//! # Commands
//!
//! - `entities` - List entity kinds and their pagination strategy
//! - `page` - Fetch one page and print records plus the next cursor
//! - `read` - Read every page of an entity as JSON lines
//! - `query` - Print the GraphQL document an entity page sends
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{serve, ServerConfig};
