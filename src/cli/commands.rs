//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Falcon connector CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-falcon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entity kinds and how each is read
    Entities,

    /// Fetch one page of an entity
    Page {
        /// Entity kind (User, Endpoint, Incident, Detection, Alert, CombinedAlert)
        entity: String,

        /// Cursor token returned by a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Vendor filter expression (REST entities only)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Read every page of an entity as JSON lines
    Read {
        /// Entity kind
        entity: String,

        /// Records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Vendor filter expression (REST entities only)
        #[arg(long)]
        filter: Option<String>,

        /// Stop after this many records
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Print the GraphQL document an entity page would send
    Query {
        /// Entity kind (GraphQL entities only)
        entity: String,

        /// Raw vendor cursor to continue after
        #[arg(long)]
        after: Option<String>,

        /// Records per page
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_command() {
        let cli = Cli::try_parse_from([
            "solidafy-falcon",
            "-C",
            "falcon.yaml",
            "page",
            "Detection",
            "--cursor",
            "eyJjdXJzb3IiOiIyIn0=",
            "--page-size",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("falcon.yaml")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Page {
                entity,
                cursor,
                page_size,
                filter,
            } => {
                assert_eq!(entity, "Detection");
                assert_eq!(cursor.as_deref(), Some("eyJjdXJzb3IiOiIyIn0="));
                assert_eq!(page_size, Some(2));
                assert!(filter.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["solidafy-falcon", "entities", "--format", "pretty", "-v"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Entities));
    }

    #[test]
    fn test_serve_default_port() {
        let cli = Cli::try_parse_from(["solidafy-falcon", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: 8080 }));
    }
}
