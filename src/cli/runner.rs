//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConnectorConfig;
use crate::connector::FalconConnector;
use crate::entity::{EntityBinding, EntityKind};
use crate::error::{Error, Result};
use crate::query;
use crate::types::PageRequest;
use futures::TryStreamExt;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Entities => self.entities(),
            Commands::Page {
                entity,
                cursor,
                page_size,
                filter,
            } => {
                self.page(entity, cursor.clone(), *page_size, filter.as_deref())
                    .await
            }
            Commands::Read {
                entity,
                page_size,
                filter,
                max_records,
            } => {
                self.read(entity, *page_size, filter.as_deref(), *max_records)
                    .await
            }
            Commands::Query {
                entity,
                after,
                page_size,
            } => self.query(entity, after.as_deref(), *page_size),
            Commands::Serve { port } => {
                let config = crate::cli::ServerConfig {
                    connector: self.load_config()?,
                };
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Load the connector configuration
    fn load_config(&self) -> Result<ConnectorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -C flag)"))?;
        ConnectorConfig::load(path)
    }

    /// Build a first-page request with CLI overrides applied
    fn page_request(
        config: Option<&ConnectorConfig>,
        kind: EntityKind,
        page_size: Option<u32>,
        filter: Option<&str>,
    ) -> PageRequest {
        let mut request = match config {
            Some(config) => config.page_request(kind),
            None => PageRequest::new(kind),
        };
        if let Some(page_size) = page_size {
            request = request.with_page_size(page_size);
        }
        if let Some(filter) = filter {
            request = request.with_filter(filter);
        }
        request
    }

    /// Print one value in the selected format
    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }

    /// List the entity table
    fn entities(&self) -> Result<()> {
        let bindings: Vec<EntityBinding> = EntityKind::ALL.iter().map(EntityKind::binding).collect();

        match self.cli.format {
            OutputFormat::Json => self.emit(&bindings),
            OutputFormat::Pretty => {
                println!("{:<15} {:<13} SORT KEY", "ENTITY", "DRIVER");
                for binding in &bindings {
                    println!(
                        "{:<15} {:<13} {}",
                        binding.kind.as_str(),
                        format!("{:?}", binding.driver).to_lowercase(),
                        binding.sort_key.unwrap_or("-")
                    );
                }
                Ok(())
            }
        }
    }

    /// Fetch and print one page
    async fn page(
        &self,
        entity: &str,
        cursor: Option<String>,
        page_size: Option<u32>,
        filter: Option<&str>,
    ) -> Result<()> {
        let kind: EntityKind = entity.parse()?;
        let config = self.load_config()?;
        let connector = FalconConnector::new(&config)?;

        let request = Self::page_request(Some(&config), kind, page_size, filter).with_cursor(cursor);
        let page = connector.get_page(&request).await?;
        self.emit(&page)
    }

    /// Drain every page and print records as JSON lines
    async fn read(
        &self,
        entity: &str,
        page_size: Option<u32>,
        filter: Option<&str>,
        max_records: Option<usize>,
    ) -> Result<()> {
        let kind: EntityKind = entity.parse()?;
        let config = self.load_config()?;
        let connector = FalconConnector::new(&config)?;
        let request = Self::page_request(Some(&config), kind, page_size, filter);

        let start = Instant::now();
        let mut pages = Box::pin(connector.pages(request));
        let mut total = 0usize;
        let mut page_count = 0usize;

        'pages: while let Some(page) = pages.try_next().await? {
            page_count += 1;
            for record in &page.records {
                if max_records.is_some_and(|max| total >= max) {
                    break 'pages;
                }
                println!("{}", serde_json::to_string(record)?);
                total += 1;
            }
        }

        info!(
            "Read {} {} records in {} pages ({:.1}s)",
            total,
            kind,
            page_count,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Print the GraphQL document for an entity page
    fn query(&self, entity: &str, after: Option<&str>, page_size: Option<u32>) -> Result<()> {
        let kind: EntityKind = entity.parse()?;
        let config = match self.cli.config {
            Some(_) => Some(self.load_config()?),
            None => None,
        };
        let request = Self::page_request(config.as_ref(), kind, page_size, None);
        let document = query::build(kind, &request, after)?;

        match self.cli.format {
            OutputFormat::Json => self.emit(&query::graphql_body(&document)),
            OutputFormat::Pretty => {
                println!("{document}");
                Ok(())
            }
        }
    }
}
