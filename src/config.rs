//! Connector configuration
//!
//! Loaded from YAML (or JSON, which YAML accepts):
//!
//! ```yaml
//! address: https://api.crowdstrike.com
//! token_env: FALCON_TOKEN
//! request_timeout_seconds: 30
//! entities:
//!   Detection:
//!     page_size: 500
//!     filter: "status:'new'"
//!   User:
//!     archived: false
//! ```

use crate::entity::EntityKind;
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClientConfig;
use crate::normalize::EntitySelector;
use crate::types::{PageRequest, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete connector configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Vendor API base address
    pub address: String,

    /// Bearer token
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Environment variable holding the bearer token
    #[serde(default)]
    pub token_env: Option<String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-entity settings
    #[serde(default)]
    pub entities: HashMap<EntityKind, EntityConfig>,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("token_env", &self.token_env)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("user_agent", &self.user_agent)
            .field("entities", &self.entities)
            .finish()
    }
}

// ============================================================================
// Entity Config
// ============================================================================

/// Settings for one entity kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Records per page
    #[serde(default)]
    pub page_size: Option<u32>,

    /// API version tag
    #[serde(default)]
    pub api_version: Option<String>,

    /// Vendor filter expression (REST entities only)
    #[serde(default)]
    pub filter: Option<String>,

    /// Include archived entities
    #[serde(default)]
    pub archived: Option<bool>,

    /// Include only enabled entities
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Replacement selector tree
    #[serde(default)]
    pub selector: Option<EntitySelector>,
}

// ============================================================================
// Loading
// ============================================================================

impl ConnectorConfig {
    /// Create a config for an address and token
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: Some(token.into()),
            token_env: None,
            request_timeout_seconds: default_timeout_seconds(),
            user_agent: None,
            entities: HashMap::new(),
        }
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&content)
    }

    /// Parse and validate a YAML config
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: ConnectorConfig = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::config("address cannot be empty"));
        }

        let url = Url::parse(&self.address)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "address must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.token.is_none() && self.token_env.is_none() {
            return Err(Error::config("one of token or token_env is required"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(Error::config("request_timeout_seconds must be positive"));
        }

        for (kind, entity) in &self.entities {
            if entity.page_size == Some(0) {
                return Err(Error::config(format!("{kind}: page_size must be positive")));
            }
        }

        Ok(())
    }

    /// Bearer token, reading `token_env` when no literal token is set
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        let var = self
            .token_env
            .as_deref()
            .ok_or_else(|| Error::config("no token configured"))?;
        std::env::var(var)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::config(format!("environment variable {var} is not set")))
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// HTTP client settings for this config
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.address.clone())
            .timeout(self.timeout())
            .bearer_token(self.resolve_token()?);

        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(builder.build())
    }

    /// Settings for an entity kind, if configured
    pub fn entity(&self, kind: EntityKind) -> Option<&EntityConfig> {
        self.entities.get(&kind)
    }

    /// First-page request for an entity kind with configured defaults
    pub fn page_request(&self, kind: EntityKind) -> PageRequest {
        let mut request = PageRequest::new(kind)
            .with_page_size(DEFAULT_PAGE_SIZE)
            .with_timeout(self.timeout());

        if let Some(entity) = self.entity(kind) {
            if let Some(page_size) = entity.page_size {
                request = request.with_page_size(page_size);
            }
            if let Some(ref version) = entity.api_version {
                request = request.with_api_version(version.clone());
            }
            if let Some(ref filter) = entity.filter {
                request = request.with_filter(filter.clone());
            }
            if let Some(archived) = entity.archived {
                request = request.with_archived(archived);
            }
            if let Some(enabled) = entity.enabled {
                request = request.with_enabled(enabled);
            }
        }

        request
    }
}
