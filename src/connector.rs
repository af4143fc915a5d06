//! Datasource trait and the Falcon connector
//!
//! One page fetch decodes the caller's cursor, sends the entity's vendor
//! call(s), classifies the response, normalizes the records and encodes
//! the cursor for the next page. No state survives between calls.

use crate::config::ConnectorConfig;
use crate::cursor;
use crate::entity::{default_selector, EntityBinding, EntityKind, Endpoint, REST_RECORDS_PATH};
use crate::error::{Error, Result};
use crate::http::{classify, HttpClient, Outcome, RequestConfig};
use crate::normalize::{normalize_all, records_at, EntitySelector};
use crate::pagination::{Paginator, AFTER_PARAM, LIMIT_PARAM, OFFSET_PARAM};
use crate::query;
use crate::types::{JsonObject, JsonValue, PageRequest, PageResult, Record};
use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Query parameter carrying the REST filter expression
pub const FILTER_PARAM: &str = "filter";

/// GraphQL endpoint prefix; the API version is appended
pub const GRAPHQL_PATH: &str = "/identity-protection/combined/graphql";

// ============================================================================
// Datasource Trait
// ============================================================================

/// A source of paged, normalized entity records
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Entity kinds this datasource serves
    fn entities(&self) -> Vec<EntityBinding>;

    /// Fetch one page
    async fn get_page(&self, request: &PageRequest) -> Result<PageResult>;
}

// ============================================================================
// Falcon Connector
// ============================================================================

/// Raw page as returned by the vendor, before normalization
struct RawPage {
    /// Body the pagination strategy reads
    body: Value,
    /// Records to normalize
    records: Vec<Value>,
    /// Records counted towards pagination
    count: usize,
    /// Status of the final call
    status: u16,
}

/// Read-only connector for the Falcon APIs
pub struct FalconConnector {
    client: HttpClient,
    selectors: HashMap<EntityKind, EntitySelector>,
}

impl FalconConnector {
    /// Create a connector from configuration
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(config.http_config()?)?;

        let overrides = EntityKind::ALL
            .into_iter()
            .filter_map(|kind| {
                config
                    .entity(kind)
                    .and_then(|e| e.selector.clone())
                    .map(|s| (kind, s))
            })
            .collect();

        Self::with_client(client, overrides)
    }

    /// Create a connector around an existing client
    ///
    /// Kinds without an override use their built-in selector tree.
    pub fn with_client(
        client: HttpClient,
        mut overrides: HashMap<EntityKind, EntitySelector>,
    ) -> Result<Self> {
        let mut selectors = HashMap::new();
        for kind in EntityKind::ALL {
            let selector = match overrides.remove(&kind) {
                Some(selector) => selector,
                None => default_selector(kind)?,
            };
            selectors.insert(kind, selector);
        }

        Ok(Self { client, selectors })
    }

    /// Selector tree used for an entity kind
    pub fn selector(&self, kind: EntityKind) -> Result<&EntitySelector> {
        self.selectors
            .get(&kind)
            .ok_or_else(|| Error::unsupported_entity(kind.as_str()))
    }

    /// Fetch one page of an entity kind
    pub async fn get_page(&self, request: &PageRequest) -> Result<PageResult> {
        if request.page_size == 0 {
            return Err(Error::config("page_size must be positive"));
        }

        // Cursor problems surface before any network call
        let current = cursor::decode(request.cursor.as_deref())?.filter(|c| !c.is_empty());
        let binding = request.entity.binding();
        let driver = binding.paginator(request.page_size);
        let params = driver.initial_params(current.as_ref())?;
        let selector = self.selector(request.entity)?;

        debug!(
            "Fetching {} page (size {}, cursor {})",
            request.entity,
            request.page_size,
            if current.is_some() { "present" } else { "none" }
        );

        let raw = match binding.endpoint {
            Endpoint::GraphQl { .. } => self.fetch_graphql(request, &binding, &params).await?,
            Endpoint::ListThenDetail {
                list,
                detail,
                ids_field,
            } => {
                self.fetch_list_then_detail(request, &params, list, detail, ids_field)
                    .await?
            }
            Endpoint::Combined { path, sort } => {
                self.fetch_combined(request, &params, path, sort).await?
            }
        };

        let records = normalize_all(&raw.records, selector)?;
        let next = driver.next_page(&raw.body, raw.count, current.as_ref())?;
        let next_cursor = next.cursor().map(cursor::encode).transpose()?;

        debug!(
            "{} page: {} records, {}",
            request.entity,
            records.len(),
            if next_cursor.is_some() { "more available" } else { "last page" }
        );

        Ok(PageResult {
            records,
            next_cursor,
            status: raw.status,
        })
    }

    /// Stream every page of an entity kind, starting from the request cursor
    pub fn pages(&self, request: PageRequest) -> impl Stream<Item = Result<PageResult>> + Send + '_ {
        stream::try_unfold(Some(request), move |state| async move {
            let Some(request) = state else {
                return Ok::<_, Error>(None);
            };
            let page = self.get_page(&request).await?;
            let next = page
                .next_cursor
                .clone()
                .map(|c| request.clone().with_cursor(Some(c)));
            Ok(Some((page, next)))
        })
    }

    /// Drain pages into one record list, stopping early at `max_records`
    pub async fn read_all(
        &self,
        request: PageRequest,
        max_records: Option<usize>,
    ) -> Result<Vec<Record>> {
        let mut pages = Box::pin(self.pages(request));
        let mut records = Vec::new();

        while let Some(page) = pages.try_next().await? {
            records.extend(page.records);
            if let Some(max) = max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }
        }

        Ok(records)
    }

    // ========================================================================
    // Vendor Calls
    // ========================================================================

    async fn fetch_graphql(
        &self,
        request: &PageRequest,
        binding: &EntityBinding,
        params: &HashMap<String, String>,
    ) -> Result<RawPage> {
        let after = params.get(AFTER_PARAM).map(String::as_str);
        let document = query::build(request.entity, request, after)?;
        let url = format!("{GRAPHQL_PATH}/{}", request.api_version());

        let outcome = self
            .client
            .post(&url, query::graphql_body(&document), request_config(request))
            .await?;
        let (body, status) = classify_with_status(outcome)?;

        let records = records_at(&body, &binding.records_path())?;
        Ok(RawPage {
            count: records.len(),
            records,
            body,
            status,
        })
    }

    async fn fetch_list_then_detail(
        &self,
        request: &PageRequest,
        params: &HashMap<String, String>,
        list: &str,
        detail: &str,
        ids_field: &str,
    ) -> Result<RawPage> {
        let version = request.api_version();

        let mut list_config = request_config(request);
        for key in [OFFSET_PARAM, LIMIT_PARAM] {
            if let Some(value) = params.get(key) {
                list_config = list_config.query(key, value.clone());
            }
        }
        if let Some(filter) = request.filter.as_deref().filter(|f| !f.is_empty()) {
            list_config = list_config.query(FILTER_PARAM, filter);
        }

        let outcome = self
            .client
            .get(&format!("{list}/{version}"), list_config)
            .await?;
        let (list_body, list_status) = classify_with_status(outcome)?;
        let ids = records_at(&list_body, REST_RECORDS_PATH)?;

        // An empty id set ends the sequence here; the detail endpoint is not
        // asked about zero ids.
        if ids.is_empty() {
            debug!("{list} listed no ids, skipping {detail}");
            return Ok(RawPage {
                body: list_body,
                records: Vec::new(),
                count: 0,
                status: list_status,
            });
        }

        let mut detail_body = JsonObject::new();
        detail_body.insert(ids_field.to_string(), JsonValue::Array(ids.clone()));

        let outcome = self
            .client
            .post(
                &format!("{detail}/{version}"),
                JsonValue::Object(detail_body),
                request_config(request),
            )
            .await?;
        let (body, status) = classify_with_status(outcome)?;
        let records = records_at(&body, REST_RECORDS_PATH)?;

        if records.len() != ids.len() {
            debug!(
                "Detail lookup returned {} of {} listed ids",
                records.len(),
                ids.len()
            );
        }

        Ok(RawPage {
            body: list_body,
            records,
            count: ids.len(),
            status,
        })
    }

    async fn fetch_combined(
        &self,
        request: &PageRequest,
        params: &HashMap<String, String>,
        path: &str,
        sort: &str,
    ) -> Result<RawPage> {
        let after = params.get(AFTER_PARAM).cloned().unwrap_or_default();
        let mut body = json!({
            "limit": request.page_size,
            "after": after,
            "sort": sort,
        });
        if let Some(filter) = request.filter.as_deref().filter(|f| !f.is_empty()) {
            body[FILTER_PARAM] = json!(filter);
        }

        let outcome = self
            .client
            .post(
                &format!("{path}/{}", request.api_version()),
                body,
                request_config(request),
            )
            .await?;
        let (body, status) = classify_with_status(outcome)?;

        let records = records_at(&body, REST_RECORDS_PATH)?;
        Ok(RawPage {
            count: records.len(),
            records,
            body,
            status,
        })
    }
}

#[async_trait]
impl Datasource for FalconConnector {
    fn entities(&self) -> Vec<EntityBinding> {
        EntityKind::ALL.iter().map(EntityKind::binding).collect()
    }

    async fn get_page(&self, request: &PageRequest) -> Result<PageResult> {
        FalconConnector::get_page(self, request).await
    }
}

impl std::fmt::Debug for FalconConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FalconConnector")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

fn request_config(request: &PageRequest) -> RequestConfig {
    RequestConfig::new().timeout(request.timeout)
}

fn classify_with_status(outcome: Outcome) -> Result<(Value, u16)> {
    let status = outcome.status;
    Ok((classify(outcome)?, status))
}
