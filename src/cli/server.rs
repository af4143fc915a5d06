//! HTTP server mode for REST API access to page fetches

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ConnectorConfig;
use crate::connector::{Datasource, FalconConnector};
use crate::entity::EntityKind;
use crate::error::{Error, ErrorCode, Result};
use crate::types::PageRequest;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Connector configuration used for every request
    pub connector: ConnectorConfig,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    datasource: Arc<dyn Datasource>,
    config: ConnectorConfig,
}

/// Request body for the page endpoint
///
/// Unset fields fall back to the configured entity defaults.
#[derive(Debug, Deserialize)]
struct PageBody {
    /// Entity kind name
    entity: String,
    /// Cursor token from a previous page
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    filter: Option<String>,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default)]
    enabled: Option<bool>,
}

impl PageBody {
    fn into_request(self, config: &ConnectorConfig) -> Result<PageRequest> {
        let kind: EntityKind = self.entity.parse()?;
        let mut request = config.page_request(kind).with_cursor(self.cursor);

        if let Some(page_size) = self.page_size {
            request = request.with_page_size(page_size);
        }
        if let Some(filter) = self.filter {
            request = request.with_filter(filter);
        }
        if let Some(version) = self.api_version {
            request = request.with_api_version(version);
        }
        if let Some(archived) = self.archived {
            request = request.with_archived(archived);
        }
        if let Some(enabled) = self.enabled {
            request = request.with_enabled(enabled);
        }
        Ok(request)
    }
}

/// Error payload
#[derive(Debug, Serialize)]
struct ApiError {
    code: ErrorCode,
    message: String,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(err: &Error) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code: err.code(),
                message: err.to_string(),
            }),
        }
    }
}

/// HTTP status for an error code
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => match err.code() {
            ErrorCode::InvalidCursor | ErrorCode::UnsupportedEntity | ErrorCode::InvalidConfig => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::DatasourceUnreachable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatasourceRejected
            | ErrorCode::DatasourceFailed
            | ErrorCode::InvalidResponse => StatusCode::BAD_GATEWAY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn error_response(err: &Error) -> Response {
    tracing::warn!("Request failed: {}", err);
    (status_for(err), Json(ApiResponse::error(err))).into_response()
}

/// Build the router over a datasource
fn router(datasource: Arc<dyn Datasource>, config: ConnectorConfig) -> Router {
    let state = AppState { datasource, config };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/entities", get(list_entities))
        .route("/page", post(get_page))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let connector = FalconConnector::new(&config.connector)?;
    let app = router(Arc::new(connector), config.connector);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::Error::new(e).context("HTTP server stopped"))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List entity kinds and their bindings
async fn list_entities(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.datasource.entities()))
}

/// Fetch one page
async fn get_page(State(state): State<Arc<AppState>>, Json(body): Json<PageBody>) -> Response {
    let request = match body.into_request(&state.config) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match state.datasource.get_page(&request).await {
        Ok(page) => Json(ApiResponse::success(page)).into_response(),
        Err(e) => error_response(&e),
    }
}
