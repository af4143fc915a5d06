//! Token encoding for composite cursors and vendor search-after tokens

use super::types::{Cursor, SearchAfterCursor, TotalRelation};
use crate::error::{Error, Result};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Encode a cursor into an opaque, transport-safe token
pub fn encode(cursor: &Cursor) -> Result<String> {
    let json = serde_json::to_vec(cursor)?;
    Ok(STANDARD.encode(json))
}

/// Decode a token produced by [`encode`]
///
/// An absent or empty token is the first page and yields `Ok(None)`.
pub fn decode(token: Option<&str>) -> Result<Option<Cursor>> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(token)
        .map_err(|e| Error::invalid_cursor(format!("cursor is not valid base64: {e}")))?;

    let cursor: Cursor = serde_json::from_slice(&bytes)
        .map_err(|e| Error::invalid_cursor(format!("cursor payload is not recognised: {e}")))?;

    Ok(Some(cursor))
}

// ============================================================================
// Vendor search-after token
// ============================================================================

/// Contents of the vendor's `meta.pagination.after` token
///
/// The vendor issues base64 JSON carrying the sort-key tuple and cluster id.
/// Totals are optional on the vendor side; the pagination block supplies them
/// when the token does not. The decoded form is informational: requests
/// relay the token string the vendor issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorAfterToken {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_relation: Option<TotalRelation>,
    #[serde(rename = "clusterId", default)]
    pub cluster_id: String,
    #[serde(default)]
    pub after: Vec<Value>,
}

impl VendorAfterToken {
    /// Parse a vendor token
    pub fn parse(token: &str) -> Result<Self> {
        let bytes = [STANDARD, URL_SAFE, STANDARD_NO_PAD, URL_SAFE_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(token).ok())
            .ok_or_else(|| Error::invalid_response("search-after token is not valid base64"))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            Error::invalid_response(format!("search-after token is not recognised: {e}"))
        })
    }

    /// Render as the vendor's base64 token form
    pub fn encode(&self) -> Result<String> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }
}

impl SearchAfterCursor {
    /// Build cursor state from a raw vendor `after` token
    ///
    /// A token that does not decode is kept as an opaque value; only the
    /// decomposed fields are left at their defaults.
    pub fn from_vendor_after(
        raw: &str,
        reported_total: u64,
        reported_relation: Option<TotalRelation>,
        total_fetched: u64,
    ) -> Self {
        let mut token = VendorAfterToken::parse(raw).unwrap_or_else(|e| {
            debug!("Relaying opaque search-after token: {e}");
            VendorAfterToken::default()
        });
        if token.total_relation.is_none() {
            token.total_relation = reported_relation;
        }

        Self {
            vendor_after: raw.to_string(),
            ..Self::from_vendor_token(&token, reported_total, total_fetched)
        }
    }

    /// Build cursor state from a decoded vendor token
    pub fn from_vendor_token(
        token: &VendorAfterToken,
        reported_total: u64,
        total_fetched: u64,
    ) -> Self {
        Self {
            version: token.version.clone(),
            total_hits: token.total_hits.unwrap_or(reported_total),
            total_relation: token.total_relation.unwrap_or_default(),
            cluster_id: token.cluster_id.clone(),
            after: token.after.clone(),
            total_fetched,
            vendor_after: String::new(),
        }
    }

    /// Token to send as `after` on the next request
    ///
    /// The vendor's own token is relayed byte for byte. State without one is
    /// re-encoded from its decomposed fields.
    pub fn relay_token(&self) -> Result<String> {
        if self.vendor_after.is_empty() {
            self.to_vendor_token().encode()
        } else {
            Ok(self.vendor_after.clone())
        }
    }

    /// Decomposed vendor token for this state
    pub fn to_vendor_token(&self) -> VendorAfterToken {
        VendorAfterToken {
            version: self.version.clone(),
            total_hits: Some(self.total_hits),
            total_relation: Some(self.total_relation),
            cluster_id: self.cluster_id.clone(),
            after: self.after.clone(),
        }
    }
}
