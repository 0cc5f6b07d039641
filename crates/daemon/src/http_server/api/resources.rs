//! Generic get/replace endpoints for the flat document resources.
//!
//! Bodies are opaque JSON at this layer: `Replace` overwrites the whole
//! stored document with whatever the caller sent (no merge), and `Get`
//! returns the stored document or the resource's default when no file
//! exists yet.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use doc_store::StoreError;

use crate::documents::{
    beacon_map_default, BEACON_MAP_DOC, MEMBERS_DOC, PATH_NODES_DOC, STOCK_DOC,
};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::{error_response, Ack};
use crate::ServiceState;

/// The four document resources exposed as plain get/replace endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Beacons,
    PathNodes,
    Stock,
    Members,
}

impl DocumentKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Beacons => BEACON_MAP_DOC,
            Self::PathNodes => PATH_NODES_DOC,
            Self::Stock => STOCK_DOC,
            Self::Members => MEMBERS_DOC,
        }
    }

    /// Value returned by `Get` while no document has been written.
    /// The beacon map has a structural default; the rest are empty
    /// sequences.
    pub fn default_value(self) -> Value {
        match self {
            Self::Beacons => beacon_map_default(),
            Self::PathNodes | Self::Stock | Self::Members => Value::Array(Vec::new()),
        }
    }

    pub fn api_path(self) -> &'static str {
        match self {
            Self::Beacons => "/api/beacons",
            Self::PathNodes => "/api/pathnodes",
            Self::Stock => "/api/stock",
            Self::Members => "/api/members",
        }
    }
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    kind: DocumentKind,
) -> Result<impl IntoResponse, DocumentError> {
    let value: Value = state
        .store()
        .read(kind.file_name(), kind.default_value())
        .await?;
    Ok((StatusCode::OK, Json(value)).into_response())
}

pub async fn replace_handler(
    State(state): State<ServiceState>,
    kind: DocumentKind,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, DocumentError> {
    state.store().write(kind.file_name(), &body).await?;
    tracing::info!(document = kind.file_name(), "document replaced");
    Ok((StatusCode::OK, Json(Ack::ok())).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for DocumentError {
    fn into_response(self) -> Response {
        match self {
            DocumentError::Store(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

/// Fetch the full document for one resource.
#[derive(Debug, Clone)]
pub struct GetDocumentRequest {
    pub kind: DocumentKind,
}

/// Overwrite the full document for one resource.
#[derive(Debug, Clone)]
pub struct ReplaceDocumentRequest {
    pub kind: DocumentKind,
    pub value: Value,
}

/// Replace acknowledgment (`{"status": "ok"}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceDocumentResponse {
    pub status: String,
}

impl ApiRequest for GetDocumentRequest {
    type Response = Value;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join(self.kind.api_path()).unwrap();
        client.get(full_url)
    }
}

impl ApiRequest for ReplaceDocumentRequest {
    type Response = ReplaceDocumentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join(self.kind.api_path()).unwrap();
        client.post(full_url).json(&self.value)
    }
}
