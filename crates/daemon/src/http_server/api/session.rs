//! Per-device session endpoints.
//!
//! Sessions live in one document keyed by device id. A device that has
//! never stored a session gets the default back; the default is never
//! persisted on read. PUT overwrites that device's record wholesale and
//! leaves every other device untouched.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use doc_store::StoreError;

use crate::documents::{Session, SESSIONS_DOC};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::{error_response, Ack};
use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub device_id: String,
}

impl SessionQuery {
    /// Trimmed device id, or an error when empty/whitespace.
    fn device_id(&self) -> Result<&str, SessionError> {
        let id = self.device_id.trim();
        if id.is_empty() {
            return Err(SessionError::MissingDeviceId);
        }
        Ok(id)
    }
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, SessionError> {
    let device_id = query.device_id()?;

    let sessions: Map<String, Value> = state.store().read(SESSIONS_DOC, Map::new()).await?;
    let session = match sessions.get(device_id) {
        Some(session) => session.clone(),
        None => serde_json::to_value(Session::default()).map_err(|source| {
            StoreError::Encode {
                name: SESSIONS_DOC.to_string(),
                source,
            }
        })?,
    };

    Ok((StatusCode::OK, Json(session)).into_response())
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Query(query): Query<SessionQuery>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, SessionError> {
    let device_id = query.device_id()?;

    let mut sessions: Map<String, Value> = state.store().read(SESSIONS_DOC, Map::new()).await?;
    sessions.insert(device_id.to_string(), body);
    state.store().write(SESSIONS_DOC, &sessions).await?;

    tracing::debug!(device_id = %device_id, "session stored");
    Ok((StatusCode::OK, Json(Ack::ok())).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("device_id required")]
    MissingDeviceId,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        match self {
            SessionError::MissingDeviceId => error_response(StatusCode::BAD_REQUEST, self),
            SessionError::Store(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

/// Fetch one device's session (default when absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSessionRequest {
    pub device_id: String,
}

/// Overwrite one device's session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutSessionRequest {
    pub device_id: String,
    pub session: Value,
}

impl ApiRequest for GetSessionRequest {
    type Response = Value;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut full_url = base_url.join("/api/session").unwrap();
        full_url
            .query_pairs_mut()
            .append_pair("device_id", &self.device_id);
        client.get(full_url)
    }
}

impl ApiRequest for PutSessionRequest {
    type Response = Ack;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut full_url = base_url.join("/api/session").unwrap();
        full_url
            .query_pairs_mut()
            .append_pair("device_id", &self.device_id);
        client.put(full_url).json(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_device_ids_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let query = SessionQuery {
                device_id: raw.to_string(),
            };
            assert!(matches!(
                query.device_id(),
                Err(SessionError::MissingDeviceId)
            ));
        }
    }

    #[test]
    fn device_id_is_trimmed() {
        let query = SessionQuery {
            device_id: "  pi-01  ".to_string(),
        };
        assert_eq!(query.device_id().unwrap(), "pi-01");
    }
}
