//! Data endpoints. Everything routed here sits behind the device-key
//! guard; see [`crate::http_server::router`].

pub mod checkout;
pub mod client;
pub mod resources;
pub mod session;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::ServiceState;

use resources::DocumentKind;

/// Success acknowledgment returned by every mutating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/api/beacons", document_routes(DocumentKind::Beacons))
        .route("/api/pathnodes", document_routes(DocumentKind::PathNodes))
        .route("/api/stock", document_routes(DocumentKind::Stock))
        .route("/api/members", document_routes(DocumentKind::Members))
        .route(
            "/api/session",
            get(session::get_handler).put(session::put_handler),
        )
        .route("/api/checkout", post(checkout::handler))
        .with_state(state)
}

fn document_routes(kind: DocumentKind) -> MethodRouter<ServiceState> {
    get(move |state: State<ServiceState>| resources::get_handler(state, kind)).post(
        move |state: State<ServiceState>, body: Json<serde_json::Value>| {
            resources::replace_handler(state, kind, body)
        },
    )
}

/// JSON error body shared by every endpoint: `{"error": "..."}`.
pub(crate) fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (
        status,
        Json(serde_json::json!({"error": message.to_string()})),
    )
        .into_response()
}
