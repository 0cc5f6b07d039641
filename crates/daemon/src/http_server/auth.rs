//! Device-key guard for the data endpoints.
//!
//! Each kiosk device sends its shared secret in the Authorization
//! header. The header is treated as plain text, not a structured auth
//! scheme: the request is accepted when the header value contains any
//! configured secret as a substring. Everything else is rejected with
//! 401 before reaching endpoint logic.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::ServiceState;

pub async fn require_device_key(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if carries_known_key(auth_header, state.device_keys().values()) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "rejected request without a valid device key");
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "unauthorized"})),
        )
            .into_response()
    }
}

fn carries_known_key<'a>(
    auth_header: &str,
    keys: impl IntoIterator<Item = &'a String>,
) -> bool {
    keys.into_iter()
        .any(|key| !key.is_empty() && auth_header.contains(key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_and_embedded_keys() {
        let keys = vec!["A7K9-22FQ-ZYX1".to_string()];
        assert!(carries_known_key("A7K9-22FQ-ZYX1", &keys));
        assert!(carries_known_key("Bearer A7K9-22FQ-ZYX1", &keys));
    }

    #[test]
    fn rejects_unknown_or_missing_keys() {
        let keys = vec!["A7K9-22FQ-ZYX1".to_string()];
        assert!(!carries_known_key("", &keys));
        assert!(!carries_known_key("Bearer nope", &keys));
        assert!(!carries_known_key("A7K9", &keys));
    }

    #[test]
    fn empty_configured_key_matches_nothing() {
        let keys = vec![String::new()];
        assert!(!carries_known_key("anything", &keys));
    }
}
