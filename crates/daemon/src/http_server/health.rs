use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::ApiRequest;

/// Request type for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRequest {}

/// Response type for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

impl ApiRequest for HealthRequest {
    type Response = HealthResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/health").unwrap();
        client.get(full_url)
    }
}

/// Always answers `{"ok": true}`. This is the only `/api/*` route that
/// does not require a device key, so external healthchecks can probe the
/// hub without credentials.
#[tracing::instrument]
pub async fn handler() -> Response {
    let msg = serde_json::json!({"ok": true});
    (StatusCode::OK, Json(msg)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_direct() {
        let response = handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        assert_eq!(&body[..], b"{\"ok\":true}");
    }
}
