//! HTTP surface of the kiosk hub.
//!
//! `/api/health` is open; every other `/api/*` route sits behind the
//! device-key guard. CORS is permissive because kiosk devices call the
//! hub from arbitrary origins on the store network.

pub mod api;
pub mod auth;
pub mod health;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router {
    let data = api::router(state.clone()).layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_device_key,
    ));

    Router::new()
        .route("/api/health", get(health::handler))
        .merge(data)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
