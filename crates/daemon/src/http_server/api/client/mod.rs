//! Typed HTTP client for the hub API, used by the CLI and tests.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// One API operation: how to build its HTTP request and the response
/// type it parses into. Implemented next to each endpoint's handler.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}
