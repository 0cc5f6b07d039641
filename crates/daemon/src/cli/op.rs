use std::fmt::Display;
use std::path::PathBuf;

use crate::http_server::api::client::ApiClient;

/// Context shared by every CLI op: the app-dir override and a client
/// pointed at the remote hub.
pub struct OpContext {
    pub config_path: Option<PathBuf>,
    pub client: ApiClient,
}

/// One CLI operation.
#[async_trait::async_trait]
pub trait Op {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: Display;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}
