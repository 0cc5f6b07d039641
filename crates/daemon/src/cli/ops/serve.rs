use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use crate::service_config::Config as ServiceConfig;
use crate::state::AppState;
use crate::{process, spawn_service};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Override the configured API port
    #[arg(long, env = "KIOSK_PORT")]
    pub port: Option<u16>,

    /// Override the configured data directory
    #[arg(long, env = "KIOSK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),

    #[error("service failed: {0}")]
    Service(#[from] process::ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;

        let port = self.port.unwrap_or(state.config.api_port);
        let data_dir = self.data_dir.clone().unwrap_or(state.data_dir);
        let api_listen_addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], port));

        let config = ServiceConfig {
            api_listen_addr,
            data_dir,
            device_keys: state.config.device_keys,
        };

        spawn_service(&config).await?;
        Ok("kiosk hub stopped".to_string())
    }
}
