use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value = "5000")]
    pub port: u16,

    /// Data directory for the JSON documents (default: <app-dir>/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct InitOutput {
    pub app_dir: PathBuf,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub api_port: u16,
    pub device_count: usize,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} kiosk hub at {}",
            "Initialized".green().bold(),
            self.app_dir.display().to_string().bold()
        )?;
        writeln!(f, "  {} {}", "Config:".dimmed(), self.config_path.display())?;
        writeln!(f, "  {} {}", "Data:".dimmed(), self.data_dir.display())?;
        writeln!(f, "  {} {}", "API port:".dimmed(), self.api_port)?;
        writeln!(
            f,
            "  {} {} starter key(s) written",
            "Devices:".dimmed(),
            self.device_count
        )?;
        write!(
            f,
            "Edit {} to set per-device keys.",
            self.config_path.display()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

/// Starter device-key table so a fresh install has something to edit.
fn starter_device_keys() -> BTreeMap<String, String> {
    let mut keys = BTreeMap::new();
    keys.insert("pi-01".to_string(), "A7K9-22FQ-ZYX1".to_string());
    keys.insert("pi-02".to_string(), "L9D3-55TN-WBA4".to_string());
    keys
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_port: self.port,
            data_dir: self.data_dir.clone(),
            device_keys: starter_device_keys(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(InitOutput {
            app_dir: state.app_dir,
            config_path: state.config_path,
            data_dir: state.data_dir,
            api_port: state.config.api_port,
            device_count: state.config.device_keys.len(),
        })
    }
}
