//! `kioskd` command line: init, serve, and health ops dispatched through
//! the [`op::Op`] trait.

pub mod op;
pub mod ops;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::http_server::api::client::ApiClient;
use op::{Op, OpContext};

#[derive(Parser, Debug)]
#[command(name = "kioskd", version, about = "Kiosk hub daemon and CLI")]
pub struct Cli {
    /// App directory holding config.toml (default: ~/.kioskhub)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote hub URL for client ops
    #[arg(
        long,
        global = true,
        env = "KIOSK_REMOTE",
        default_value = "http://localhost:5000"
    )]
    pub remote: Url,

    /// Device key sent in the Authorization header of client ops
    #[arg(long, global = true, env = "KIOSK_DEVICE_KEY")]
    pub device_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the app directory and a starter config.toml
    Init(ops::Init),
    /// Run the HTTP service until ctrl-c
    Serve(ops::Serve),
    /// Probe a running hub's health endpoint
    Health(ops::Health),
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let client = ApiClient::new(&cli.remote, cli.device_key.as_deref())?;
    let ctx = OpContext {
        config_path: cli.config,
        client,
    };

    match cli.command {
        Command::Init(op) => execute(op, &ctx).await,
        Command::Serve(op) => execute(op, &ctx).await,
        Command::Health(op) => execute(op, &ctx).await,
    }
}

async fn execute<O: Op>(op: O, ctx: &OpContext) -> anyhow::Result<()> {
    let output = op.execute(ctx).await?;
    println!("{output}");
    Ok(())
}
