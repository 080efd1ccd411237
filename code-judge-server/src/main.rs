use clap::Parser;
use code_judge::JudgeConfig;
use code_judge_server::{create_app, run_server};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for per-execution workspaces (overrides the config file)
    #[arg(long)]
    scratch_root: Option<PathBuf>,

    /// Maximum number of concurrent executions (overrides the config file)
    #[arg(short, long)]
    max_concurrent: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => JudgeConfig::load(path)?,
        None => JudgeConfig::default(),
    };
    if let Some(scratch_root) = args.scratch_root {
        config.scratch_root = scratch_root;
    }
    if let Some(max_concurrent) = args.max_concurrent {
        config.max_concurrent_executions = max_concurrent;
    }

    let app = create_app(config).await?;
    run_server(app, args.addr).await?;

    Ok(())
}
