use a2t_core::{Capabilities, ToolProvider};
use a2t_server::config::{AppState, ServerConfig};
use a2t_server::{demo, CAPABILITIES_PATH};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// Flat catalog without groups
    Simple,
    /// Grouped catalog with dynamic tool discovery
    Advanced,
}

#[derive(Parser, Debug)]
#[command(name = "a2t-server")]
#[command(about = "a2t - Agent-to-Tool protocol server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "a2t.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "A2T_PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", env = "A2T_HOST")]
    host: String,

    /// Demo catalog to serve
    #[arg(long, value_enum, default_value = "advanced")]
    demo: Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "a2t_core=info,a2t_server=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting a2t server ({:?} demo)", args.demo);

    // Load configuration
    let config = ServerConfig::load(&args.config)?;

    let provider: Arc<dyn ToolProvider> = match args.demo {
        Demo::Simple => Arc::new(demo::simple(config.apply(Capabilities::new()))?),
        Demo::Advanced => Arc::new(demo::advanced(
            config.apply(Capabilities::new().with_groups("").with_dynamic_tools()),
        )?),
    };

    let capabilities = provider.get_capabilities();
    tracing::info!("Capabilities: {}", capabilities.to_json_pretty()?);
    tracing::info!("Negotiate at {}", CAPABILITIES_PATH);

    let state = AppState::new(provider, config.listing);

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting API server on {}", addr);

    a2t_server::serve(&addr, state).await?;

    Ok(())
}
