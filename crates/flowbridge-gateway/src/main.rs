use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use flowbridge_core::config::BridgeConfig;
use flowbridge_flowise::{FlowiseClient, PredictionApi};
use flowbridge_gateway::app::{self, AppState, Relay};
use flowbridge_markup::Translator;
use flowbridge_teams::{ActivitySender, ConnectorClient};

#[derive(Parser)]
#[command(name = "flowbridge-gateway")]
#[command(about = "Relay Microsoft Teams messages to a Flowise chatflow", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "FLOWBRIDGE_CONFIG")]
    config: Option<String>,

    /// Address to bind, overrides `gateway.bind`
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on, overrides `gateway.port` and `PORT`
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the resolved configuration (secrets masked) and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flowbridge_gateway=info,flowbridge_teams=info,tower_http=debug".into()
            }),
        )
        .init();

    // load config: --config / FLOWBRIDGE_CONFIG > ./flowbridge.toml, then env
    let mut config = BridgeConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        BridgeConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    config.log_summary();

    let prediction: Arc<dyn PredictionApi> = Arc::new(FlowiseClient::new(&config.flowise)?);
    let sender: Arc<dyn ActivitySender> = Arc::new(ConnectorClient::new(&config.teams)?);
    let translator = if config.markup.fence_aware {
        Translator::fence_aware()
    } else {
        Translator::compatible()
    };
    let relay: Relay = flowbridge_teams::MessageRelay::new(prediction, sender, translator);

    let state = Arc::new(AppState::new(relay));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    info!("flowbridge gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("flowbridge gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
