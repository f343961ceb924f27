use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use neurodx_core::{
    CompletionClient, CompletionConfig, DiagnosisService, OpenAiClient, ServiceConfig,
};
use neurodx_server::telemetry::{self, LogFormat};
use neurodx_server::{router, AppState};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "neurodx", version, about = "Biomarker diagnosis HTTP service")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "NEURODX_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Reference CSV, relative to the working directory unless absolute.
    /// Overrides `NEURODX_REFERENCE_DATA`.
    #[arg(long)]
    reference_data: Option<PathBuf>,

    #[arg(long, env = "NEURODX_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    let mut config = ServiceConfig::from_env();
    if let Some(path) = cli.reference_data {
        config = config.with_reference_data(path);
    }
    let reference_data = config.reference_data.clone();

    let client = completion_client(CompletionConfig::from_env())?;
    let service = DiagnosisService::new(config, client);
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!(
        addr = %cli.bind,
        reference_data = %reference_data.display(),
        "neurodx listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// A missing credential is not fatal: the server starts and answers every
/// diagnosis with a configuration error.
fn completion_client(
    config: CompletionConfig,
) -> anyhow::Result<Option<Arc<dyn CompletionClient>>> {
    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; diagnosis requests will fail");
        return Ok(None);
    }

    let client = OpenAiClient::new(config).context("invalid completion client configuration")?;
    info!(endpoint = %client.endpoint(), "completion client ready");
    let client: Arc<dyn CompletionClient> = Arc::new(client);
    Ok(Some(client))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
