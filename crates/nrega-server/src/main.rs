use anyhow::Result;
use chrono::Utc;
use nrega_server::config::ServerConfig;
use nrega_server::state::AppState;
use nrega_server::sync::jobs::SyncJobRegistry;
use nrega_server::{app, config};
use nrega_storage::ReportStore;
use nrega_upstream::client::DataGovClient;
use nrega_upstream::RecordSource;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nrega=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");

    let config = ServerConfig::load(config_path)?;
    config
        .validate()
        .map_err(|e: config::ConfigError| anyhow::anyhow!("invalid configuration: {e}"))?;

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.url,
        default_state = %config.sync.default_state,
        report_fin_year = %config.sync.report_fin_year,
        "nrega-server starting"
    );

    let store = Arc::new(ReportStore::new(&config.database.url).await?);

    // Credentials are checked here, once, so a misconfigured deployment
    // aborts at startup rather than logging a failure on every sync.
    let source: Arc<dyn RecordSource> =
        Arc::new(DataGovClient::new(config.upstream.clone())?);

    let jobs = Arc::new(SyncJobRegistry::new());
    let state = AppState {
        store: Arc::clone(&store),
        source: Arc::clone(&source),
        jobs: Arc::clone(&jobs),
        config: Arc::new(config.clone()),
        start_time: Utc::now(),
    };

    if config.sync.run_on_startup {
        let job_id = jobs.start(
            Arc::clone(&source),
            Arc::clone(&store),
            config.sync.default_state.clone(),
            config.sync.default_fin_year.clone(),
            config.sync.max_concurrent,
        );
        tracing::info!(job_id = %job_id, "Startup sync scheduled");
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(http = %addr, "Server started");

    axum::serve(listener, app::build_http_app(state))
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
