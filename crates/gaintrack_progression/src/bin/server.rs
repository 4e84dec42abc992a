use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;

use gaintrack_client::config::Config;
use gaintrack_client::repository_from_config;
use gaintrack_progression::http::{self, AppState};
use gaintrack_progression::{
    ProgressionMcpHandler, ProgressionPolicy, ProgressionService, logging,
};

const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Parse an optional numeric env value, keeping `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = logging::log_level();
    logging::init(&log_env);
    tracing::info!(%log_env, "gaintrack_progression:http: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let config = Config::from_env()?;
    let policy = ProgressionPolicy::from_env()?;
    let repository = repository_from_config(&config);
    info!(
        backend = repository.backend_name(),
        "session repository configured"
    );

    let service = ProgressionService::new(repository, policy);
    let state = Arc::new(AppState {
        service: service.clone(),
        metrics: Some(handle),
    });

    let max_body_size = parse_or(
        std::env::var("MAX_HTTP_BODY_SIZE").ok(),
        DEFAULT_MAX_BODY_SIZE,
    );
    let request_timeout = Duration::from_secs(parse_or(
        std::env::var("GAINTRACK_REQUEST_TIMEOUT_SECS").ok(),
        http::DEFAULT_REQUEST_TIMEOUT.as_secs(),
    ));

    // rmcp StreamableHttpService mounted at /mcp, sharing the service (and its trend cache)
    let handler = ProgressionMcpHandler::new(service);
    let factory = move || -> Result<_, std::io::Error> { Ok(handler.clone()) };
    let session = Arc::new(
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default(),
    );
    let mcp_service = rmcp::transport::streamable_http_server::tower::StreamableHttpService::new(
        factory,
        session,
        rmcp::transport::streamable_http_server::tower::StreamableHttpServerConfig::default(),
    );

    let app = http::router(state, request_timeout)
        .nest_service("/mcp", mcp_service)
        .layer(axum::extract::DefaultBodyLimit::max(max_body_size));

    let addr: SocketAddr = std::env::var("ADDRESS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, max_body_bytes = max_body_size, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
