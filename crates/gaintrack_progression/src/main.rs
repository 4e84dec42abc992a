use gaintrack_client::config::Config;
use gaintrack_client::repository_from_config;
use gaintrack_progression::{
    ProgressionMcpHandler, ProgressionPolicy, ProgressionService, logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = logging::log_level();
    logging::init(&log_env);
    tracing::info!("gaintrack_progression: log filter: {}", log_env);

    let config = Config::from_env()?;
    let policy = ProgressionPolicy::from_env()?;
    let repository = repository_from_config(&config);
    tracing::info!(
        backend = repository.backend_name(),
        history_limit = config.history_limit,
        "gaintrack_progression: session repository configured"
    );

    let handler = ProgressionMcpHandler::new(ProgressionService::new(repository, policy));
    tracing::info!(
        "gaintrack_progression: registered {} tools and {} prompts",
        handler.tool_count(),
        handler.prompt_count()
    );

    tracing::info!("gaintrack_progression: starting stdio MCP server...");

    use rmcp::serve_server;
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = serve_server(handler, transport).await?;

    tracing::info!("gaintrack_progression: service initialized as server");

    server.waiting().await?;

    Ok(())
}
