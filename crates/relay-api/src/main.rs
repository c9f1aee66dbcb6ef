use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay_api::{build_router, config::Config, state::AppState, Sweeper};
use relay_llm::RelayClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Missing API key aborts startup here
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting chat relay server");
    tracing::info!(
        base_url = %config.upstream.base_url,
        model = %config.upstream.model,
        "Upstream configured"
    );

    // Initialize relay client
    let relay = RelayClient::builder()
        .api_key(config.api_key.clone())
        .base_url(config.upstream.base_url.clone())
        .model(config.upstream.model.clone())
        .timeout(config.upstream.timeout())
        .build()?;

    // Conversation store
    let store = config
        .conversations
        .build_store()
        .map_err(|e| anyhow::anyhow!("Failed to read system prompt file: {}", e))?;
    let store = Arc::new(store);

    let sweeper = Sweeper::spawn(
        store.clone(),
        config.conversations.sweep_interval(),
        config.conversations.max_age_hours,
    );

    let state = Arc::new(AppState::new(config.clone(), store, Arc::new(relay)));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Status: http://{}/status", addr);
    tracing::info!("Chat:   POST http://{}/chat", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
