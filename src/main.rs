use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use storefront_api::config::AppConfig;
use storefront_api::database::{connection::get_db_client, MongoStore};
use storefront_api::services::stripe_service::StripeService;
use storefront_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!("🔧 Configuration loaded: {}", config.get_config_info());

    let app_state = initialize_app_state(config).await?;
    app_state
        .uploads
        .ensure_dir()
        .await
        .context("failed to create upload directory")?;

    let addr: SocketAddr = format!("{}:{}", app_state.config.host, app_state.config.port)
        .parse()
        .context("HOST/PORT do not form a socket address")?;

    let app = build_router(app_state);
    start_server(app, addr).await
}

async fn initialize_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let db = get_db_client(&config)
        .await
        .context("failed to connect to MongoDB")?;
    let store = Arc::new(MongoStore::new(db));

    let stripe = StripeService::new(&config).context("failed to build Stripe client")?;
    if config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will be rejected");
    }
    tracing::info!("✅ Stripe checkout initialized");

    Ok(AppState::new(config, store, Arc::new(stripe)))
}

async fn start_server(app: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
