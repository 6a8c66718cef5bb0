use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use llm_playground::client::GenerationClient;
use llm_playground::config::PlaygroundConfig;
use llm_playground::playground::Playground;
use llm_playground::web::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlaygroundConfig::from_env()?;

    println!("🚀 Starting LLM playground...");

    // -----------------------------
    // Shared state
    // -----------------------------
    let client = GenerationClient::new(config.backend_url.clone());
    let playground = Arc::new(Playground::new(client));
    let state = AppState { playground };

    let app = web::app(state);

    info!(backend = %config.backend_url, "generation backend configured");
    println!("🌐 Playground at http://{}", config.bind_addr);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
