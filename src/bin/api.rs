use clau_advisor::{
    api::{start_server, ApiState},
    backend::HttpAdviceBackend,
    chat::ChatSession,
    config::ClientConfig,
    insights::InsightsGenerator,
    state::ConversationStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;

    info!("Clau Advisor - API Server");
    info!("Port: {}", config.port);
    info!("Advice backend: {}", config.backend_url);

    // Create components
    let backend = Arc::new(HttpAdviceBackend::new(&config.backend_url, config.request_timeout)?);
    let store = ConversationStore::shared();

    let state = ApiState {
        chat: Arc::new(ChatSession::new(store.clone(), backend.clone())),
        insights: Arc::new(InsightsGenerator::new(store.clone(), backend)),
        store,
    };

    info!("Conversation store initialized");

    start_server(state, config.port).await?;

    Ok(())
}
