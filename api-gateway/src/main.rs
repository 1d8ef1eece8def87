use api_gateway::config::GatewayConfig;
use api_gateway::startup::Application;
use dotenvy::dotenv;
use service_core::observability::{init_metrics, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("api-gateway", "info", otlp_endpoint.as_deref());

    init_metrics();

    let configuration = GatewayConfig::load().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let app = Application::build(configuration).await.map_err(|e| {
        tracing::error!("Failed to start api-gateway: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    info!("api-gateway shutdown complete");
    Ok(())
}
