use anyhow::Context;
use launchpad_pipeline::{PipelineConfig, ProcessRunner, StandardPipelineService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "launchpad_server=debug,launchpad_pipeline=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Launchpad server...");

    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    tracing::info!(
        "Target: project={}, cluster={} ({}), registry={}, work_dir={}",
        config.project_id,
        config.cluster_name,
        config.zone,
        config.registry,
        config.work_dir.display()
    );

    let pipeline = StandardPipelineService::new(Arc::new(config), Arc::new(ProcessRunner::new()));
    let app = api::create_router(api::AppState::new(Arc::new(pipeline)));

    // Get bind address
    let addr =
        std::env::var("LAUNCHPAD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
