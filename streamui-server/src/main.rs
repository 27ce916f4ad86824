use anyhow::Context;
use std::sync::Arc;
use streamui_models::OpenAIChatModel;
use streamui_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,streamui=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    streamui_tools::validate_catalog().context("tool catalog is invalid")?;

    let config = ServerConfig::from_env().context("failed to load configuration")?;
    let model = OpenAIChatModel::from_config(&config.model, &config.provider)
        .context("failed to configure the completion provider")?;

    tracing::info!(
        model = %config.model,
        stream_completions = config.stream_completions,
        "Starting streamui server"
    );

    streamui_server::serve(&config, Arc::new(model)).await?;
    Ok(())
}
