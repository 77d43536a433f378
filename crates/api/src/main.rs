use anyhow::Context;

use stockbook_infra::LedgerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockbook_observability::init();

    let config = LedgerConfig::from_env()?;
    let bind_addr = config.bind_addr;
    tracing::info!(data_file = %config.data_file.display(), "ledger log configured");

    let app = stockbook_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
