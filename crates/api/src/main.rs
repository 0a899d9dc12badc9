use std::sync::Arc;

use anyhow::Context;

use stockroom_api::app::{self, services::AppServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let addr =
        std::env::var("STOCKROOM_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let services = match std::env::var("STOCKROOM_DB") {
        Ok(url) => AppServices::sqlite(&url).await?,
        Err(_) => {
            tracing::warn!("STOCKROOM_DB not set; using in-memory store (data is not persisted)");
            AppServices::in_memory()
        }
    };

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
