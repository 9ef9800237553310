use anyhow::Context;
use platebook_server::config::Config;
use platebook_server::{api, app, db, telemetry};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .context("Failed to serialize OpenAPI spec")?;
        println!("{}", spec);
        return Ok(());
    }

    telemetry::init_telemetry()?;

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.pool_size)?;
    let app = app(Arc::new(pool));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
