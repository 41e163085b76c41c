use api_rest::{router, AppState};
use bloodbank_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the blood bank application
///
/// Loads `.env`, resolves configuration once and serves the REST API (with Swagger UI at
/// `/swagger-ui`) until the process is stopped.
///
/// # Environment Variables
/// - `BLOODBANK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `BLOODBANK_DATA_DIR`: Directory for record storage (default: "blood_bank_data")
/// - `BLOODBANK_FACILITY`: Facility label (default: "bloodbank.dev.1")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bloodbank_run=info".parse()?)
                .add_directive("bloodbank_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("BLOODBANK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_values(
        std::env::var("BLOODBANK_DATA_DIR").ok(),
        std::env::var("BLOODBANK_FACILITY").ok(),
    )?);

    tracing::info!("++ Starting blood bank REST on {}", rest_addr);
    tracing::info!(
        "++ Data dir {} for facility {}",
        cfg.data_dir().display(),
        cfg.facility()
    );

    let app = router(AppState::new(cfg)?);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
