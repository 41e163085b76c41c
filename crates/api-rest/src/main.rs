//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, with OpenAPI/Swagger UI at `/swagger-ui`.
//!
//! ## Intended use
//! Useful during development. The workspace's `bloodbank-run` binary runs the same router after
//! loading `.env`.

use api_rest::{router, AppState};
use bloodbank_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the blood bank REST API server
///
/// # Environment Variables
/// - `BLOODBANK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `BLOODBANK_DATA_DIR`: Storage root (default: "blood_bank_data")
/// - `BLOODBANK_FACILITY`: Facility label (default: "bloodbank.dev.1")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the storage layout cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("bloodbank_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("BLOODBANK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_values(
        std::env::var("BLOODBANK_DATA_DIR").ok(),
        std::env::var("BLOODBANK_FACILITY").ok(),
    )?);

    tracing::info!(
        "-- Starting blood bank REST API on {} (data dir {}, facility {})",
        addr,
        cfg.data_dir().display(),
        cfg.facility()
    );

    let app = router(AppState::new(cfg)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
