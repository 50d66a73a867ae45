//! Company Intel Web Server
//!
//! Serves the company lookup endpoints over HTTP.
//!
//! ## Environment Variables
//!
//! - `COMPANY_INTEL_BIND_ADDR` (default `0.0.0.0:3010`)
//! - `COMPANY_INTEL_*` upstream overrides, see [`IntelConfig`]
//! - `RUST_LOG` (default `company_intel=info,tower_http=debug`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_intel::api::create_company_router;
use company_intel::{Aggregator, IntelConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_intel=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Company Intel server");

    let config = IntelConfig::from_env().context("Invalid configuration")?;
    let aggregator = Arc::new(Aggregator::from_config(&config).context("Failed to build sources")?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_company_router(aggregator)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_addr))?;

    tracing::info!("Company Intel server running on http://{}", addr);
    tracing::info!("  /company/full-details?companyID=  - Combined record");
    tracing::info!("  /rs/company-info?companyID=       - Revenue service record");
    tracing::info!("  /enreg/company-info?companyID=    - Business registry record");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return Err(e).with_context(|| format!("Failed to bind to {}", addr));
        }
    };

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
