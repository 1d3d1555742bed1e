//! Dashvar - Main Entry Point
//!
//! Loads a dashboard definition, resolves every query variable once and
//! prints the resulting variable states as JSON.
//!
//! The definition path is the first argument, or `DASHVAR_DEFINITION`.
//! Logging is configured through `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use dashvar_domain::QueryVariableState;
use dashvar_infrastructure::{Dashboard, SystemClock, load_definition};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFINITION_ENV: &str = "DASHVAR_DEFINITION";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(DEFINITION_ENV).ok())
        .map(PathBuf::from)
        .ok_or_else(|| format!("usage: dashvar <definition.yaml|json> (or set {DEFINITION_ENV})"))?;

    tracing::info!(
        path = %path.display(),
        "Starting Dashvar v{}",
        env!("CARGO_PKG_VERSION")
    );

    let definition = load_definition(&path).await?;
    let dashboard = Dashboard::build(definition, Arc::new(SystemClock::new()))?;

    for (name, result) in dashboard.resolve_all().await {
        match result {
            Ok(()) => tracing::info!(variable = %name, "variable resolved"),
            Err(error) => tracing::warn!(variable = %name, %error, "variable could not be resolved"),
        }
    }

    let states: Vec<QueryVariableState> = dashboard.variables().iter().map(|v| v.state()).collect();
    println!("{}", serde_json::to_string_pretty(&states)?);

    Ok(())
}
