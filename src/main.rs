//! Readiness prober entrypoint.
//!
//! Polls the server's capability endpoints until ready or out of budget,
//! writes the readiness marker, then replaces itself with whatever command
//! follows on the command line:
//!
//! ```bash
//! MAX_TIMEOUT=120 geoharness cargo test --test acceptance_tests -- --ignored
//! ```
//!
//! The downstream command runs even when some endpoints never came up, so a
//! broken deployment shows up as test failures rather than a silent gate.

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoharness::config::Config;
use geoharness::probe::{exec_downstream, gate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoharness=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(?config, "starting readiness probe");

    let report = gate(&config).await?;
    if report.all_ready() {
        tracing::info!(ready = ?report.ready, "all services ready");
    } else {
        tracing::warn!(
            ready = ?report.ready,
            timed_out = ?report.timed_out,
            "probe finished with unavailable services"
        );
    }
    tracing::info!(marker = %config.readiness_marker.display(), "readiness marker written");

    let downstream: Vec<String> = env::args().skip(1).collect();
    if downstream.is_empty() {
        return Ok(());
    }

    tracing::info!(command = %downstream.join(" "), "handing off to downstream command");
    // Only returns on failure to launch.
    Err(exec_downstream(&downstream).into())
}
