//! deal-watch: run-once entrypoint.
//! Loads config, runs every source once, exits. Scheduling is external
//! (cron / systemd timer) at the same cadence as the freshness window.

use std::process::ExitCode;

use deal_watch::bootstrap::run_guarded;
use deal_watch::config::AppConfig;
use deal_watch::telemetry::Metrics;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for log shippers.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deal_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "invalid configuration; nothing ran");
            return ExitCode::from(2);
        }
    };

    let metrics = match &cfg.metrics_textfile {
        Some(_) => match Metrics::init() {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = ?e, "metrics disabled");
                None
            }
        },
        None => None,
    };

    let report = match run_guarded(&cfg).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            info!("previous run still active; exiting");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!(error = ?e, "run setup failed");
            return ExitCode::from(2);
        }
    };

    if let (Some(m), Some(path)) = (&metrics, &cfg.metrics_textfile) {
        if let Err(e) = m.write_textfile(path) {
            warn!(error = ?e, path = %path.display(), "metrics textfile not written");
        }
    }

    let failed = report.failed_sources();
    if cfg.strict_exit && !failed.is_empty() {
        warn!(?failed, "strict exit: source failures reported as process failure");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
