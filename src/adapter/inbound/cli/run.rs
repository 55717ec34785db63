//! `ordergate run`

use tokio::sync::watch;
use tracing::{error, info};

use super::command::RunArgs;
use super::{load_config, output};
use crate::error::Result;
use crate::infrastructure::bootstrap;

/// Reconcile paper venues, once or on schedule until ctrl-c.
///
/// A dry run: the ledger starts empty and no real venue is contacted.
pub async fn execute(args: &RunArgs, as_json: bool) -> Result<()> {
    let config = load_config(&args.config)?;
    config.init_logging();
    info!(once = args.once, venues = config.venues.len(), "ordergate starting");

    let plane = bootstrap::build_paper(&config);

    if args.once {
        let result = plane.reconciler.reconcile_all().await;
        plane.shutdown().await;
        let report = result?;
        if as_json {
            return output::json(&report);
        }
        output::section("Reconciliation");
        output::warning("Dry run: empty in-memory ledger against paper venues");
        output::field("Cancelled", report.cancelled_stale);
        output::field("Replaced", report.replaced);
        output::field("Ack synced", report.ack_synced);
        output::field("Skipped", report.skipped);
        if report.unreachable_venues.is_empty() {
            output::success("All venues reachable");
        } else {
            output::warning(&format!(
                "Unreachable: {}",
                report
                    .unreachable_venues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut handle = tokio::spawn(plane.scheduler(&config).run(shutdown_rx));

    tokio::select! {
        result = &mut handle => {
            if let Err(e) = result {
                error!(error = %e, "Scheduler task failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            if let Err(e) = handle.await {
                error!(error = %e, "Scheduler task failed");
            }
        }
    }

    plane.shutdown().await;
    info!("ordergate stopped");
    Ok(())
}
