//! `ordergate route`

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::RouteArgs;
use super::{load_config, output};
use crate::application::router::VenueRouter;
use crate::error::Result;

#[derive(Tabled)]
struct VenueRow {
    #[tabled(rename = "Venue")]
    name: String,
    #[tabled(rename = "Net fee")]
    net_fee: String,
    #[tabled(rename = "p99 ms")]
    latency: u32,
    #[tabled(rename = "Queue")]
    queue: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Eligible")]
    eligible: &'static str,
}

/// Score every configured venue and report the best one within the cap.
///
/// Fails with a routing error when no venue is fast enough.
pub fn execute(args: &RouteArgs, as_json: bool) -> Result<()> {
    let config = load_config(&args.config)?;
    let cap = args.max_latency_ms.unwrap_or(config.router.max_latency_ms);
    let router = VenueRouter::new(config.router.weights());
    let venues = config.venue_profiles();
    let best = router.pick_best(&venues, cap);

    if as_json {
        let scored: Vec<_> = venues
            .iter()
            .map(|v| {
                json!({
                    "venue": v.name,
                    "score": router.score(v),
                    "eligible": v.p99_latency_ms <= cap,
                })
            })
            .collect();
        output::json(&json!({
            "command": "route",
            "max_latency_ms": cap,
            "venues": scored,
            "best": best.as_ref().ok().map(|v| v.name.as_str()),
        }))?;
        best?;
        return Ok(());
    }

    let rows: Vec<VenueRow> = venues
        .iter()
        .map(|v| VenueRow {
            name: v.name.to_string(),
            net_fee: format!("{:.5}", v.net_fee()),
            latency: v.p99_latency_ms,
            queue: format!("{:.2}", v.queue_position),
            score: format!("{:.6}", router.score(v)),
            eligible: if v.p99_latency_ms <= cap { "yes" } else { "no" },
        })
        .collect();

    output::section(&format!("Venues (p99 cap {cap}ms)"));
    println!("{}", Table::new(rows));

    let best = best?;
    output::field("Best", &best.name);
    Ok(())
}
