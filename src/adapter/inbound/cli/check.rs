//! `ordergate check`

use serde_json::json;

use super::command::ConfigArg;
use super::{load_config, output};
use crate::error::Result;

/// Validate configuration and print its effective values.
pub fn execute(args: &ConfigArg, as_json: bool) -> Result<()> {
    let config = load_config(args)?;
    let source = args
        .config
        .as_ref()
        .map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string());

    if as_json {
        return output::json(&json!({
            "command": "check",
            "config": source,
            "valid": true,
            "risk": {
                "portfolio_notional_cap": config.risk.portfolio_notional_cap,
                "daily_loss_cap": config.risk.daily_loss_cap,
                "mdd_brake": config.risk.mdd_brake,
                "per_trade_risk_max": config.risk.per_trade_risk_max,
                "max_clock_skew_ms": config.risk.max_clock_skew_ms,
            },
            "venues": config.venues.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        }));
    }

    output::section("Configuration Check");
    output::field("Config", &source);
    output::success("Configuration is valid");

    output::section("Risk");
    output::field("Notional cap", config.risk.portfolio_notional_cap);
    output::field("Daily loss", config.risk.daily_loss_cap);
    output::field("MDD brake", config.risk.mdd_brake);
    output::field("Per trade", config.risk.per_trade_risk_max);
    output::field("Clock skew", format!("{}ms", config.risk.max_clock_skew_ms));

    output::section("Runtime");
    output::field("Max latency", format!("{}ms", config.router.max_latency_ms));
    output::field("Reconcile", format!("every {}s", config.reconcile.interval_secs));
    output::field("Idem TTL", format!("{}s", config.idempotency.ttl_secs));
    output::field(
        "Venues",
        config
            .venues
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );
    Ok(())
}
