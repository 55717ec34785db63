//! Canonical test configurations.

use crate::application::safety::RiskLimits;
use crate::infrastructure::config::Config;
use rust_decimal_macros::dec;

/// Round-number limits that make boundary tests easy to read.
pub fn limits() -> RiskLimits {
    RiskLimits {
        portfolio_notional_cap: dec!(0.5),
        daily_loss_cap: dec!(0.1),
        mdd_brake: dec!(0.2),
        per_trade_risk_max: dec!(0.01),
        max_clock_skew_ms: 100,
    }
}

/// Minimal valid TOML with a single fast venue named `binance`.
pub const MINIMAL_TOML: &str = r#"
[logging]
level = "warn"
format = "pretty"

[reconcile]
interval_secs = 1
venue_timeout_ms = 100

[[venues]]
name = "binance"
taker_fee = 0.001
p99_latency_ms = 20
queue_position = 0.5
"#;

/// Parsed [`MINIMAL_TOML`].
pub fn minimal() -> Config {
    match Config::parse_toml(MINIMAL_TOML) {
        Ok(config) => config,
        Err(e) => panic!("minimal test config is invalid: {e}"),
    }
}
