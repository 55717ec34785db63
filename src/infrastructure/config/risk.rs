//! Safety gate thresholds.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::safety::RiskLimits;

/// Risk configuration. Fractions are of NAV.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_portfolio_notional_cap")]
    pub portfolio_notional_cap: Decimal,
    #[serde(default = "default_daily_loss_cap")]
    pub daily_loss_cap: Decimal,
    /// Peak-to-trough drawdown at which trading stops.
    #[serde(default = "default_mdd_brake")]
    pub mdd_brake: Decimal,
    #[serde(default = "default_per_trade_risk_max")]
    pub per_trade_risk_max: Decimal,
    #[serde(default = "default_max_clock_skew_ms")]
    pub max_clock_skew_ms: u64,
}

fn default_portfolio_notional_cap() -> Decimal {
    Decimal::new(12, 2)
}

fn default_daily_loss_cap() -> Decimal {
    Decimal::new(2, 2)
}

fn default_mdd_brake() -> Decimal {
    Decimal::new(7, 2)
}

fn default_per_trade_risk_max() -> Decimal {
    Decimal::new(5, 3)
}

const fn default_max_clock_skew_ms() -> u64 {
    100
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            portfolio_notional_cap: default_portfolio_notional_cap(),
            daily_loss_cap: default_daily_loss_cap(),
            mdd_brake: default_mdd_brake(),
            per_trade_risk_max: default_per_trade_risk_max(),
            max_clock_skew_ms: default_max_clock_skew_ms(),
        }
    }
}

impl From<&RiskConfig> for RiskLimits {
    fn from(config: &RiskConfig) -> Self {
        Self {
            portfolio_notional_cap: config.portfolio_notional_cap,
            daily_loss_cap: config.daily_loss_cap,
            mdd_brake: config.mdd_brake,
            per_trade_risk_max: config.per_trade_risk_max,
            max_clock_skew_ms: config.max_clock_skew_ms,
        }
    }
}
