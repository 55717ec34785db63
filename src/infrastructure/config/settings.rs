//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all control-plane
//! settings. Every section is optional; omitted values take the defaults
//! documented on each section.
//!
//! # Example
//!
//! ```no_run
//! use ordergate::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::clock::ClockConfig;
use super::idempotency::IdempotencyConfig;
use super::logging::LoggingConfig;
use super::reconcile::ReconcileConfig;
use super::risk::RiskConfig;
use super::router::RouterConfig;
use super::venue::{default_venues, VenueConfig};
use crate::domain::Venue;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file with [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Both validate before returning.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Safety gate thresholds.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Event freshness limits on the admission path.
    #[serde(default)]
    pub clock: ClockConfig,

    #[serde(default)]
    pub idempotency: IdempotencyConfig,

    /// Venue scoring weights and latency cap.
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Venues available for routing, in tie-break order.
    #[serde(default = "default_venues")]
    pub venues: Vec<VenueConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            risk: RiskConfig::default(),
            clock: ClockConfig::default(),
            idempotency: IdempotencyConfig::default(),
            router: RouterConfig::default(),
            reconcile: ReconcileConfig::default(),
            venues: default_venues(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Routing profiles of the configured venues.
    #[must_use]
    pub fn venue_profiles(&self) -> Vec<Venue> {
        self.venues.iter().map(Venue::from).collect()
    }

    /// Check that every value is within its acceptable range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field,
    /// or [`ConfigError::MissingField`] for an unnamed venue.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        for (field, value) in [
            ("portfolio_notional_cap", risk.portfolio_notional_cap),
            ("daily_loss_cap", risk.daily_loss_cap),
            ("mdd_brake", risk.mdd_brake),
            ("per_trade_risk_max", risk.per_trade_risk_max),
        ] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(invalid(field, "must be greater than 0 and at most 1"));
            }
        }
        if risk.max_clock_skew_ms == 0 {
            return Err(invalid("max_clock_skew_ms", "must be greater than 0"));
        }

        if self.clock.max_skew_ms == 0 {
            return Err(invalid("max_skew_ms", "must be greater than 0"));
        }
        if self.clock.max_age_ms == 0 {
            return Err(invalid("max_age_ms", "must be greater than 0"));
        }

        let idem = &self.idempotency;
        if idem.ttl_secs == 0 {
            return Err(invalid("ttl_secs", "must be greater than 0"));
        }
        if idem.max_entries == 0 {
            return Err(invalid("max_entries", "must be greater than 0"));
        }
        if idem.gc_interval_secs == 0 {
            return Err(invalid("gc_interval_secs", "must be greater than 0"));
        }

        let router = &self.router;
        for (field, value) in [
            ("baseline_ms", router.baseline_ms),
            ("latency_weight", router.latency_weight),
            ("queue_weight", router.queue_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite number, 0 or greater"));
            }
        }
        if router.max_latency_ms == 0 {
            return Err(invalid("max_latency_ms", "must be greater than 0"));
        }

        if self.reconcile.interval_secs == 0 {
            return Err(invalid("interval_secs", "must be greater than 0"));
        }
        if self.reconcile.venue_timeout_ms == 0 {
            return Err(invalid("venue_timeout_ms", "must be greater than 0"));
        }

        self.validate_venues()
    }

    #[allow(clippy::result_large_err)]
    fn validate_venues(&self) -> Result<()> {
        if self.venues.is_empty() {
            return Err(ConfigError::MissingField { field: "venues" }.into());
        }
        let mut seen = HashSet::new();
        for venue in &self.venues {
            if venue.name.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "venues.name" }.into());
            }
            if !seen.insert(venue.name.as_str()) {
                return Err(invalid("venues.name", format!("duplicate venue {}", venue.name)));
            }
            if !(0.0..=1.0).contains(&venue.queue_position) {
                return Err(invalid("venues.queue_position", "must be between 0 and 1"));
            }
            if !venue.taker_fee.is_finite() || !venue.maker_rebate.is_finite() {
                return Err(invalid("venues.taker_fee", "fees must be finite"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_takes_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.risk.portfolio_notional_cap, dec!(0.12));
        assert_eq!(config.risk.per_trade_risk_max, dec!(0.005));
        assert_eq!(config.clock.max_age_ms, 500);
        assert_eq!(config.idempotency.ttl_secs, 86_400);
        assert_eq!(config.router.max_latency_ms, 50);
        assert_eq!(config.reconcile.interval_secs, 30);
        let names: Vec<_> = config.venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["BYBIT", "KRAKEN", "OKX"]);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse_toml(
            r#"
            [risk]
            mdd_brake = 0.1

            [router]
            max_latency_ms = 40

            [[venues]]
            name = "binance"
            taker_fee = 0.001
            p99_latency_ms = 20
            queue_position = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.risk.mdd_brake, dec!(0.1));
        assert_eq!(config.risk.daily_loss_cap, dec!(0.02));
        assert_eq!(config.router.max_latency_ms, 40);
        assert_eq!(config.venues.len(), 1);
        assert_eq!(config.venue_profiles()[0].maker_rebate, 0.0);
    }

    #[test]
    fn fraction_above_one_is_invalid() {
        let err = Config::parse_toml("[risk]\ndaily_loss_cap = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "daily_loss_cap",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_venue_names_are_invalid() {
        let toml = r#"
            [[venues]]
            name = "a"
            taker_fee = 0.001
            p99_latency_ms = 20
            queue_position = 0.5

            [[venues]]
            name = "a"
            taker_fee = 0.002
            p99_latency_ms = 30
            queue_position = 0.5
        "#;
        let err = Config::parse_toml(toml).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "venues.name",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[risk\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }
}
