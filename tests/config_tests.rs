mod support;

use ordergate::error::{ConfigError, Error};
use ordergate::infrastructure::config::Config;
use ordergate::testkit::config::MINIMAL_TOML;
use rust_decimal_macros::dec;
use support::config::write_temp_config;

#[test]
fn minimal_config_loads_from_file() {
    let file = write_temp_config(MINIMAL_TOML);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.reconcile.interval_secs, 1);
    assert_eq!(config.venues.len(), 1);
    assert_eq!(config.risk.mdd_brake, dec!(0.07));
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/definitely/not/here/ordergate.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn config_rejects_queue_position_outside_unit_interval() {
    let toml = r#"
[[venues]]
name = "binance"
taker_fee = 0.001
p99_latency_ms = 20
queue_position = 1.2
"#;
    let file = write_temp_config(toml);
    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "venues.queue_position",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid queue position, got {err}"),
        Ok(_) => panic!("Expected queue position 1.2 to be rejected"),
    }
}

#[test]
fn config_rejects_empty_venue_name() {
    let toml = r#"
[[venues]]
name = " "
taker_fee = 0.001
p99_latency_ms = 20
queue_position = 0.5
"#;
    let file = write_temp_config(toml);
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::MissingField {
            field: "venues.name"
        }))
    ));
}

#[test]
fn config_rejects_zero_caps() {
    for (toml, field) in [
        ("[router]\nmax_latency_ms = 0\n", "max_latency_ms"),
        ("[reconcile]\ninterval_secs = 0\n", "interval_secs"),
        ("[idempotency]\nttl_secs = 0\n", "ttl_secs"),
        ("[risk]\nper_trade_risk_max = 0\n", "per_trade_risk_max"),
        ("[clock]\nmax_age_ms = 0\n", "max_age_ms"),
    ] {
        match Config::parse_toml(toml) {
            Err(Error::Config(ConfigError::InvalidValue { field: f, .. })) => {
                assert_eq!(f, field);
            }
            other => panic!("Expected {field} to be rejected, got {other:?}"),
        }
    }
}

#[test]
fn negative_queue_weight_is_rejected() {
    let err = Config::parse_toml("[router]\nqueue_weight = -0.1\n").unwrap_err();
    assert!(err.to_string().contains("queue_weight"));
}
