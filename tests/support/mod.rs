#![allow(dead_code)]

pub mod config;

use chrono::{DateTime, Utc};
use ordergate::application::safety::SafetyGate;
use ordergate::domain::{ApprovedDecision, Decision, Portfolio, Verdict};
use rust_decimal_macros::dec;

/// Run `decision` through a default gate against a roomy portfolio.
pub fn approve(decision: Decision) -> ApprovedDecision {
    match SafetyGate::default().evaluate(decision, &Portfolio::flat(dec!(1000000)), 0) {
        Verdict::Approved(approved) => approved,
        Verdict::Vetoed(vetoed) => panic!("expected approval, vetoed with {}", vetoed.reason()),
    }
}

/// Epoch seconds of `now`, millisecond precision.
pub fn epoch_secs(now: DateTime<Utc>) -> f64 {
    now.timestamp_millis() as f64 / 1000.0
}
