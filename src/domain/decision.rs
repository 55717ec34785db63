//! Trade decisions and safety-gate verdicts.
//!
//! A [`Decision`] arrives from the external decision layer. The safety gate
//! turns it into a [`Verdict`]: either an [`ApprovedDecision`], the only
//! token the OMS accepts for submission, or a [`VetoedDecision`], which is
//! frozen with the first failing check's reason.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Annotation key the safety gate stamps on approved decisions.
pub const SAFETY_GATE_TS: &str = "safety_gate_ts";

/// An enriched trade decision awaiting the safety gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Fraction of NAV at risk on this trade.
    pub risk_size_nav: Decimal,
    /// Estimated notional the trade adds to open exposure.
    pub notional_estimate: Decimal,
    /// Skew between the decision's clock and ours, signed.
    pub clock_skew_ms: i64,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

impl Decision {
    #[must_use]
    pub fn new(risk_size_nav: Decimal, notional_estimate: Decimal, clock_skew_ms: i64) -> Self {
        Self {
            risk_size_nav,
            notional_estimate,
            clock_skew_ms,
            annotations: BTreeMap::new(),
        }
    }

    /// Add an audit annotation.
    pub fn annotate(&mut self, key: impl Into<String>, value: impl ToString) {
        self.annotations.insert(key.into(), value.to_string());
    }

    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    #[must_use]
    pub const fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

/// Reason a decision was vetoed. Variant order mirrors the gate's check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VetoReason {
    PerTradeRiskExceeded,
    PortfolioNotionalCap,
    DailyLossCap,
    #[serde(rename = "MDDBrake")]
    MddBrake,
    ClockSkew,
}

impl VetoReason {
    /// Stable reason string used in logs and audit trails.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerTradeRiskExceeded => "PerTradeRiskExceeded",
            Self::PortfolioNotionalCap => "PortfolioNotionalCap",
            Self::DailyLossCap => "DailyLossCap",
            Self::MddBrake => "MDDBrake",
            Self::ClockSkew => "ClockSkew",
        }
    }
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision that passed every safety check.
///
/// Only the safety gate can construct one, and `Oms::submit` consumes it,
/// so each approval admits at most one order.
///
/// ```compile_fail
/// fn reusable<T: Clone>() {}
/// reusable::<ordergate::domain::ApprovedDecision>();
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ApprovedDecision {
    decision: Decision,
}

impl ApprovedDecision {
    pub(crate) fn new(decision: Decision) -> Self {
        Self { decision }
    }

    #[must_use]
    pub const fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Gate timestamp in epoch milliseconds.
    #[must_use]
    pub fn gated_at_ms(&self) -> Option<i64> {
        self.decision
            .annotation(SAFETY_GATE_TS)
            .and_then(|ts| ts.parse().ok())
    }
}

/// A decision frozen by a failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoedDecision {
    decision: Decision,
    reason: VetoReason,
}

impl VetoedDecision {
    pub(crate) fn new(decision: Decision, reason: VetoReason) -> Self {
        Self { decision, reason }
    }

    #[must_use]
    pub const fn decision(&self) -> &Decision {
        &self.decision
    }

    #[must_use]
    pub const fn reason(&self) -> VetoReason {
        self.reason
    }
}

/// Outcome of the safety gate.
#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Approved(ApprovedDecision),
    Vetoed(VetoedDecision),
}

impl Verdict {
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    #[must_use]
    pub const fn veto_reason(&self) -> Option<VetoReason> {
        match self {
            Self::Vetoed(v) => Some(v.reason),
            Self::Approved(_) => None,
        }
    }

    #[must_use]
    pub const fn decision(&self) -> &Decision {
        match self {
            Self::Approved(a) => &a.decision,
            Self::Vetoed(v) => &v.decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn veto_reason_strings_are_stable() {
        assert_eq!(VetoReason::MddBrake.to_string(), "MDDBrake");
        assert_eq!(
            serde_json::to_string(&VetoReason::MddBrake).unwrap(),
            "\"MDDBrake\""
        );
    }

    #[test]
    fn annotations_accumulate() {
        let mut d = Decision::new(dec!(0.001), dec!(10), 0);
        d.annotate("source", "momentum");
        d.annotate(SAFETY_GATE_TS, 1_700_000_000_000_i64);
        assert_eq!(d.annotation("source"), Some("momentum"));
        let approved = ApprovedDecision::new(d);
        assert_eq!(approved.gated_at_ms(), Some(1_700_000_000_000));
    }

    #[test]
    fn verdict_exposes_reason() {
        let d = Decision::new(dec!(0.5), dec!(10), 0);
        let verdict = Verdict::Vetoed(VetoedDecision::new(d, VetoReason::PerTradeRiskExceeded));
        assert!(!verdict.is_approved());
        assert_eq!(verdict.veto_reason(), Some(VetoReason::PerTradeRiskExceeded));
    }
}
