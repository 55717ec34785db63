//! Pre-commit safety gate.
//!
//! Applies portfolio-level guardrails to a decision immediately before it may
//! reach the OMS. Checks run in a fixed order and stop at the first failure,
//! so the reported reason is deterministic when several limits are breached
//! at once:
//!
//! 1. per-trade risk clamp
//! 2. aggregate exposure after this decision
//! 3. daily loss cap
//! 4. drawdown brake
//! 5. clock skew
//!
//! The gate is pure: identical inputs always produce the identical verdict.

use rust_decimal::Decimal;

use crate::domain::decision::SAFETY_GATE_TS;
use crate::domain::{ApprovedDecision, Decision, Portfolio, Verdict, VetoReason, VetoedDecision};

/// Guardrail thresholds, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskLimits {
    /// Max open notional as a fraction of NAV.
    pub portfolio_notional_cap: Decimal,
    /// Max daily loss as a fraction of NAV.
    pub daily_loss_cap: Decimal,
    /// Drawdown fraction at which trading stops.
    pub mdd_brake: Decimal,
    /// Max risk per trade as a fraction of NAV.
    pub per_trade_risk_max: Decimal,
    pub max_clock_skew_ms: u64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            portfolio_notional_cap: Decimal::new(12, 2), // 12% NAV
            daily_loss_cap: Decimal::new(2, 2),          // 2% NAV
            mdd_brake: Decimal::new(7, 2),               // 7% peak-to-trough
            per_trade_risk_max: Decimal::new(5, 3),      // 0.5% NAV
            max_clock_skew_ms: 100,
        }
    }
}

/// Run the five checks against `decision`.
///
/// On approval the decision is annotated with `safety_gate_ts = now_ms`.
/// A vetoed decision carries no further annotations.
#[must_use]
pub fn evaluate(
    mut decision: Decision,
    portfolio: &Portfolio,
    limits: &RiskLimits,
    now_ms: i64,
) -> Verdict {
    if let Some(reason) = first_breach(&decision, portfolio, limits) {
        return Verdict::Vetoed(VetoedDecision::new(decision, reason));
    }
    decision.annotate(SAFETY_GATE_TS, now_ms);
    Verdict::Approved(ApprovedDecision::new(decision))
}

fn first_breach(
    decision: &Decision,
    portfolio: &Portfolio,
    limits: &RiskLimits,
) -> Option<VetoReason> {
    if decision.risk_size_nav > limits.per_trade_risk_max {
        return Some(VetoReason::PerTradeRiskExceeded);
    }

    let future_notional = portfolio.open_notional + decision.notional_estimate;
    if future_notional > limits.portfolio_notional_cap * portfolio.nav {
        return Some(VetoReason::PortfolioNotionalCap);
    }

    if portfolio.day_pnl_nav <= -limits.daily_loss_cap {
        return Some(VetoReason::DailyLossCap);
    }

    if portfolio.drawdown_nav >= limits.mdd_brake {
        return Some(VetoReason::MddBrake);
    }

    if decision.clock_skew_ms.unsigned_abs() > limits.max_clock_skew_ms {
        return Some(VetoReason::ClockSkew);
    }

    None
}

/// Safety gate bound to a fixed set of limits.
///
/// Stateless beyond its configuration; safe to share across any number of
/// concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyGate {
    limits: RiskLimits,
}

impl SafetyGate {
    #[must_use]
    pub const fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    #[must_use]
    pub fn evaluate(&self, decision: Decision, portfolio: &Portfolio, now_ms: i64) -> Verdict {
        evaluate(decision, portfolio, &self.limits, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits() -> RiskLimits {
        RiskLimits {
            portfolio_notional_cap: dec!(0.5),
            daily_loss_cap: dec!(0.1),
            mdd_brake: dec!(0.2),
            per_trade_risk_max: dec!(0.01),
            max_clock_skew_ms: 100,
        }
    }

    fn portfolio() -> Portfolio {
        Portfolio::flat(dec!(100))
    }

    #[test]
    fn per_trade_risk_veto() {
        let d = Decision::new(dec!(0.02), dec!(0), 0);
        let verdict = evaluate(d, &portfolio(), &limits(), 1);
        assert_eq!(verdict.veto_reason(), Some(VetoReason::PerTradeRiskExceeded));
    }

    #[test]
    fn safe_decision_passes_and_is_stamped() {
        let d = Decision::new(dec!(0.01), dec!(10), 0);
        let verdict = evaluate(d, &portfolio(), &limits(), 42);
        let Verdict::Approved(approved) = verdict else {
            panic!("expected approval");
        };
        assert_eq!(approved.gated_at_ms(), Some(42));
    }

    #[test]
    fn notional_cap_is_inclusive() {
        // 40 + 10 = 50 = 0.5 * 100, exactly at the cap
        let p = Portfolio {
            open_notional: dec!(40),
            ..portfolio()
        };
        assert!(evaluate(Decision::new(dec!(0), dec!(10), 0), &p, &limits(), 0).is_approved());
        let verdict = evaluate(Decision::new(dec!(0), dec!(10.01), 0), &p, &limits(), 0);
        assert_eq!(verdict.veto_reason(), Some(VetoReason::PortfolioNotionalCap));
    }

    #[test]
    fn daily_loss_cap_triggers_at_equality() {
        let p = Portfolio {
            day_pnl_nav: dec!(-0.1),
            ..portfolio()
        };
        let verdict = evaluate(Decision::new(dec!(0), dec!(0), 0), &p, &limits(), 0);
        assert_eq!(verdict.veto_reason(), Some(VetoReason::DailyLossCap));
    }

    #[test]
    fn drawdown_brake_triggers_at_equality() {
        let p = Portfolio {
            drawdown_nav: dec!(0.2),
            ..portfolio()
        };
        let verdict = evaluate(Decision::new(dec!(0), dec!(0), 0), &p, &limits(), 0);
        assert_eq!(verdict.veto_reason(), Some(VetoReason::MddBrake));
    }

    #[test]
    fn negative_clock_skew_counts() {
        let verdict = evaluate(Decision::new(dec!(0), dec!(0), -101), &portfolio(), &limits(), 0);
        assert_eq!(verdict.veto_reason(), Some(VetoReason::ClockSkew));
        assert!(evaluate(Decision::new(dec!(0), dec!(0), -100), &portfolio(), &limits(), 0)
            .is_approved());
    }

    #[test]
    fn vetoed_decision_is_not_annotated() {
        let verdict = evaluate(Decision::new(dec!(1), dec!(0), 0), &portfolio(), &limits(), 7);
        assert!(verdict.decision().annotation(SAFETY_GATE_TS).is_none());
    }
}
