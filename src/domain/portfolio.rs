//! Read-only portfolio snapshot consumed by the safety gate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio figures the guardrails are expressed against.
///
/// All values are non-negative except `day_pnl_nav`, which is negative on a
/// losing day. `*_nav` fields are fractions of NAV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub nav: Decimal,
    pub open_notional: Decimal,
    pub day_pnl_nav: Decimal,
    pub drawdown_nav: Decimal,
}

impl Portfolio {
    /// A flat portfolio with the given NAV.
    #[must_use]
    pub fn flat(nav: Decimal) -> Self {
        Self {
            nav,
            ..Self::default()
        }
    }
}
