//! Exit rules for open positions: membership, stop loss, take profit.

use std::fmt;

/// Why a holding is being liquidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ExitReason {
    /// No longer in the selected set.
    NotSelected,
    /// Price fell to or below the stop-loss threshold.
    StopLoss,
    /// Price rose to or above the take-profit threshold.
    TakeProfit,
}

impl ExitReason {
    /// True for the two price-threshold exits.
    pub fn is_price_exit(self) -> bool {
        matches!(self, ExitReason::StopLoss | ExitReason::TakeProfit)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::NotSelected => write!(f, "not selected"),
            ExitReason::StopLoss => write!(f, "stop loss"),
            ExitReason::TakeProfit => write!(f, "take profit"),
        }
    }
}

/// Price-change thresholds, as fractions of the buy price.
///
/// Both boundaries are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExitRule {
    /// Negative, e.g. -0.10 sells after a 10% drop.
    pub stop_loss: f64,
    /// Positive, e.g. 0.25 sells after a 25% gain.
    pub take_profit: f64,
}

impl Default for ExitRule {
    fn default() -> Self {
        Self {
            stop_loss: -0.10,
            take_profit: 0.25,
        }
    }
}

impl ExitRule {
    /// Decide whether a holding should be liquidated.
    ///
    /// Membership is checked first, so a holding that is both unselected and
    /// past a threshold reports `NotSelected`.
    pub fn evaluate(&self, selected: bool, price_change: f64) -> Option<ExitReason> {
        if !selected {
            Some(ExitReason::NotSelected)
        } else if price_change <= self.stop_loss {
            Some(ExitReason::StopLoss)
        } else if price_change >= self.take_profit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}

/// Fractional change from `buy_cents` to `current_cents`.
///
/// With no recorded (or a non-positive) buy price the current price stands
/// in for it, so the change is zero.
pub fn price_change(current_cents: i64, buy_cents: Option<i64>) -> f64 {
    match buy_cents {
        Some(buy) if buy > 0 => (current_cents - buy) as f64 / buy as f64,
        _ => 0.0,
    }
}
