//! Shared host types: holdings and recorded orders.

use std::fmt;

use screenbook::Symbol;

/// One entry of the host's portfolio view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub symbol: Symbol,
    /// True while the position is non-zero.
    pub invested: bool,
}

/// An order instruction issued to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostOrder {
    /// Move the position to `weight` of total portfolio value.
    TargetWeight { symbol: Symbol, weight: f64 },
    /// Close the position entirely.
    Liquidate { symbol: Symbol },
}

impl HostOrder {
    pub fn symbol(&self) -> Symbol {
        match *self {
            HostOrder::TargetWeight { symbol, .. } | HostOrder::Liquidate { symbol } => symbol,
        }
    }
}

impl fmt::Display for HostOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOrder::TargetWeight { symbol, weight } => {
                write!(f, "TARGET {symbol} {:.2}%", weight * 100.0)
            }
            HostOrder::Liquidate { symbol } => write!(f, "LIQUIDATE {symbol}"),
        }
    }
}
