//! Market history file: instruments plus dated prices and fundamentals.
//!
//! ```json
//! {
//!   "instruments": [{ "ticker": "AAPL", "market": "usa" }],
//!   "days": [
//!     {
//!       "date": "2015-01-02",
//!       "prices": { "AAPL": 10933 },
//!       "fundamentals": { "AAPL": { "roe": 0.35, "...": 0.0, "sector": 103 } }
//!     }
//!   ]
//! }
//! ```
//!
//! Prices are cents. A ticker missing from a day's `fundamentals` has no
//! data that day.

use std::path::Path;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use screenbook::{FundamentalsSnapshot, Symbol};

use crate::error::HostError;

/// An instrument the history knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub ticker: String,
    #[serde(default = "default_market")]
    pub market: String,
}

fn default_market() -> String {
    "usa".into()
}

/// One trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub prices: FxHashMap<Symbol, i64>,
    #[serde(default)]
    pub fundamentals: FxHashMap<Symbol, FundamentalsSnapshot>,
}

/// A full replayable market history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketHistory {
    pub instruments: Vec<InstrumentSpec>,
    pub days: Vec<MarketDay>,
}

impl MarketHistory {
    /// Load and validate a history file.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let contents = std::fs::read_to_string(path).map_err(|e| HostError::HistoryRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let history: MarketHistory = serde_json::from_str(json)?;
        history.validate()?;
        Ok(history)
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.days.is_empty() {
            return Err(HostError::History("no trading days".into()));
        }

        let mut known = FxHashSet::default();
        for spec in &self.instruments {
            let sym = Symbol::try_new(&spec.ticker)
                .ok_or_else(|| HostError::InvalidSymbol(spec.ticker.clone()))?;
            if !known.insert(sym) {
                return Err(HostError::History(format!(
                    "duplicate instrument: {}",
                    spec.ticker
                )));
            }
        }

        for pair in self.days.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(HostError::History(format!(
                    "dates not strictly ascending at {}",
                    pair[1].date
                )));
            }
        }

        for day in &self.days {
            for (sym, &price) in &day.prices {
                if !known.contains(sym) {
                    return Err(HostError::History(format!(
                        "{}: price for unknown instrument {sym}",
                        day.date
                    )));
                }
                if price <= 0 {
                    return Err(HostError::History(format!(
                        "{}: non-positive price {price} for {sym}",
                        day.date
                    )));
                }
            }
            if let Some(sym) = day.fundamentals.keys().find(|s| !known.contains(*s)) {
                return Err(HostError::History(format!(
                    "{}: fundamentals for unknown instrument {sym}",
                    day.date
                )));
            }
        }
        Ok(())
    }

    /// Look up an instrument by ticker.
    pub fn instrument(&self, ticker: &str) -> Option<&InstrumentSpec> {
        self.instruments.iter().find(|i| i.ticker == ticker)
    }

    /// Days on which `symbol` has a price: its trading calendar.
    pub fn trading_days(&self, symbol: &Symbol) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|d| d.prices.contains_key(symbol))
            .map(|d| d.date)
            .collect()
    }

    /// Index of a date in `days`.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.days.binary_search_by_key(&date, |d| d.date).ok()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }
}
