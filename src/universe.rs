//! One-time universe screen: market, size, and sector.

use std::fmt;

use crate::fundamentals::{FundamentalsSnapshot, SectorCode};
use crate::types::Instrument;

/// Default allow-list of candidate tickers.
pub const DEFAULT_TICKERS: &[&str] = &[
    "AAPL", "ACHC", "ADBE", "AEHR", "AEP", "AMD", "AMGN", "AMTX", "AMZN", "ARCB", "AVGO", "BECN",
    "BIDU", "CMCSA", "COST", "CPRX", "CSCO", "CTSH", "CZR", "DBX", "DLTR", "ETSY", "FTNT", "GILD",
    "GMAB", "GOOGL", "ILMN", "INTC", "JBLU", "KDP", "LULU", "MANH", "META", "MSFT", "NFLX", "NTES",
    "NVDA", "NXPI", "ORCL", "PEP", "PYPL", "QCOM", "REGN", "SBUX", "SEDG", "TSLA", "TXN", "ULTA",
    "ABBV", "ABT", "CNC", "CRH", "CRM", "CTVA", "CVS", "DOW", "EMN", "FMC", "FTS", "GM", "GSK",
    "IMAX", "JNJ", "MCK", "MRK", "NVO", "NVS", "PFE", "PKX", "SAP", "SNOW", "SPOT", "T", "TGT",
    "TJX", "TSM", "UNH",
];

/// Criteria an instrument must meet to join the universe.
#[derive(Clone, Debug, PartialEq)]
pub struct UniverseFilter {
    /// Required market identifier.
    pub market: String,
    /// Minimum market capitalization in dollars (inclusive).
    pub min_market_cap: f64,
    /// Sectors admitted to the universe.
    pub sectors: Vec<SectorCode>,
}

impl Default for UniverseFilter {
    fn default() -> Self {
        Self {
            market: "usa".into(),
            min_market_cap: 10e9,
            sectors: SectorCode::SCREENED.to_vec(),
        }
    }
}

/// Why an instrument was or wasn't admitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Admission {
    Admitted,
    ForeignMarket(String),
    /// No snapshot at screening time, so size and sector are unknown.
    NoFundamentals,
    BelowMarketCap(f64),
    ExcludedSector(SectorCode),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        *self == Admission::Admitted
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Admitted => write!(f, "admitted"),
            Admission::ForeignMarket(m) => write!(f, "market {m:?}"),
            Admission::NoFundamentals => write!(f, "no fundamentals"),
            Admission::BelowMarketCap(cap) => write!(f, "market cap ${:.1}B", cap / 1e9),
            Admission::ExcludedSector(s) => write!(f, "sector {s}"),
        }
    }
}

impl UniverseFilter {
    /// Screen one instrument. Market and size are checked before sector.
    pub fn admit(
        &self,
        instrument: &Instrument,
        snapshot: Option<&FundamentalsSnapshot>,
    ) -> Admission {
        if instrument.market != self.market {
            return Admission::ForeignMarket(instrument.market.clone());
        }
        let Some(snapshot) = snapshot else {
            return Admission::NoFundamentals;
        };
        // Negated so a NaN market cap is rejected
        if !(snapshot.market_cap >= self.min_market_cap) {
            return Admission::BelowMarketCap(snapshot.market_cap);
        }
        if !self.sectors.contains(&snapshot.sector) {
            return Admission::ExcludedSector(snapshot.sector);
        }
        Admission::Admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;

    fn snap(market_cap: f64, sector: SectorCode) -> FundamentalsSnapshot {
        FundamentalsSnapshot {
            roe: 0.2,
            profit_margin: 0.2,
            price_to_book: 3.0,
            operating_margin: 0.3,
            gross_margin: 0.6,
            revenue_growth: 0.1,
            asset_turnover: 0.8,
            roa: 0.1,
            free_cash_flow: 1e9,
            cash_ratio: 1.0,
            market_cap,
            sector,
        }
    }

    fn us(ticker: &str) -> Instrument {
        Instrument::new(Symbol::new(ticker), "usa")
    }

    #[test]
    fn default_tickers_fit_symbols() {
        assert_eq!(DEFAULT_TICKERS.len(), 77);
        for t in DEFAULT_TICKERS {
            assert!(Symbol::try_new(t).is_some(), "{t}");
        }
    }

    #[test]
    fn admits_large_us_tech() {
        let filter = UniverseFilter::default();
        let s = snap(2e12, SectorCode::InformationTechnology);
        assert!(filter.admit(&us("AAPL"), Some(&s)).is_admitted());
    }

    #[test]
    fn market_cap_boundary_is_inclusive() {
        let filter = UniverseFilter::default();
        let at = snap(10e9, SectorCode::Materials);
        assert!(filter.admit(&us("CRH"), Some(&at)).is_admitted());

        let below = snap(9.99e9, SectorCode::Materials);
        assert_eq!(
            filter.admit(&us("CRH"), Some(&below)),
            Admission::BelowMarketCap(9.99e9)
        );
    }

    #[test]
    fn rejects_foreign_market_before_fundamentals() {
        let filter = UniverseFilter::default();
        let inst = Instrument::new(Symbol::new("GMAB"), "dk");
        assert_eq!(
            filter.admit(&inst, None),
            Admission::ForeignMarket("dk".into())
        );
    }

    #[test]
    fn rejects_missing_fundamentals() {
        let filter = UniverseFilter::default();
        assert_eq!(filter.admit(&us("DBX"), None), Admission::NoFundamentals);
    }

    #[test]
    fn rejects_other_sectors() {
        let filter = UniverseFilter::default();
        let consumer = snap(500e9, SectorCode::Other(102 + 100));
        assert_eq!(
            filter.admit(&us("COST"), Some(&consumer)),
            Admission::ExcludedSector(SectorCode::Other(202))
        );
    }

    #[test]
    fn nan_market_cap_is_rejected() {
        let filter = UniverseFilter::default();
        let s = snap(f64::NAN, SectorCode::HealthCare);
        assert!(!filter.admit(&us("UNH"), Some(&s)).is_admitted());
    }
}
