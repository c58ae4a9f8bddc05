//! Point-in-time fundamentals: financial ratios and sector classification.

use std::fmt;

/// Morningstar-style sector classification code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "u16", into = "u16")
)]
pub enum SectorCode {
    /// 101
    Materials,
    /// 102
    CommunicationServices,
    /// 103
    InformationTechnology,
    /// 104
    HealthCare,
    /// Any other code; never screened in.
    Other(u16),
}

impl SectorCode {
    /// The four sectors the strategy trades.
    pub const SCREENED: [SectorCode; 4] = [
        SectorCode::Materials,
        SectorCode::CommunicationServices,
        SectorCode::InformationTechnology,
        SectorCode::HealthCare,
    ];

    /// Numeric classification code.
    pub const fn code(self) -> u16 {
        match self {
            SectorCode::Materials => 101,
            SectorCode::CommunicationServices => 102,
            SectorCode::InformationTechnology => 103,
            SectorCode::HealthCare => 104,
            SectorCode::Other(code) => code,
        }
    }

    /// Map a numeric code to a sector.
    pub const fn from_code(code: u16) -> Self {
        match code {
            101 => SectorCode::Materials,
            102 => SectorCode::CommunicationServices,
            103 => SectorCode::InformationTechnology,
            104 => SectorCode::HealthCare,
            other => SectorCode::Other(other),
        }
    }
}

impl From<u16> for SectorCode {
    fn from(code: u16) -> Self {
        SectorCode::from_code(code)
    }
}

impl From<SectorCode> for u16 {
    fn from(sector: SectorCode) -> Self {
        sector.code()
    }
}

impl fmt::Display for SectorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorCode::Materials => write!(f, "Materials (101)"),
            SectorCode::CommunicationServices => write!(f, "Communication Services (102)"),
            SectorCode::InformationTechnology => write!(f, "Information Technology (103)"),
            SectorCode::HealthCare => write!(f, "Health Care (104)"),
            SectorCode::Other(code) => write!(f, "Other ({code})"),
        }
    }
}

/// Read-only bundle of ratios for one symbol at one point in time.
///
/// Ratios are plain fractions (0.15 = 15%). `free_cash_flow` and
/// `market_cap` are in dollars.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundamentalsSnapshot {
    /// Return on equity
    pub roe: f64,
    pub profit_margin: f64,
    pub price_to_book: f64,
    pub operating_margin: f64,
    pub gross_margin: f64,
    pub revenue_growth: f64,
    pub asset_turnover: f64,
    /// Return on assets
    pub roa: f64,
    pub free_cash_flow: f64,
    pub cash_ratio: f64,
    pub market_cap: f64,
    pub sector: SectorCode,
}

impl FundamentalsSnapshot {
    /// All-zero snapshot for `sector`; set fields with struct update syntax.
    pub fn new(sector: SectorCode) -> Self {
        Self {
            roe: 0.0,
            profit_margin: 0.0,
            price_to_book: 0.0,
            operating_margin: 0.0,
            gross_margin: 0.0,
            revenue_growth: 0.0,
            asset_turnover: 0.0,
            roa: 0.0,
            free_cash_flow: 0.0,
            cash_ratio: 0.0,
            market_cap: 0.0,
            sector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_code_roundtrip() {
        for code in [101u16, 102, 103, 104, 205, 311] {
            assert_eq!(SectorCode::from_code(code).code(), code);
        }
        assert_eq!(SectorCode::from(103), SectorCode::InformationTechnology);
        assert_eq!(SectorCode::from(999), SectorCode::Other(999));
    }

    #[test]
    fn sector_display() {
        assert_eq!(format!("{}", SectorCode::HealthCare), "Health Care (104)");
        assert_eq!(format!("{}", SectorCode::Other(206)), "Other (206)");
    }
}
