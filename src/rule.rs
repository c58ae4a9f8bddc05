//! Sector eligibility rules.
//!
//! Each screened sector maps to a [`SectorRule`]: a record of named
//! thresholds, one per [`Criterion`]. A snapshot is eligible when every
//! threshold holds. Thresholds are data, so one predicate serves every sector.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::fundamentals::{FundamentalsSnapshot, SectorCode};

/// A threshold on a single ratio.
///
/// NaN never satisfies a bound.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Bound {
    /// `value >= min`
    AtLeast(f64),
    /// `value <= max`
    AtMost(f64),
    /// `value > min` (strict)
    Above(f64),
    /// `lo <= value <= hi`
    Within(f64, f64),
}

impl Bound {
    /// Whether `value` satisfies this bound.
    #[inline]
    pub fn holds(self, value: f64) -> bool {
        match self {
            Bound::AtLeast(min) => value >= min,
            Bound::AtMost(max) => value <= max,
            Bound::Above(min) => value > min,
            Bound::Within(lo, hi) => lo <= value && value <= hi,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::AtLeast(min) => write!(f, ">= {min}"),
            Bound::AtMost(max) => write!(f, "<= {max}"),
            Bound::Above(min) => write!(f, "> {min}"),
            Bound::Within(lo, hi) => write!(f, "in [{lo}, {hi}]"),
        }
    }
}

/// One screened ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    ReturnOnEquity,
    ProfitMargin,
    PriceToBook,
    OperatingMargin,
    GrossMargin,
    RevenueGrowth,
    AssetTurnover,
    ReturnOnAssets,
    FreeCashFlow,
    CashRatio,
}

impl Criterion {
    /// All criteria, in evaluation order.
    pub const ALL: [Criterion; 10] = [
        Criterion::ReturnOnEquity,
        Criterion::ProfitMargin,
        Criterion::PriceToBook,
        Criterion::OperatingMargin,
        Criterion::GrossMargin,
        Criterion::RevenueGrowth,
        Criterion::AssetTurnover,
        Criterion::ReturnOnAssets,
        Criterion::FreeCashFlow,
        Criterion::CashRatio,
    ];

    /// Read this criterion's value from a snapshot.
    pub fn value(self, snapshot: &FundamentalsSnapshot) -> f64 {
        match self {
            Criterion::ReturnOnEquity => snapshot.roe,
            Criterion::ProfitMargin => snapshot.profit_margin,
            Criterion::PriceToBook => snapshot.price_to_book,
            Criterion::OperatingMargin => snapshot.operating_margin,
            Criterion::GrossMargin => snapshot.gross_margin,
            Criterion::RevenueGrowth => snapshot.revenue_growth,
            Criterion::AssetTurnover => snapshot.asset_turnover,
            Criterion::ReturnOnAssets => snapshot.roa,
            Criterion::FreeCashFlow => snapshot.free_cash_flow,
            Criterion::CashRatio => snapshot.cash_ratio,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::ReturnOnEquity => "ROE",
            Criterion::ProfitMargin => "profit margin",
            Criterion::PriceToBook => "price/book",
            Criterion::OperatingMargin => "operating margin",
            Criterion::GrossMargin => "gross margin",
            Criterion::RevenueGrowth => "revenue growth",
            Criterion::AssetTurnover => "asset turnover",
            Criterion::ReturnOnAssets => "ROA",
            Criterion::FreeCashFlow => "free cash flow",
            Criterion::CashRatio => "cash ratio",
        };
        f.write_str(name)
    }
}

/// Thresholds for one sector.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorRule {
    pub roe: Bound,
    pub profit_margin: Bound,
    pub price_to_book: Bound,
    pub operating_margin: Bound,
    pub gross_margin: Bound,
    pub revenue_growth: Bound,
    pub asset_turnover: Bound,
    pub roa: Bound,
    pub free_cash_flow: Bound,
    pub cash_ratio: Bound,
}

impl SectorRule {
    /// Information Technology and Health Care (103, 104).
    pub const fn technology() -> Self {
        Self {
            roe: Bound::AtLeast(0.15),
            profit_margin: Bound::AtLeast(0.20),
            price_to_book: Bound::AtMost(5.0),
            operating_margin: Bound::AtLeast(0.25),
            gross_margin: Bound::AtLeast(0.50),
            revenue_growth: Bound::AtLeast(0.10),
            asset_turnover: Bound::AtLeast(0.5),
            roa: Bound::AtLeast(0.07),
            free_cash_flow: Bound::Above(0.0),
            cash_ratio: Bound::AtLeast(0.7),
        }
    }

    /// Materials (101).
    pub const fn materials() -> Self {
        Self {
            roe: Bound::AtLeast(0.12),
            profit_margin: Bound::AtLeast(0.10),
            price_to_book: Bound::AtMost(2.0),
            operating_margin: Bound::AtLeast(0.10),
            gross_margin: Bound::Within(0.20, 0.30),
            revenue_growth: Bound::AtLeast(0.08),
            asset_turnover: Bound::AtLeast(1.0),
            roa: Bound::AtLeast(0.05),
            free_cash_flow: Bound::Above(0.0),
            cash_ratio: Bound::AtLeast(0.5),
        }
    }

    /// Communication Services (102).
    pub const fn communication() -> Self {
        Self {
            roe: Bound::AtLeast(0.12),
            profit_margin: Bound::AtLeast(0.15),
            price_to_book: Bound::AtMost(2.0),
            operating_margin: Bound::AtLeast(0.17),
            gross_margin: Bound::Within(0.20, 0.30),
            revenue_growth: Bound::AtLeast(0.08),
            asset_turnover: Bound::AtLeast(1.0),
            roa: Bound::AtLeast(0.05),
            free_cash_flow: Bound::Above(0.0),
            cash_ratio: Bound::AtLeast(0.5),
        }
    }

    /// The threshold configured for `criterion`.
    pub fn bound(&self, criterion: Criterion) -> Bound {
        match criterion {
            Criterion::ReturnOnEquity => self.roe,
            Criterion::ProfitMargin => self.profit_margin,
            Criterion::PriceToBook => self.price_to_book,
            Criterion::OperatingMargin => self.operating_margin,
            Criterion::GrossMargin => self.gross_margin,
            Criterion::RevenueGrowth => self.revenue_growth,
            Criterion::AssetTurnover => self.asset_turnover,
            Criterion::ReturnOnAssets => self.roa,
            Criterion::FreeCashFlow => self.free_cash_flow,
            Criterion::CashRatio => self.cash_ratio,
        }
    }

    /// The first criterion the snapshot fails, if any.
    pub fn first_failure(&self, snapshot: &FundamentalsSnapshot) -> Option<Criterion> {
        Criterion::ALL
            .into_iter()
            .find(|&c| !self.bound(c).holds(c.value(snapshot)))
    }

    /// True if every threshold holds.
    #[inline]
    pub fn admits(&self, snapshot: &FundamentalsSnapshot) -> bool {
        self.first_failure(snapshot).is_none()
    }
}

/// Outcome of screening one snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// No rule is configured for this sector.
    UnknownSector(SectorCode),
    /// The sector's rule rejected the snapshot on this criterion.
    Failed(Criterion),
}

impl Verdict {
    pub fn is_eligible(self) -> bool {
        self == Verdict::Eligible
    }
}

/// Sector code → rule lookup.
#[derive(Clone, Debug)]
pub struct RuleBook {
    rules: FxHashMap<SectorCode, SectorRule>,
}

impl Default for RuleBook {
    /// The standard table: IT and Health Care share the technology rule.
    fn default() -> Self {
        let mut book = Self::empty();
        book.set(SectorCode::InformationTechnology, SectorRule::technology());
        book.set(SectorCode::HealthCare, SectorRule::technology());
        book.set(SectorCode::Materials, SectorRule::materials());
        book.set(SectorCode::CommunicationServices, SectorRule::communication());
        book
    }
}

impl RuleBook {
    /// A rule book with no sectors (every snapshot is excluded).
    pub fn empty() -> Self {
        Self {
            rules: FxHashMap::default(),
        }
    }

    /// Install or replace the rule for a sector.
    pub fn set(&mut self, sector: SectorCode, rule: SectorRule) {
        self.rules.insert(sector, rule);
    }

    /// The rule for a sector, if configured.
    pub fn rule(&self, sector: SectorCode) -> Option<&SectorRule> {
        self.rules.get(&sector)
    }

    /// Screen a snapshot with the rule for its own sector.
    pub fn evaluate(&self, snapshot: &FundamentalsSnapshot) -> Verdict {
        match self.rule(snapshot.sector) {
            None => Verdict::UnknownSector(snapshot.sector),
            Some(rule) => match rule.first_failure(snapshot) {
                None => Verdict::Eligible,
                Some(criterion) => Verdict::Failed(criterion),
            },
        }
    }

    #[inline]
    pub fn admits(&self, snapshot: &FundamentalsSnapshot) -> bool {
        self.evaluate(snapshot).is_eligible()
    }
}
