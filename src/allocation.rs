//! Target-weight allocation: fixed benchmark sleeves plus an equal split.

use crate::types::Symbol;

/// A fixed-allocation instrument (e.g. an index ETF).
///
/// Benchmarks bypass screening, ranking, and exit rules.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Benchmark {
    pub symbol: Symbol,
    pub weight: f64,
}

impl Benchmark {
    pub fn new(ticker: &str, weight: f64) -> Self {
        Self {
            symbol: Symbol::new(ticker),
            weight,
        }
    }
}

/// Weight left for selected members after the benchmark sleeves.
pub fn remaining_weight(benchmarks: &[Benchmark]) -> f64 {
    1.0 - benchmarks.iter().map(|b| b.weight).sum::<f64>()
}

/// Per-member weight for `members` selected symbols, or `None` if there are none.
pub fn member_weight(benchmarks: &[Benchmark], members: usize) -> Option<f64> {
    (members > 0).then(|| remaining_weight(benchmarks) / members as f64)
}

/// Target weights for one cycle: benchmarks first, then members in order.
///
/// With no members the remaining weight is left unallocated.
pub fn allocate(benchmarks: &[Benchmark], members: &[Symbol]) -> Vec<(Symbol, f64)> {
    let mut targets: Vec<(Symbol, f64)> = benchmarks.iter().map(|b| (b.symbol, b.weight)).collect();
    if let Some(weight) = member_weight(benchmarks, members.len()) {
        targets.extend(members.iter().map(|&sym| (sym, weight)));
    }
    targets
}
