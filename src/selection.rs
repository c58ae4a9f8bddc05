//! Ranking and top-K selection with backfill.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;

use crate::fundamentals::FundamentalsSnapshot;
use crate::rule::RuleBook;
use crate::types::Symbol;

/// The selected set for one cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    /// Selected symbols, best first.
    pub members: Vec<Symbol>,
    /// How many universe symbols passed their sector rule.
    pub eligible: usize,
    /// How many members were added by backfill.
    pub backfilled: usize,
}

impl Selection {
    #[inline]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.members.contains(symbol)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// ROE descending, then symbol ascending. A missing (or NaN) ROE ranks last.
fn rank(a: &(Symbol, Option<f64>), b: &(Symbol, Option<f64>)) -> Ordering {
    let roe = match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    roe.then_with(|| a.0.cmp(&b.0))
}

fn roe_of(snapshot: Option<&FundamentalsSnapshot>) -> Option<f64> {
    snapshot.map(|s| s.roe).filter(|roe| !roe.is_nan())
}

/// Select up to `max_size` symbols from this cycle's universe snapshots.
///
/// Eligible symbols are ranked by ROE and take the first slots. If fewer
/// than `max_size` are eligible, the rest of the universe is ranked by ROE
/// regardless of eligibility and appended until full.
///
/// `entries` pairs each universe symbol with its snapshot (`None` when the
/// provider has no data this cycle). Duplicate symbols are counted once.
pub fn select(
    entries: &[(Symbol, Option<FundamentalsSnapshot>)],
    rules: &RuleBook,
    max_size: usize,
) -> Selection {
    let mut seen: FxHashSet<Symbol> = FxHashSet::default();
    let entries: Vec<(Symbol, Option<&FundamentalsSnapshot>)> = entries
        .iter()
        .filter(|(sym, _)| seen.insert(*sym))
        .map(|(sym, snap)| (*sym, snap.as_ref()))
        .collect();

    let mut candidates: Vec<(Symbol, Option<f64>)> = entries
        .iter()
        .filter(|(_, snap)| snap.is_some_and(|s| rules.admits(s)))
        .map(|&(sym, snap)| (sym, roe_of(snap)))
        .collect();
    candidates.sort_by(rank);

    let eligible = candidates.len();
    let mut members: Vec<Symbol> = candidates
        .into_iter()
        .take(max_size)
        .map(|(sym, _)| sym)
        .collect();

    let mut backfilled = 0;
    if members.len() < max_size {
        let chosen: FxHashSet<Symbol> = members.iter().copied().collect();
        let mut rest: Vec<(Symbol, Option<f64>)> = entries
            .iter()
            .filter(|(sym, _)| !chosen.contains(sym))
            .map(|&(sym, snap)| (sym, roe_of(snap)))
            .collect();
        rest.sort_by(rank);

        let needed = max_size - members.len();
        backfilled = needed.min(rest.len());
        members.extend(rest.into_iter().take(needed).map(|(sym, _)| sym));
    }

    Selection {
        members,
        eligible,
        backfilled,
    }
}
