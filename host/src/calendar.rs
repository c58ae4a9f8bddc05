//! Month-start scheduling: first trading day of each month, after the open.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use screenbook::Symbol;

/// Default delay after the open before the rebalance fires.
pub const DEFAULT_OFFSET_MINUTES: i64 = 30;

/// Regular-session open (09:30 exchange time).
pub fn market_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default()
}

/// "Once a month, on the anchor's first trading day, `offset` after the open."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRule {
    /// Symbol whose trading days define the calendar.
    pub anchor: Symbol,
    pub offset: TimeDelta,
}

impl MonthlyRule {
    pub fn new(anchor: Symbol) -> Self {
        Self {
            anchor,
            offset: TimeDelta::minutes(DEFAULT_OFFSET_MINUTES),
        }
    }
}

/// Resolves a [`MonthlyRule`] against a list of trading days.
#[derive(Debug, Clone)]
pub struct MonthlySchedule {
    rule: MonthlyRule,
    open: NaiveTime,
}

impl MonthlySchedule {
    pub fn new(rule: MonthlyRule) -> Self {
        Self {
            rule,
            open: market_open(),
        }
    }

    /// Override the session open time.
    pub fn with_open(mut self, open: NaiveTime) -> Self {
        self.open = open;
        self
    }

    pub fn rule(&self) -> &MonthlyRule {
        &self.rule
    }

    /// Fire times for the given trading days (any order, duplicates allowed).
    pub fn fire_times(&self, trading_days: &[NaiveDate]) -> Vec<NaiveDateTime> {
        month_starts(trading_days)
            .into_iter()
            .map(|day| day.and_time(self.open) + self.rule.offset)
            .collect()
    }
}

/// First trading day of every month present in `trading_days`, ascending.
pub fn month_starts(trading_days: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut days = trading_days.to_vec();
    days.sort_unstable();
    days.dedup();

    let mut starts: Vec<NaiveDate> = Vec::new();
    for day in days {
        let new_month = starts
            .last()
            .is_none_or(|prev| (prev.year(), prev.month()) != (day.year(), day.month()));
        if new_month {
            starts.push(day);
        }
    }
    starts
}
