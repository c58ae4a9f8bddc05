//! Performance metrics for a backtest return series.

/// Summary statistics for a series of periodic simple returns.
///
/// Annualization uses `periods_per_year` (12 for monthly rebalances).
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Cumulative return (0.15 = 15%)
    pub total_return: f64,
    /// Compound annual growth rate
    pub cagr: f64,
    /// Annualized standard deviation of returns
    pub volatility: f64,
    /// Annualized (mean - risk_free) / stddev
    pub sharpe: f64,
    /// Peak-to-trough decline as a positive fraction
    pub max_drawdown: f64,
    pub num_periods: usize,
    pub winning_periods: usize,
    pub losing_periods: usize,
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance Metrics")?;
        writeln!(f, "  Total return:    {:>8.2}%", self.total_return * 100.0)?;
        writeln!(f, "  CAGR:            {:>8.2}%", self.cagr * 100.0)?;
        writeln!(f, "  Volatility:      {:>8.2}%", self.volatility * 100.0)?;
        writeln!(f, "  Sharpe:          {:>8.2}", self.sharpe)?;
        writeln!(f, "  Max drawdown:    {:>8.2}%", self.max_drawdown * 100.0)?;
        writeln!(
            f,
            "  Win/Loss/Total:  {}/{}/{}",
            self.winning_periods, self.losing_periods, self.num_periods
        )
    }
}

/// Compute metrics from periodic returns.
///
/// `risk_free` is per period. Returns `None` if `returns` is empty.
pub fn compute_metrics(returns: &[f64], periods_per_year: f64, risk_free: f64) -> Option<Metrics> {
    if returns.is_empty() {
        return None;
    }
    let n = returns.len();

    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_drawdown = 0.0_f64;
    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - wealth) / peak);
        }
    }
    let total_return = wealth - 1.0;

    let years = n as f64 / periods_per_year;
    let cagr = if years > 0.0 && wealth > 0.0 {
        wealth.powf(1.0 / years) - 1.0
    } else {
        0.0
    };

    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };
    let std_dev = variance.sqrt();
    let volatility = std_dev * periods_per_year.sqrt();
    let sharpe = if std_dev > 0.0 {
        (mean - risk_free) / std_dev * periods_per_year.sqrt()
    } else {
        0.0
    };

    Some(Metrics {
        total_return,
        cagr,
        volatility,
        sharpe,
        max_drawdown,
        num_periods: n,
        winning_periods: returns.iter().filter(|&&r| r > 0.0).count(),
        losing_periods: returns.iter().filter(|&&r| r < 0.0).count(),
    })
}
