//! Strategy parameter validation errors.

/// Invalid strategy parameters.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("max_portfolio_size must be > 0")]
    ZeroPortfolioSize,

    #[error("benchmark {symbol} weight {weight} must be in (0.0, 1.0]")]
    BenchmarkWeight { symbol: String, weight: f64 },

    #[error("benchmark weights sum to {0:.4} (> 1.0)")]
    BenchmarkOverweight(f64),

    #[error("duplicate benchmark: {0}")]
    DuplicateBenchmark(String),

    #[error("stop_loss {0} must be in (-1.0, 0.0)")]
    StopLoss(f64),

    #[error("take_profit {0} must be > 0.0")]
    TakeProfit(f64),

    #[error("min_market_cap {0} must be >= 0")]
    MarketCap(f64),
}
