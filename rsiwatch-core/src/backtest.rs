//! Backtest simulator — naive long-only replay of the RSI strategy.
//!
//! Walks the indicator series once in time order, re-deriving the per-row
//! signal with the same `classify` function the live path uses. A buy while
//! flat spends 98% of cash at the row's close (the held-back 2% models fee
//! and slippage); a sell while holding liquidates the whole position. The
//! open position at series end is marked to market, not liquidated.

use crate::domain::{classify, Signal, Thresholds, TradeRecord, TradeSide};
use crate::indicators::IndicatorRow;
use serde::{Deserialize, Serialize};

/// Fraction of cash deployed on a buy. The remainder stays as cash.
const BUY_FRACTION: f64 = 0.98;

/// Result of one simulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Append-only ledger, in fill order.
    pub trades: Vec<TradeRecord>,
    /// Cash plus mark-to-market position value at the last close.
    pub final_value: f64,
    /// Gain over `start_balance` in percent; 0 when start_balance <= 0.
    pub profit_percent: f64,
    pub trade_count: usize,
}

impl BacktestReport {
    fn empty() -> Self {
        Self {
            trades: Vec::new(),
            final_value: 0.0,
            profit_percent: 0.0,
            trade_count: 0,
        }
    }

    /// Net gain in currency units relative to the starting balance.
    pub fn total_profit(&self, start_balance: f64) -> f64 {
        self.final_value - start_balance
    }
}

/// Replay the strategy over the full indicator series.
///
/// Pure function of its inputs: the same series, thresholds, and balance
/// always produce the identical ledger and metrics. An empty series yields
/// an empty ledger and all-zero metrics.
pub fn run_backtest(
    rows: &[IndicatorRow],
    thresholds: Thresholds,
    start_balance: f64,
) -> BacktestReport {
    if rows.is_empty() {
        return BacktestReport::empty();
    }

    let mut balance = start_balance;
    let mut position = 0.0_f64;
    let mut trades = Vec::new();

    for row in rows {
        let close = row.candle.close;
        match classify(row.rsi, thresholds) {
            Signal::StrongBuy if position == 0.0 => {
                let quantity = balance * BUY_FRACTION / close;
                balance -= quantity * close;
                position = quantity;
                trades.push(TradeRecord {
                    timestamp: row.candle.timestamp,
                    side: TradeSide::Buy,
                    price: close,
                    quantity,
                    balance_after: balance,
                });
            }
            Signal::SellClose if position > 0.0 => {
                balance += position * close;
                trades.push(TradeRecord {
                    timestamp: row.candle.timestamp,
                    side: TradeSide::Sell,
                    price: close,
                    quantity: position,
                    balance_after: balance,
                });
                position = 0.0;
            }
            _ => {}
        }
    }

    let last_close = rows[rows.len() - 1].candle.close;
    let final_value = balance + position * last_close;
    let profit_percent = if start_balance > 0.0 {
        (final_value - start_balance) / start_balance * 100.0
    } else {
        0.0
    };

    BacktestReport {
        trade_count: trades.len(),
        trades,
        final_value,
        profit_percent,
    }
}
