// src/analyze/returns.rs
use crate::model::{DailyBar, DailyReturn};

/// Close-to-close returns for one symbol, oldest first.
/// The first day of the series (or a day after a zero close) has a return of 0.0.
pub fn daily_returns(symbol: &str, bars: &[DailyBar]) -> Vec<DailyReturn> {
    let mut sorted: Vec<&DailyBar> = bars.iter().collect();
    sorted.sort_by_key(|b| b.date);

    let mut out = Vec::with_capacity(sorted.len());
    let mut prev_close: Option<f64> = None;
    for bar in sorted {
        let daily_return = match prev_close {
            Some(prev) if prev != 0.0 => (bar.close - prev) / prev,
            _ => 0.0,
        };
        out.push(DailyReturn {
            symbol: symbol.to_string(),
            date: bar.date,
            close_price: bar.close,
            daily_return,
        });
        prev_close = Some(bar.close);
    }
    out
}
