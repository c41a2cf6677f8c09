//! Price statistics computed from daily bars

use crate::api::Bar;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Trading days per year used to annualise volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Short moving average window
pub const SHORT_MA_WINDOW: usize = 50;

/// Long moving average window
pub const LONG_MA_WINDOW: usize = 200;

/// Lookback of the fallback trend rule, in trading days
pub const FALLBACK_LOOKBACK: usize = 30;

/// Direction of the price over the analysed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Consolidating,
    InsufficientData,
}

/// Moving average series; `None` until the window is full
pub fn sma_series(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = SimpleMovingAverage::new(window) else {
        return vec![None; closes.len()];
    };

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = sma.next(close);
            (i + 1 >= window).then_some(value)
        })
        .collect()
}

/// Latest moving average value, if the history covers the window
pub fn sma_last(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    sma_series(closes, window).last().copied().flatten()
}

/// Daily percent returns
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Annualised volatility in percent
///
/// Sample standard deviation of daily returns scaled by √252. Zero when
/// fewer than two returns exist.
pub fn annualized_volatility(closes: &[f64]) -> f64 {
    let returns = daily_returns(closes);
    if returns.len() < 2 {
        return 0.0;
    }
    let std_dev = returns.std_dev();
    if std_dev.is_finite() {
        std_dev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
    } else {
        0.0
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        (to - from) / from * 100.0
    }
}

/// Percent change from the first close of the current UTC year
///
/// Zero when the history holds no bar from this year.
pub fn ytd_percent_change(bars: &[Bar], current_price: f64, now: DateTime<Utc>) -> f64 {
    let Some(year_start) = NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
    else {
        return 0.0;
    };

    bars.iter()
        .find(|b| b.timestamp >= year_start)
        .map_or(0.0, |b| percent_change(b.close, current_price))
}

/// Price and volume change over the trailing `days` calendar days
///
/// Price change runs from the first close inside the window to the current
/// price. Volume change compares the mean of the last 30 volumes with the
/// mean of the first 30 in the window.
pub fn period_changes(
    bars: &[Bar],
    current_price: f64,
    now: DateTime<Utc>,
    days: i64,
) -> (f64, f64) {
    let cutoff = now - Duration::days(days);
    let window: Vec<&Bar> = bars.iter().filter(|b| b.timestamp >= cutoff).collect();
    let Some(first) = window.first() else {
        return (0.0, 0.0);
    };

    let price_change = percent_change(first.close, current_price);

    let take = FALLBACK_LOOKBACK.min(window.len());
    let mean = |slice: &[&Bar]| slice.iter().map(|b| b.volume as f64).sum::<f64>() / slice.len() as f64;
    let earlier = mean(&window[..take]);
    let recent = mean(&window[window.len() - take..]);
    let volume_change = if earlier > 0.0 {
        (recent - earlier) / earlier * 100.0
    } else {
        0.0
    };

    (price_change, volume_change)
}

/// Classify the trend
///
/// With both moving averages: uptrend when the short average is above the
/// long one and the price above the short one, downtrend for the mirror
/// case, otherwise consolidating. Without them, the price is compared with
/// the close 30 trading days back using a ±5% band.
pub fn classify_trend(
    current_price: f64,
    ma_short: Option<f64>,
    ma_long: Option<f64>,
    closes: &[f64],
) -> Trend {
    if let (Some(short), Some(long)) = (ma_short, ma_long) {
        return if short > long && current_price > short {
            Trend::Uptrend
        } else if short < long && current_price < short {
            Trend::Downtrend
        } else {
            Trend::Consolidating
        };
    }

    if closes.len() < FALLBACK_LOOKBACK {
        return Trend::InsufficientData;
    }

    let reference = closes[closes.len() - FALLBACK_LOOKBACK];
    if current_price > reference * 1.05 {
        Trend::Uptrend
    } else if current_price < reference * 0.95 {
        Trend::Downtrend
    } else {
        Trend::Consolidating
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a percentage with an explicit sign, e.g. `+3.2%`
pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}
