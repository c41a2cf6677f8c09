//! Technical analysis of a price history
//!
//! [`analyze`] turns daily bars into a [`StockAnalysis`]: key metrics, a
//! trend classification and the wording derived from it. Chart rendering
//! lives in [`chart`].

pub mod chart;
pub mod metrics;
pub mod narrative;

pub use metrics::Trend;

use crate::api::Bar;
use crate::config::Language;
use chrono::{DateTime, Duration, Utc};
use metrics::{LONG_MA_WINDOW, SHORT_MA_WINDOW, round2, signed_percent};
use serde::{Deserialize, Serialize};

/// Calendar days covered by the period change metrics
pub const PERIOD_DAYS: i64 = 90;

/// A number, or a placeholder when it cannot be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    fn or_text(value: Option<f64>, text: &str) -> Self {
        value.map_or_else(|| MetricValue::Text(text.to_string()), |v| MetricValue::Number(round2(v)))
    }
}

/// Headline numbers of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub current_price: f64,
    pub price_change_percent_period: String,
    pub volume_change_percent_period: String,
    #[serde(rename = "PE_ratio")]
    pub pe_ratio: MetricValue,
    #[serde(rename = "EPS")]
    pub eps: MetricValue,
    #[serde(rename = "52_week_high")]
    pub week_52_high: f64,
    #[serde(rename = "52_week_low")]
    pub week_52_low: f64,
    #[serde(rename = "50_day_ma")]
    pub ma_50: MetricValue,
    #[serde(rename = "200_day_ma")]
    pub ma_200: MetricValue,
    pub volatility: String,
    pub ytd_percent_change: f64,
    pub trend: String,
}

/// Narrative part of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub price_trend: String,
    pub key_metrics: KeyMetrics,
    pub chart_description: String,
    pub potential_drivers: Vec<String>,
    pub potential_risks: Vec<String>,
}

/// Result of analysing one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub company_name: String,
    pub stock_code: String,
    pub date_range: String,
    pub analysis_summary: AnalysisSummary,
    pub recommendation_from_analyst: String,
    pub plot_file_path: String,
    pub analysis_date: String,
    pub data_points: usize,
}

/// Computed analysis plus the series needed to draw its chart
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: StockAnalysis,
    pub trend: Trend,
    pub ma_short: Vec<Option<f64>>,
    pub ma_long: Vec<Option<f64>>,
}

/// Analyse a non-empty history
///
/// `live_price` overrides the last close as the current price. The returned
/// report has an empty `plot_file_path`; the caller fills it in once the
/// chart is written.
pub fn analyze(
    ticker: &str,
    bars: &[Bar],
    live_price: Option<f64>,
    history_days: i64,
    now: DateTime<Utc>,
    language: Language,
) -> Analysis {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let last_close = closes.last().copied().unwrap_or_default();
    let current_price = live_price.unwrap_or(last_close);

    let week_52_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let week_52_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    let ma_short = metrics::sma_series(&closes, SHORT_MA_WINDOW);
    let ma_long = metrics::sma_series(&closes, LONG_MA_WINDOW);
    let ma_50 = metrics::sma_last(&closes, SHORT_MA_WINDOW);
    let ma_200 = metrics::sma_last(&closes, LONG_MA_WINDOW);

    let ytd = metrics::ytd_percent_change(bars, current_price, now);
    let volatility = metrics::annualized_volatility(&closes);
    let trend = metrics::classify_trend(current_price, ma_50, ma_200, &closes);
    let (period_change, volume_change) =
        metrics::period_changes(bars, current_price, now, PERIOD_DAYS);

    let placeholder = narrative::insufficient_data(language);
    let key_metrics = KeyMetrics {
        current_price: round2(current_price),
        price_change_percent_period: signed_percent(period_change),
        volume_change_percent_period: signed_percent(volume_change),
        pe_ratio: MetricValue::Text("N/A".to_string()),
        eps: MetricValue::Text("N/A".to_string()),
        week_52_high: round2(week_52_high),
        week_52_low: round2(week_52_low),
        ma_50: MetricValue::or_text(ma_50, placeholder),
        ma_200: MetricValue::or_text(ma_200, placeholder),
        volatility: format!("{volatility:.1}%"),
        ytd_percent_change: round2(ytd),
        trend: trend.label(language).to_string(),
    };

    let start = now - Duration::days(history_days);
    let report = StockAnalysis {
        company_name: ticker.to_string(),
        stock_code: ticker.to_string(),
        date_range: format!("{} to {}", start.format("%Y-%m-%d"), now.format("%Y-%m-%d")),
        analysis_summary: AnalysisSummary {
            price_trend: narrative::price_trend(trend, current_price, period_change, language),
            key_metrics,
            chart_description: narrative::chart_description(ticker, trend, language),
            potential_drivers: narrative::potential_drivers(trend, language),
            potential_risks: narrative::potential_risks(trend, language),
        },
        recommendation_from_analyst: narrative::recommendation(trend, language),
        plot_file_path: String::new(),
        analysis_date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        data_points: bars.len(),
    };

    Analysis {
        report,
        trend,
        ma_short,
        ma_long,
    }
}
