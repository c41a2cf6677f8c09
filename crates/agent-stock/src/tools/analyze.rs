//! Stock analysis tool: metrics, trend and chart for one ticker

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use chrono::{Duration, Local, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::chart::{ChartData, render_chart};
use crate::analysis::{StockAnalysis, analyze};
use crate::api::PriceSource;
use crate::config::{Language, StockConfig};
use crate::error::{Result, StockError};

/// File name of the copy of the most recent chart
pub const LATEST_CHART: &str = "latest_chart.png";

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    ticker: String,
}

/// Chart file name for a ticker, e.g. `0700_HK_20250101_093000.png`
pub fn chart_file_name(ticker: &str, stamp: &str) -> String {
    format!("{}_{stamp}.png", ticker.replace('.', "_"))
}

/// Tool analysing a ticker's last year of prices
pub struct AnalyzeStockTool {
    prices: Arc<dyn PriceSource>,
    output_dir: PathBuf,
    history_days: i64,
    language: Language,
}

impl AnalyzeStockTool {
    /// Create the tool from the team configuration
    pub fn new(prices: Arc<dyn PriceSource>, config: &StockConfig) -> Self {
        Self {
            prices,
            output_dir: config.output_dir.clone(),
            history_days: config.history_days,
            language: config.language,
        }
    }

    fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    /// Analyse `ticker` and write its chart
    pub async fn analyze(&self, ticker: &str) -> Result<StockAnalysis> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(StockError::InvalidInput("ticker is empty".to_string()));
        }

        let now = Utc::now();
        let start = now - Duration::days(self.history_days);
        let bars = self.prices.history(ticker, start, now).await?;
        if bars.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "no price history returned".to_string(),
            });
        }

        let live_price = self.prices.live_price(ticker).await;
        let mut analysis = analyze(ticker, &bars, live_price, self.history_days, now, self.language);

        let charts_dir = self.charts_dir();
        tokio::fs::create_dir_all(&charts_dir).await?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let chart_path = charts_dir.join(chart_file_name(ticker, &stamp));

        let data = ChartData {
            ticker,
            bars: &bars,
            ma_short: &analysis.ma_short,
            ma_long: &analysis.ma_long,
        };
        render_chart(&chart_path, &data)?;
        copy_latest(&chart_path, &charts_dir.join(LATEST_CHART)).await;

        analysis.report.plot_file_path = chart_path.to_string_lossy().into_owned();
        info!(
            ticker,
            bars = bars.len(),
            trend = ?analysis.trend,
            chart = %chart_path.display(),
            "Stock analysis finished"
        );
        Ok(analysis.report)
    }
}

async fn copy_latest(chart: &Path, latest: &Path) {
    if let Err(e) = tokio::fs::copy(chart, latest).await {
        warn!(error = %e, latest = %latest.display(), "Failed to update latest chart");
    }
}

#[async_trait]
impl Tool for AnalyzeStockTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: AnalyzeParams = parse_params(self.name(), params)?;

        match self.analyze(&params.ticker).await {
            Ok(report) => Ok(serde_json::to_value(report).map_err(StockError::from)?),
            Err(e) => {
                warn!(ticker = %params.ticker, error = %e, "Stock analysis failed");
                Ok(json!({
                    "error": format!("Failed to analyze {}: {e}", params.ticker),
                    "stock": params.ticker,
                }))
            }
        }
    }

    fn name(&self) -> &'static str {
        "analyze_stock"
    }

    fn description(&self) -> &'static str {
        "Analyze a stock's price history over the last year: computes key metrics and the \
         trend, and saves a chart of price, moving averages and volume."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Full ticker code, e.g. AAPL, 0700.HK or 600519.SS"),
            }),
            vec!["ticker"],
        )
    }
}
