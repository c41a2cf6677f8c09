//! Yahoo Finance price history

use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Source of daily price history
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily bars between `start` and `end`, oldest first
    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>>;

    /// Latest traded price, when the source can provide one
    async fn live_price(&self, symbol: &str) -> Option<f64>;
}

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient;

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| StockError::YahooFinanceError(e.to_string()))
    }
}

fn to_offset(at: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map_err(|e| StockError::YahooFinanceError(format!("Invalid timestamp: {e}")))
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let response = Self::connector()?
            .get_quote_history(symbol, to_offset(start)?, to_offset(end)?)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        debug!(symbol, bars = quotes.len(), "Fetched price history");

        Ok(quotes
            .iter()
            .map(|q| Bar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }

    async fn live_price(&self, symbol: &str) -> Option<f64> {
        let connector = Self::connector().ok()?;
        let response = connector.get_latest_quotes(symbol, "1d").await.ok()?;
        let quote = response.last_quote().ok()?;
        (quote.close.is_finite() && quote.close > 0.0).then_some(quote.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history() {
        let client = YahooFinanceClient::new();
        let end = Utc::now();
        let start = end - chrono::Duration::days(30);

        let bars = client.history("AAPL", start, end).await.unwrap();
        assert!(!bars.is_empty());
        assert!(bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_price() {
        let client = YahooFinanceClient::new();
        assert!(client.live_price("0700.HK").await.is_some());
        assert!(client.live_price("INVALID_SYMBOL_12345").await.is_none());
    }
}
