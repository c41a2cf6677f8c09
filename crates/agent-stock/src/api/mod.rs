//! Clients for the upstream data services

pub mod bocha;
pub mod yahoo;

pub use bocha::{BOCHA_SEARCH_URL, BochaClient, SearchHit};
pub use yahoo::{Bar, PriceSource, YahooFinanceClient};

use crate::error::Result;
use std::time::Duration;

/// Build an HTTP client with a timeout and an optional proxy
pub fn http_client(timeout: Duration, proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}
