//! CoinMarketCap market-data client
//!
//! Fetches the latest USD listings and maps ticker symbol to price.

use crate::error::{BotError, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
const LISTINGS_LIMIT: &str = "50";

/// CoinMarketCap API client
#[derive(Clone)]
pub struct CmcClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    symbol: String,
    quote: HashMap<String, Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    price: Option<Decimal>,
}

impl CmcClient {
    /// Create a client against the production API
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against an arbitrary endpoint (tests, sandbox API)
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Latest USD price per ticker symbol, top listings by market cap
    pub async fn latest_prices(&self) -> Result<HashMap<String, Decimal>> {
        let url = format!("{}/v1/cryptocurrency/listings/latest", self.base_url);

        let resp = self
            .http
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("start", "1"),
                ("limit", LISTINGS_LIMIT),
                ("convert", "USD"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::Api(format!(
                "CoinMarketCap returned status {}",
                resp.status()
            )));
        }

        let listings: ListingsResponse = resp.json().await?;

        Ok(listings
            .data
            .into_iter()
            .filter_map(|coin| {
                let price = coin.quote.get("USD")?.price?;
                Some((coin.symbol, price))
            })
            .collect())
    }
}
