//! Historical exchange-rate lookup.
//!
//! Rates come from the exchangerate-api.com `history` endpoint. Every call
//! performs exactly one request; nothing is cached or retried.

use crate::error::{Error, Result};
use crate::types::ExchangeRate;
use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Default endpoint of the exchange-rate service.
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anything that can answer "what was the rate from X to Y on this day".
pub trait RateSource {
    /// Fetch the rate converting one unit of `from` into `to` on `date`.
    fn fetch_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Decimal>;

    /// Same as [`RateSource::fetch_rate`], packaged with its key.
    fn exchange_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<ExchangeRate> {
        Ok(ExchangeRate {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate: self.fetch_rate(date, from, to)?,
            date,
        })
    }
}

/// Connection settings for the exchange-rate service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings for the public endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the history endpoint for one currency and day.
    pub fn history_url(&self, from: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}/history/{}/{}/{:02}/{:02}",
            self.base_url.trim_end_matches('/'),
            self.api_key,
            from,
            date.year(),
            date.month(),
            date.day()
        )
    }
}

/// Body of a `history` response. Fields we don't read are ignored.
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, serde_json::Number>>,
}

/// Blocking client for the exchangerate-api.com history endpoint.
pub struct ExchangeRateApi {
    config: ApiConfig,
    client: Client,
}

impl ExchangeRateApi {
    /// Create a client with the configured timeout.
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("exchange-rate API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl RateSource for ExchangeRateApi {
    fn fetch_rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Decimal> {
        let lookup_error = |reason: String| Error::RateLookup {
            date,
            from: from.to_string(),
            to: to.to_string(),
            reason,
        };

        let url = self.config.history_url(from, date);
        log::debug!("Fetching {}->{} rate for {}", from, to, date);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| lookup_error(format!("HTTP request failed: {}", e.without_url())))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| lookup_error(format!("Failed to read response: {}", e.without_url())))?;
        log::debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            return Err(lookup_error(format!("service returned {}", status)));
        }

        rate_from_body(&body, to).map_err(lookup_error)
    }
}

/// Pick the `to` rate out of a history response body.
fn rate_from_body(body: &str, to: &str) -> std::result::Result<Decimal, String> {
    let response: HistoryResponse =
        serde_json::from_str(body).map_err(|e| format!("Unexpected API response: {}", e))?;

    if response.result.as_deref() == Some("error") {
        return Err(format!(
            "service reported error: {}",
            response.error_type.as_deref().unwrap_or("unknown")
        ));
    }

    let rates = response
        .conversion_rates
        .ok_or_else(|| "response has no conversion_rates table".to_string())?;
    let number = rates
        .get(to)
        .ok_or_else(|| format!("{} missing from conversion_rates", to))?;

    let rate = Decimal::from_str(&number.to_string())
        .or_else(|_| Decimal::from_scientific(&number.to_string()))
        .map_err(|e| format!("rate {} is not a decimal: {}", number, e))?;
    if rate <= Decimal::ZERO {
        return Err(format!("rate {} is not positive", rate));
    }
    Ok(rate)
}
