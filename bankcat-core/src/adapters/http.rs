//! HTTP categorization service client
//!
//! Sends the whole collection to `POST {base}/categorize` as a JSON array
//! and expects the categorized records back wrapped in `{"data": [...]}`.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::Categorizer;

/// Used when neither the environment nor settings name a service
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/";

/// Environment variable overriding the categorization service base URL
pub const API_URL_ENV: &str = "BANKCAT_API_URL";

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Pick the service base URL: environment, then settings, then default
pub fn resolve_base_url(configured: Option<&str>) -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Validate a base URL and turn it into the categorize endpoint
pub fn categorize_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| Error::Config(format!("invalid categorizer URL '{}': {}", base_url, e)))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "categorizer URL must use http or https, got '{}'",
            base.scheme()
        )));
    }

    // Url::join replaces the last path segment unless the path ends in '/'
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("categorize")
        .map_err(|e| Error::Config(format!("invalid categorizer URL '{}': {}", base_url, e)))
}

#[derive(Debug, Deserialize)]
struct CategorizeResponse {
    data: Vec<Transaction>,
}

/// Categorizer backed by the HTTP categorization service
#[derive(Debug)]
pub struct HttpCategorizer {
    client: Client,
    endpoint: Url,
}

impl HttpCategorizer {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = categorize_endpoint(base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::categorization(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::categorization(format!(
                "request timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::categorization(format!(
                "unable to reach categorization service at {}",
                self.endpoint
            ))
        } else {
            Error::categorization(format!("request failed: {}", error))
        }
    }
}

impl Categorizer for HttpCategorizer {
    fn name(&self) -> &str {
        "http"
    }

    fn categorize(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(transactions)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::categorization(format!(
                "service responded with HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .map_err(|e| self.map_request_error(e))?;

        let parsed: CategorizeResponse = serde_json::from_str(&body)
            .map_err(|e| Error::categorization(format!("unexpected response body: {}", e)))?;

        Ok(parsed.data)
    }
}
