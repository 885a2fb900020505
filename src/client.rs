//! HTTP client used by the latency probe

#[cfg(test)]
mod integration_tests;

use crate::{
    error::{AppError, Result},
    models::ProbeConfig,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

/// HTTP client trait so the probe can be driven by fakes in tests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request and measure its round trip
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// HTTP response with timing information
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body_size: usize,
    /// Send to last body byte
    pub duration: Duration,
}

impl HttpResponse {
    pub fn new(status_code: u16, duration: Duration) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
            body_size: 0,
            duration,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// The probe's success precondition
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// Round-trip duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serving region reported by the proxy
    pub fn region(&self) -> Option<&str> {
        self.header(crate::defaults::REGION_HEADER)
    }

    /// Server-side request duration reported by the proxy, in milliseconds
    pub fn internal_duration_ms(&self) -> Option<i64> {
        self.header(crate::defaults::REQUEST_DURATION_HEADER)
            .and_then(parse_leading_int)
    }
}

/// Parse a base-10 integer prefix the way JavaScript's `parseInt(s, 10)`
/// does: leading whitespace, an optional sign, then as many digits as
/// follow. `None` when no digit is present or the value overflows.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// reqwest-backed client
pub struct ProbeClient {
    client: Client,
    timeout: Duration,
}

impl ProbeClient {
    /// Create a client with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(config.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpClient for ProbeClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let url = Url::parse(url)
            .map_err(|e| AppError::parse(format!("Invalid URL '{}': {}", url, e)))?;

        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response.bytes().await
            .map_err(|e| AppError::http_request(format!("Failed to read response body: {}", e)))?;
        let duration = start.elapsed();

        Ok(HttpResponse {
            status_code,
            headers,
            body_size: body.len(),
            duration,
        })
    }
}
