use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::UpstreamConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenMeteo,
    NasaPower,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenMeteo => "open_meteo",
            Provider::NasaPower => "nasa_power",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Hourly variables to request
    pub variables: Vec<&'static str>,
    /// Inclusive date range; providers default to "today onwards" when absent.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Provider-specific extras appended verbatim.
    pub extra: Vec<(&'static str, String)>,
}

impl UpstreamQuery {
    pub fn hourly(latitude: f64, longitude: f64, variables: &[&'static str]) -> Self {
        Self {
            latitude,
            longitude,
            variables: variables.to_vec(),
            date_range: None,
            extra: Vec::new(),
        }
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.extra.push((key, value.into()));
        self
    }

    /// Query-string pairs for `provider`.
    pub fn to_pairs(&self, provider: Provider) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
        ];
        match provider {
            Provider::OpenMeteo => {
                pairs.push(("hourly", self.variables.join(",")));
                pairs.push(("timezone", "auto".to_string()));
                if let Some((start, end)) = self.date_range {
                    pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
                    pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
                }
            }
            Provider::NasaPower => {
                pairs.push(("parameters", self.variables.join(",")));
                pairs.push(("community", "RE".to_string()));
                pairs.push(("time-standard", "UTC".to_string()));
                pairs.push(("format", "JSON".to_string()));
                if let Some((start, end)) = self.date_range {
                    pairs.push(("start", start.format("%Y%m%d").to_string()));
                    pairs.push(("end", end.format("%Y%m%d").to_string()));
                }
            }
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("upstream response is not valid JSON: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// One GET against a weather provider, returning the JSON body unmodified.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch(&self, provider: Provider, query: &UpstreamQuery) -> Result<Value, UpstreamError>;
}

/// reqwest-backed client. The timeout is set on the client itself so no
/// request can be issued without it.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    open_meteo_url: String,
    nasa_power_url: String,
}

impl HttpUpstream {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            open_meteo_url: cfg.open_meteo_url.clone(),
            nasa_power_url: cfg.nasa_power_url.clone(),
        })
    }

    fn base_url(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenMeteo => &self.open_meteo_url,
            Provider::NasaPower => &self.nasa_power_url,
        }
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn fetch(&self, provider: Provider, query: &UpstreamQuery) -> Result<Value, UpstreamError> {
        let url = self.base_url(provider);
        tracing::debug!(
            provider = provider.name(),
            lat = query.latitude,
            lon = query.longitude,
            variables = %query.variables.join(","),
            "upstream request"
        );

        let response = self
            .http
            .get(url)
            .query(&query.to_pairs(provider))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = provider.name(), %status, body = %body, "upstream HTTP error");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}
