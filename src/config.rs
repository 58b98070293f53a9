use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::estimator::{HydroParams, WindParams};

pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_NASA_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/hourly/point";

fn default_port() -> u16 { 5000 }
fn default_static_dir() -> String { "static".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_open_meteo_url() -> String { DEFAULT_OPEN_METEO_URL.to_string() }
fn default_nasa_power_url() -> String { DEFAULT_NASA_POWER_URL.to_string() }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub energy: EnergyConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the built frontend, served for every non-API path.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,
    #[serde(default = "default_nasa_power_url")]
    pub nasa_power_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            open_meteo_url: default_open_meteo_url(),
            nasa_power_url: default_nasa_power_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which provider feeds `/api/energy`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnergyProvider {
    /// Irradiance, wind speed and precipitation in a single call.
    #[default]
    OpenMeteo,
    /// Irradiance only; wind and hydro are left out of the response.
    NasaPower,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EnergyConfig {
    #[serde(default)]
    pub provider: EnergyProvider,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub wind: WindParams,
    #[serde(default)]
    pub hydro: HydroParams,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.timeout_secs == 0 {
            bail!("upstream.timeout_secs must be greater than zero");
        }
        if self.upstream.open_meteo_url.trim().is_empty() {
            bail!("upstream.open_meteo_url must not be empty");
        }
        if self.upstream.nasa_power_url.trim().is_empty() {
            bail!("upstream.nasa_power_url must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.upstream.open_meteo_url, DEFAULT_OPEN_METEO_URL);
        assert_eq!(config.energy.provider, EnergyProvider::OpenMeteo);
        assert_eq!(config.estimator.wind.rotor_radius_m, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let raw = r#"{
            "server": { "port": 8080 },
            "energy": { "provider": "nasa_power" },
            "estimator": { "hydro": { "head_m": 25.0 } }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, "static");
        assert_eq!(config.energy.provider, EnergyProvider::NasaPower);
        assert_eq!(config.estimator.hydro.head_m, 25.0);
        assert_eq!(config.estimator.hydro.catchment_area_m2, 1000.0);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config: Config = serde_json::from_str(r#"{ "upstream": { "timeout_secs": 0 } }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("does-not-exist/config.json").unwrap();
        assert_eq!(config.upstream.timeout_secs, 10);
    }
}
