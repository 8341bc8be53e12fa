//! Configuration management for the fraud screening service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Relational source for the summary surface; absent disables it
    pub data: Option<DataConfig>,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming screening submissions
    pub submission_subject: String,
    /// Subject for outgoing screening responses
    pub response_subject: String,
    /// Subject for periodic summary statistics
    #[serde(default = "default_summary_subject")]
    pub summary_subject: String,
}

fn default_summary_subject() -> String {
    "fraud.summary".to_string()
}

/// Model and schema artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Path to the serialized ONNX classifier
    pub model_path: String,
    /// Path to the JSON feature schema; the built-in schema is used when
    /// absent
    #[serde(default)]
    pub schema_path: Option<String>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Encoder vocabularies and normalization settings.
///
/// Defaults match the vocabularies the bundled model was trained with;
/// a retrained model overrides them here.
#[derive(Debug, Clone, Deserialize)]
pub struct EncoderConfig {
    #[serde(default = "default_genders")]
    pub genders: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_states")]
    pub states: Vec<String>,
    /// Conversion rates to USD, keyed by currency code
    #[serde(default = "default_currency_rates")]
    pub currency_rates: HashMap<String, f64>,
    /// When set, raw city population counts are scaled by this maximum
    /// into [0,1]
    #[serde(default)]
    pub population_max: Option<f64>,
}

fn default_genders() -> Vec<String> {
    vec!["Female".to_string(), "Male".to_string()]
}

fn default_categories() -> Vec<String> {
    ["Food", "Travel", "Shopping", "Utilities", "Others"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_states() -> Vec<String> {
    ["CA", "TX", "NY", "FL", "IL"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_currency_rates() -> HashMap<String, f64> {
    let mut rates = HashMap::new();
    rates.insert("USD".to_string(), 1.0);
    rates.insert("INR".to_string(), 0.013);
    rates.insert("EUR".to_string(), 1.08);
    rates.insert("GBP".to_string(), 1.25);
    rates
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            genders: default_genders(),
            categories: default_categories(),
            states: default_states(),
            currency_rates: default_currency_rates(),
            population_max: None,
        }
    }
}

/// Relational data source configuration for the summary surface
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the DuckDB database file
    pub database: String,
    /// Table holding historical transactions
    #[serde(default = "default_table")]
    pub table: String,
    /// Row cap on summary queries
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    /// Seconds a computed summary stays cached
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
    /// Seconds between summary publications
    #[serde(default = "default_publish_secs")]
    pub publish_secs: u64,
}

fn default_table() -> String {
    "fraud_data".to_string()
}

fn default_row_limit() -> usize {
    100_000
}

fn default_cache_secs() -> u64 {
    300
}

fn default_publish_secs() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                submission_subject: "fraud.submissions".to_string(),
                response_subject: "fraud.responses".to_string(),
                summary_subject: default_summary_subject(),
            },
            artifacts: ArtifactsConfig {
                model_path: "models/fraud_model.onnx".to_string(),
                schema_path: None,
                onnx_threads: 1,
            },
            encoder: EncoderConfig::default(),
            data: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.submission_subject, "fraud.submissions");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert!(config.data.is_none());
    }

    #[test]
    fn test_default_vocabularies() {
        let encoder = EncoderConfig::default();
        assert_eq!(encoder.genders, ["Female", "Male"]);
        assert_eq!(encoder.states[1], "TX");
        assert_eq!(encoder.currency_rates.get("USD"), Some(&1.0));
        assert!(encoder.population_max.is_none());
    }
}
