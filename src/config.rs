use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration for the prediction service and the rendered report
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the prediction service (endpoints live under `/api`)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Delay before a successful prediction is revealed
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// How long the pulse class stays on the results card
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
    /// Number of features listed on the model info panel
    #[serde(default = "default_feature_preview")]
    pub feature_preview: usize,
    /// Number of models in the ROC-AUC bar chart
    #[serde(default = "default_bar_chart_limit")]
    pub bar_chart_limit: usize,
    /// Number of models in the top list
    #[serde(default = "default_top_models_limit")]
    pub top_models_limit: usize,
    /// Title of the generated dashboard page
    #[serde(default = "default_page_title")]
    pub page_title: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_reveal_delay_ms() -> u64 {
    1500
}

fn default_pulse_ms() -> u64 {
    1000
}

fn default_feature_preview() -> usize {
    6
}

fn default_bar_chart_limit() -> usize {
    8
}

fn default_top_models_limit() -> usize {
    5
}

fn default_page_title() -> String {
    "Disease PredictionIQ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            reveal_delay_ms: default_reveal_delay_ms(),
            pulse_ms: default_pulse_ms(),
            feature_preview: default_feature_preview(),
            bar_chart_limit: default_bar_chart_limit(),
            top_models_limit: default_top_models_limit(),
            page_title: default_page_title(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Load the file if one was given, otherwise fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
