use crate::error::{ReportError, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::path::Path;

/// Response of `POST /api/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub success: bool,
    /// 1 when the model flags disease, 0 otherwise
    pub prediction: i64,
    pub diagnosis: String,
    pub risk_level: String,
    /// CSS color chosen by the server for the risk level
    pub risk_color: String,
    /// Disease probability as a percentage (0 to 100)
    pub probability: f64,
    /// Model confidence as a percentage (0 to 100)
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub timestamp: String,
}

impl PredictionResult {
    pub fn is_positive(&self) -> bool {
        self.prediction == 1
    }
}

/// Evaluation metrics of the deployed model, each in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub overall_score: f64,
}

/// Response of `GET /api/model-info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub success: bool,
    pub model_name: String,
    pub model_type: String,
    pub training_date: String,
    pub metrics: ModelMetrics,
    pub features: Vec<String>,
}

/// One benchmarked model in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    pub category: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub is_best: bool,
}

/// Response of `GET /api/models-comparison`.
///
/// `models` is expected to arrive sorted by descending ROC-AUC; nothing here
/// re-sorts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonData {
    pub success: bool,
    pub total_models: u64,
    pub best_model: ModelRecord,
    pub models: Vec<ModelRecord>,
}

/// Decode a response body, honouring the `success` gate every endpoint carries.
pub fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    let value: Value =
        serde_json::from_str(body).map_err(|source| ReportError::Parse { endpoint, source })?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => serde_json::from_value(value)
            .map_err(|e| ReportError::shape(endpoint, e.to_string())),
        Some(false) => Err(ReportError::Reported {
            endpoint,
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        None => Err(ReportError::shape(
            endpoint,
            "missing boolean `success` field",
        )),
    }
}

/// Field names of the prediction form, in the order the form lays them out
pub const FORM_FIELDS: [&str; 13] = [
    "age",
    "sex",
    "chest_pain_type",
    "resting_blood_pressure",
    "cholesterol",
    "fasting_blood_sugar",
    "resting_ecg",
    "max_heart_rate",
    "exercise_induced_angina",
    "st_depression",
    "st_slope",
    "num_major_vessels",
    "thalassemia",
];

const SAMPLE_VALUES: [&str; 13] = [
    "63", "1", "3", "145", "233", "1", "0", "150", "0", "2.3", "0", "0", "1",
];

/// Flattened form fields sent to `POST /api/predict`.
///
/// Values stay strings, the way a submitted HTML form encodes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    fields: Vec<(String, String)>,
}

impl PatientForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample patient offered by the "Fill Sample Data" button
    pub fn sample() -> Self {
        let mut form = Self::new();
        for (name, value) in FORM_FIELDS.iter().zip(SAMPLE_VALUES) {
            form.set(name, value);
        }
        form
    }

    /// Set a field, replacing any earlier value
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Apply a `name=value` assignment from the command line
    pub fn apply_assignment(&mut self, assignment: &str) -> anyhow::Result<()> {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected name=value, got: {}", assignment))?;
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Empty field name in: {}", assignment);
        }
        self.set(name, value.trim());
        Ok(())
    }

    /// Read fields from a JSON or TOML table
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form file: {}", path.display()))?;

        let table: serde_json::Map<String, Value> =
            if path.extension().is_some_and(|ext| ext == "json") {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON form: {}", path.display()))?
            } else {
                let table: toml::Table = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse TOML form: {}", path.display()))?;
                match serde_json::to_value(table).with_context(|| {
                    format!("Failed to convert TOML form: {}", path.display())
                })? {
                    Value::Object(map) => map,
                    _ => anyhow::bail!("TOML form is not a table: {}", path.display()),
                }
            };

        let mut form = Self::new();
        for (name, value) in &table {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            form.set(name, &value);
        }
        Ok(form)
    }

    /// Required form fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        FORM_FIELDS
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none_or(|value| value.trim().is_empty()))
            .collect()
    }

    /// Fields in form order, followed by any extra fields in insertion order
    pub fn ordered(&self) -> Vec<(&str, &str)> {
        let known = FORM_FIELDS
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)));
        let extra = self
            .fields
            .iter()
            .filter(|(key, _)| !FORM_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()));
        known.chain(extra).collect()
    }
}

impl Serialize for PatientForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ordered = self.ordered();
        let mut map = serializer.serialize_map(Some(ordered.len()))?;
        for (name, value) in ordered {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
