use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::models::{decode, ComparisonData, ModelInfo, PatientForm, PredictionResult};
use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const PREDICT: &str = "/api/predict";
pub const MODEL_INFO: &str = "/api/model-info";
pub const MODELS_COMPARISON: &str = "/api/models-comparison";

/// HTTP client for the prediction service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the service configured in `config`
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Submit the form and return the prediction
    pub async fn predict(&self, form: &PatientForm) -> Result<PredictionResult> {
        let request = self.http.post(self.url(PREDICT)).json(form);
        self.execute(PREDICT, request).await
    }

    /// Fetch metadata and metrics of the deployed model
    pub async fn model_info(&self) -> Result<ModelInfo> {
        let request = self.http.get(self.url(MODEL_INFO));
        self.execute(MODEL_INFO, request).await
    }

    /// Fetch the benchmark of every trained model
    pub async fn models_comparison(&self) -> Result<ComparisonData> {
        let request = self.http.get(self.url(MODELS_COMPARISON));
        self.execute(MODELS_COMPARISON, request).await
    }

    /// Send the request and decode whatever body comes back.
    ///
    /// The HTTP status is not consulted; the body's `success` gate decides.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        debug!(endpoint, "sending request");
        let response = request
            .send()
            .await
            .map_err(|source| ReportError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ReportError::Transport { endpoint, source })?;
        debug!(endpoint, %status, bytes = body.len(), "received response");

        decode(endpoint, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn client_for(url: &str) -> ApiClient {
        let config = Config {
            base_url: format!("{}/", url),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_model_info_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/model-info")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "model_name": "SVM", "model_type": "SVC",
                    "training_date": "2025-02-02",
                    "metrics": {"accuracy": 0.85, "precision": 0.86, "recall": 0.84,
                                "f1_score": 0.85, "roc_auc": 0.91, "overall_score": 0.86},
                    "features": ["age"]}"#,
            )
            .create_async()
            .await;

        let info = client_for(&server.url()).model_info().await.unwrap();
        assert_eq!(info.model_name, "SVM");
        assert_eq!(info.features.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_predict_posts_form_as_strings() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/predict")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "age": "63",
                "st_depression": "2.3",
                "thalassemia": "1"
            })))
            .with_status(200)
            .with_body(
                r##"{"success": true, "prediction": 1, "diagnosis": "Heart Disease Detected",
                    "risk_level": "High", "risk_color": "#f97316", "probability": 71.2,
                    "confidence": 71.2, "recommendations": ["See a cardiologist"],
                    "timestamp": "2025-03-01 10:00:00"}"##,
            )
            .create_async()
            .await;

        let result = client_for(&server.url())
            .predict(&PatientForm::sample())
            .await
            .unwrap();
        assert!(result.is_positive());
        assert_eq!(result.recommendations, vec!["See a cardiologist"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reported_failure_regardless_of_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/models-comparison")
            .with_status(500)
            .with_body(r#"{"success": false, "message": "Comparison data not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server.url())
            .models_comparison()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Reported);
        assert_eq!(err.reported_message(), Some("Comparison data not found"));
    }

    #[tokio::test]
    async fn test_error_body_without_success_is_shape_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/model-info")
            .with_status(503)
            .with_body(r#"{"detail": "Model metadata not available"}"#)
            .create_async()
            .await;

        let err = client_for(&server.url()).model_info().await.unwrap_err();
        assert!(matches!(err, ReportError::Shape { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .model_info()
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Transport { .. }));
        assert_eq!(err.kind(), FailureKind::Connection);
    }
}
