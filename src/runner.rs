use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{FailureKind, ReportError};
use crate::models::{ComparisonData, ModelInfo, PatientForm, PredictionResult};
use crate::page::{Page, Purpose, Ticket};
use crate::render::{
    prediction_error_message, render_comparison, render_comparison_error, render_model_info,
    render_model_info_error, render_prediction, render_prediction_error, RenderLimits,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outcome of every request made during one run
#[derive(Debug, Default)]
pub struct Report {
    pub model_info: Option<std::result::Result<ModelInfo, ReportError>>,
    pub comparison: Option<std::result::Result<ComparisonData, ReportError>>,
    pub prediction: Option<std::result::Result<PredictionResult, ReportError>>,
}

/// Pacing applied around a prediction
#[derive(Debug, Clone, Copy)]
struct Pacing {
    reveal_delay: Duration,
    pulse: Duration,
}

/// Main runner that loads panels and submits predictions into the page
pub struct Runner {
    client: ApiClient,
    page: Arc<Page>,
    limits: RenderLimits,
    pacing: Pacing,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            page: Arc::new(Page::new(config.page_title.clone())),
            limits: RenderLimits::from(config),
            pacing: Pacing {
                reveal_delay: config.reveal_delay(),
                pulse: config.pulse_duration(),
            },
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Load the model info panel
    pub async fn model_info(&self) -> Result<Report> {
        let model_info = self
            .spawn_model_info()
            .await
            .context("Model info task failed")?;
        Ok(Report {
            model_info: Some(model_info),
            ..Report::default()
        })
    }

    /// Load the model comparison panel
    pub async fn compare(&self) -> Result<Report> {
        let comparison = self
            .spawn_comparison()
            .await
            .context("Comparison task failed")?;
        Ok(Report {
            comparison: Some(comparison),
            ..Report::default()
        })
    }

    /// Submit a prediction form into the results panel
    pub async fn predict(&self, form: PatientForm) -> Result<Report> {
        let prediction = self
            .spawn_prediction(form)?
            .await
            .context("Prediction task failed")?;
        Ok(Report {
            prediction: Some(prediction),
            ..Report::default()
        })
    }

    /// Load both panels concurrently and optionally submit a prediction
    pub async fn dashboard(&self, form: Option<PatientForm>) -> Result<Report> {
        let prediction = form.map(|form| self.spawn_prediction(form)).transpose()?;
        let model_info = self.spawn_model_info();
        let comparison = self.spawn_comparison();

        let (model_info, comparison) = tokio::join!(model_info, comparison);
        let prediction = match prediction {
            Some(handle) => Some(handle.await.context("Prediction task failed")?),
            None => None,
        };

        Ok(Report {
            model_info: Some(model_info.context("Model info task failed")?),
            comparison: Some(comparison.context("Comparison task failed")?),
            prediction,
        })
    }

    fn spawn_model_info(&self) -> JoinHandle<std::result::Result<ModelInfo, ReportError>> {
        let client = self.client.clone();
        let page = Arc::clone(&self.page);
        let feature_preview = self.limits.feature_preview;

        self.page.spawn(Purpose::ModelInfo, move |ticket| async move {
            let outcome = client.model_info().await;
            let content = match &outcome {
                Ok(info) => render_model_info(info, feature_preview),
                Err(e) => {
                    log_failure("model info", e);
                    render_model_info_error(e.kind())
                }
            };
            page.commit(ticket, content);
            outcome
        })
    }

    fn spawn_comparison(&self) -> JoinHandle<std::result::Result<ComparisonData, ReportError>> {
        let client = self.client.clone();
        let page = Arc::clone(&self.page);
        let limits = self.limits;

        self.page.spawn(Purpose::Comparison, move |ticket| async move {
            let outcome = client.models_comparison().await;
            let content = match &outcome {
                Ok(data) => render_comparison(data, limits),
                Err(e) => {
                    log_failure("comparison", e);
                    render_comparison_error()
                }
            };
            page.commit(ticket, content);
            outcome
        })
    }

    /// Spawn a prediction, refusing forms that miss required fields
    fn spawn_prediction(
        &self,
        form: PatientForm,
    ) -> Result<JoinHandle<std::result::Result<PredictionResult, ReportError>>> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            anyhow::bail!("Form is missing required fields: {}", missing.join(", "));
        }

        let client = self.client.clone();
        let page = Arc::clone(&self.page);
        let pacing = self.pacing;

        Ok(self.page.spawn(Purpose::Prediction, move |ticket| {
            submit_prediction(client, page, ticket, form, pacing)
        }))
    }
}

/// Request a prediction and reveal it the way the form does
async fn submit_prediction(
    client: ApiClient,
    page: Arc<Page>,
    ticket: Ticket,
    form: PatientForm,
    pacing: Pacing,
) -> std::result::Result<PredictionResult, ReportError> {
    page.set_loading(ticket, true);
    let outcome = client.predict(&form).await;

    // Any JSON answer is held back for the reveal delay; transport and
    // non-JSON failures are shown at once.
    let answered = match &outcome {
        Ok(_) => true,
        Err(e) => e.has_json_body(),
    };
    if answered {
        tokio::time::sleep(pacing.reveal_delay).await;
    }
    page.set_loading(ticket, false);

    match &outcome {
        Ok(result) => {
            info!(
                diagnosis = %result.diagnosis,
                risk_level = %result.risk_level,
                "prediction received"
            );
            if page.commit(ticket, render_prediction(result)) {
                page.pulse(pacing.pulse);
            }
        }
        Err(e) => {
            log_failure("prediction", e);
            page.commit(ticket, render_prediction_error(&prediction_error_message(e)));
        }
    }
    outcome
}

fn log_failure(panel: &str, error: &ReportError) {
    match error.kind() {
        FailureKind::Reported => warn!(panel, %error, "server reported a failure"),
        FailureKind::Connection => error!(panel, %error, "error loading {}", panel),
    }
}
