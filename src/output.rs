use crate::error::{FailureKind, ReportError};
use crate::page::{Page, Purpose};
use crate::render::{category_averages, percent, prediction_error_message, ComparisonSummary};
use crate::runner::Report;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Html,
    Plain,
    Json,
}

/// What the rendered output covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The fragments of the panels that were loaded
    Panels,
    /// A complete standalone page
    Document,
}

/// Render the report in the requested format
pub fn render(report: &Report, page: &Page, format: OutputFormat, scope: Scope) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(render_html(report, page, scope)),
        OutputFormat::Plain => Ok(render_plain(report)),
        OutputFormat::Json => render_json(report),
    }
}

/// Print the report, or write it to `out` when a path is given
pub fn emit(rendered: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            ensure_directory_exists(path)?;
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to: {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Ensure the directory for the report file exists
fn ensure_directory_exists(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn render_html(report: &Report, page: &Page, scope: Scope) -> String {
    if scope == Scope::Document {
        return page.render_document().render_to_string();
    }

    let loaded = [
        (report.model_info.is_some(), Purpose::ModelInfo),
        (report.comparison.is_some(), Purpose::Comparison),
        (report.prediction.is_some(), Purpose::Prediction),
    ];
    loaded
        .into_iter()
        .filter(|(present, _)| *present)
        .filter_map(|(_, purpose)| page.content(purpose))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render results in plain text format
fn render_plain(report: &Report) -> String {
    let mut out = String::new();

    if let Some(prediction) = &report.prediction {
        write_prediction_plain(&mut out, prediction);
    }
    if let Some(model_info) = &report.model_info {
        write_model_info_plain(&mut out, model_info);
    }
    if let Some(comparison) = &report.comparison {
        write_comparison_plain(&mut out, comparison);
    }

    out.trim_end().to_string()
}

fn write_prediction_plain(
    out: &mut String,
    prediction: &std::result::Result<crate::models::PredictionResult, ReportError>,
) {
    let _ = writeln!(out, "🩺 PREDICTION");
    let _ = writeln!(out, "-------------");
    match prediction {
        Ok(result) => {
            let marker = if result.is_positive() {
                "⚠"
            } else {
                "✔"
            };
            let _ = writeln!(out, "{} {}", marker, result.diagnosis);
            let _ = writeln!(out, "Risk Level: {}", result.risk_level);
            let _ = writeln!(out, "Probability: {}%", result.probability);
            let _ = writeln!(out, "Confidence: {}%", result.confidence);
            let _ = writeln!(out, "Recommendations:");
            for rec in &result.recommendations {
                let _ = writeln!(out, "  • {}", rec);
            }
            let _ = writeln!(out, "Generated at {}", result.timestamp);
        }
        Err(e) => {
            let _ = writeln!(out, "Error: {}", prediction_error_message(e));
        }
    }
    let _ = writeln!(out);
}

fn write_model_info_plain(
    out: &mut String,
    model_info: &std::result::Result<crate::models::ModelInfo, ReportError>,
) {
    let _ = writeln!(out, "🤖 MODEL INFORMATION");
    let _ = writeln!(out, "--------------------");
    match model_info {
        Ok(info) => {
            let m = &info.metrics;
            let _ = writeln!(out, "{:<15} {}", "Model Name", info.model_name);
            let _ = writeln!(out, "{:<15} {}", "Algorithm", info.model_type);
            let _ = writeln!(out, "{:<15} {}", "Training Date", info.training_date);
            for (label, value) in [
                ("Accuracy", m.accuracy),
                ("Precision", m.precision),
                ("Recall", m.recall),
                ("F1 Score", m.f1_score),
                ("ROC-AUC", m.roc_auc),
                ("Overall Score", m.overall_score),
            ] {
                let _ = writeln!(out, "{:<15} {}", label, percent(value, 2));
            }
            let _ = writeln!(out, "Total Features: {}", info.features.len());
        }
        Err(e) => {
            let message = match e.kind() {
                FailureKind::Reported => "Failed to load model information",
                FailureKind::Connection => "Error connecting to server",
            };
            let _ = writeln!(out, "{}", message);
        }
    }
    let _ = writeln!(out);
}

fn write_comparison_plain(
    out: &mut String,
    comparison: &std::result::Result<crate::models::ComparisonData, ReportError>,
) {
    let _ = writeln!(out, "📊 MODEL COMPARISON");
    let _ = writeln!(out, "-------------------");
    let data = match comparison {
        Ok(data) => data,
        Err(_) => {
            let _ = writeln!(out, "Failed to load comparison data");
            return;
        }
    };

    let summary = ComparisonSummary::from_data(data);
    let _ = writeln!(out, "Models Trained: {}", summary.total_models);
    let _ = writeln!(out, "Best ROC-AUC:   {}", percent(summary.best_roc_auc, 2));
    let _ = writeln!(out, "Avg Accuracy:   {}", percent(summary.avg_accuracy, 2));
    let _ = writeln!(out, "Avg ROC-AUC:    {}", percent(summary.avg_roc_auc, 2));
    let _ = writeln!(out, "Best Model:     {}", summary.best_short_name);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<5} {:<28} {:<16} {:<9} {:<9}",
        "Rank", "Model", "Category", "Accuracy", "ROC-AUC"
    );
    let _ = writeln!(out, "{}", "-".repeat(71));
    for (index, model) in data.models.iter().enumerate() {
        let name = if model.is_best {
            format!("{} ★", model.name)
        } else {
            model.name.clone()
        };
        let _ = writeln!(
            out,
            "{:<5} {:<28} {:<16} {:<9} {:<9}",
            format!("#{}", index + 1),
            name,
            model.category,
            percent(model.accuracy, 2),
            percent(model.roc_auc, 2)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "By category:");
    for (category, average) in category_averages(&data.models) {
        let _ = writeln!(out, "  {:<16} {}", category, percent(average, 1));
    }
    let _ = writeln!(out);
}

fn outcome_json<T: Serialize>(
    outcome: &Option<std::result::Result<T, ReportError>>,
) -> Result<Value> {
    Ok(match outcome {
        None => Value::Null,
        Some(Ok(payload)) => {
            serde_json::to_value(payload).context("Failed to serialize payload")?
        }
        Some(Err(e)) => json!({
            "error": e.to_string(),
            "kind": match e.kind() {
                FailureKind::Reported => "reported",
                FailureKind::Connection => "connection",
            },
        }),
    })
}

/// Render results in JSON format
fn render_json(report: &Report) -> Result<String> {
    let value = json!({
        "model_info": outcome_json(&report.model_info)?,
        "comparison": outcome_json(&report.comparison)?,
        "prediction": outcome_json(&report.prediction)?,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize report to JSON")
}
