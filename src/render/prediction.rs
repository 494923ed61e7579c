use super::failure_notice;
use crate::error::{FailureKind, ReportError};
use crate::html::{div, el, icon, text, Node};
use crate::models::PredictionResult;

pub const ALERT_GRADIENT: &str = "linear-gradient(135deg, #ef4444 0%, #dc2626 100%)";
pub const SUCCESS_GRADIENT: &str = "linear-gradient(135deg, #10b981 0%, #059669 100%)";

const FALLBACK_MESSAGE: &str = "An error occurred during prediction";
const CONNECTION_MESSAGE: &str = "Failed to connect to the server. Please try again.";

/// Header background and icon for a diagnosis card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderStyle {
    pub background: &'static str,
    pub icon: &'static str,
}

pub fn header_style(prediction: i64) -> HeaderStyle {
    if prediction == 1 {
        HeaderStyle {
            background: ALERT_GRADIENT,
            icon: "fa-exclamation-triangle",
        }
    } else {
        HeaderStyle {
            background: SUCCESS_GRADIENT,
            icon: "fa-check-circle",
        }
    }
}

fn stat(label: &'static str, value: String, color: String) -> Node {
    div()
        .class("result-stat")
        .child(div().class("result-stat-label").child(label))
        .child(
            div()
                .class("result-stat-value")
                .style(format!("color: {}", color))
                .child(value),
        )
        .into()
}

/// Diagnosis card for a successful prediction
pub fn render_prediction(result: &PredictionResult) -> Node {
    let style = header_style(result.prediction);

    let header = div()
        .class("result-header")
        .style(format!("background: {}", style.background))
        .child(div().class("result-icon").child(icon(style.icon)))
        .child(
            el("h3")
                .class("result-diagnosis")
                .child(result.diagnosis.clone()),
        )
        .child(
            el("p")
                .class("result-risk")
                .child("Risk Level: ")
                .child(el("strong").child(result.risk_level.clone())),
        );

    let stats = div()
        .class("result-stats")
        .child(stat(
            "Probability",
            format!("{}%", result.probability),
            result.risk_color.clone(),
        ))
        .child(stat(
            "Confidence",
            format!("{}%", result.confidence),
            "var(--primary-light)".to_string(),
        ));

    let recommendations = div()
        .class("recommendations")
        .child(
            el("h4")
                .child(icon("fa-lightbulb"))
                .child(" Recommendations"),
        )
        .children(
            result
                .recommendations
                .iter()
                .map(|rec| div().class("recommendation-item").child(rec.clone())),
        );

    let footer = div()
        .class("result-timestamp")
        .style(
            "margin-top: 2rem; padding: 1rem; background: rgba(15, 23, 42, 0.6); \
             border-radius: 0.5rem; text-align: center; color: var(--text-muted); \
             font-size: 0.875rem;",
        )
        .child(icon("fa-clock"))
        .child(text(format!(" Generated at {}", result.timestamp)));

    div()
        .class("results-content")
        .child(header)
        .child(stats)
        .child(recommendations)
        .child(footer)
        .into()
}

/// User-facing message for a failed prediction request
pub fn prediction_error_message(error: &ReportError) -> String {
    match error.kind() {
        FailureKind::Reported => error
            .reported_message()
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string(),
        FailureKind::Connection => CONNECTION_MESSAGE.to_string(),
    }
}

/// Error notice with a reload action, shown in place of the diagnosis card
pub fn render_prediction_error(message: &str) -> Node {
    let message = el("p")
        .child(el("strong").child("Error:"))
        .child(text(format!(" {}", message)));

    failure_notice(message.into())
        .child(
            el("button")
                .class("btn btn-primary")
                .attr("onclick", "location.reload()")
                .style("margin-top: 1rem;")
                .child(icon("fa-redo"))
                .child(" Try Again"),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(prediction: i64) -> PredictionResult {
        PredictionResult {
            success: true,
            prediction,
            diagnosis: if prediction == 1 {
                "Heart Disease Detected".to_string()
            } else {
                "No Heart Disease".to_string()
            },
            risk_level: "High".to_string(),
            risk_color: "#f97316".to_string(),
            probability: 72.5,
            confidence: 85.0,
            recommendations: vec![
                "Consult a cardiologist".to_string(),
                "Reduce sodium intake".to_string(),
                "Monitor blood pressure <daily>".to_string(),
            ],
            timestamp: "2025-03-01 10:15:00".to_string(),
        }
    }

    #[test]
    fn test_positive_prediction_uses_alert_styling() {
        let html = render_prediction(&sample_result(1)).to_string();
        assert!(html.contains(&format!("background: {}", ALERT_GRADIENT)));
        assert!(html.contains("fa-exclamation-triangle"));
        assert!(!html.contains("fa-check-circle"));
    }

    #[test]
    fn test_non_positive_prediction_uses_success_styling() {
        for prediction in [0, 2, -1] {
            let html = render_prediction(&sample_result(prediction)).to_string();
            assert!(html.contains(&format!("background: {}", SUCCESS_GRADIENT)));
            assert!(html.contains("fa-check-circle"));
            assert!(!html.contains("fa-exclamation-triangle"));
        }
    }

    #[test]
    fn test_recommendations_rendered_in_order() {
        let html = render_prediction(&sample_result(1)).to_string();
        assert_eq!(html.matches("class=\"recommendation-item\"").count(), 3);

        let first = html.find("Consult a cardiologist").unwrap();
        let second = html.find("Reduce sodium intake").unwrap();
        let third = html.find("Monitor blood pressure &lt;daily&gt;").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_stats_and_timestamp() {
        let html = render_prediction(&sample_result(1)).to_string();
        assert!(html.contains(r#"style="color: #f97316">72.5%"#));
        assert!(html.contains(r#"style="color: var(--primary-light)">85%"#));
        assert!(html.contains("Risk Level: <strong>High</strong>"));
        assert!(html.contains("Generated at 2025-03-01 10:15:00"));
    }

    #[test]
    fn test_empty_recommendations() {
        let mut result = sample_result(0);
        result.recommendations.clear();
        let html = render_prediction(&result).to_string();
        assert!(!html.contains("recommendation-item"));
        assert!(html.contains("Recommendations"));
    }

    #[test]
    fn test_reported_failure_without_message_uses_fallback() {
        let error = ReportError::Reported {
            endpoint: "/api/predict",
            message: None,
        };
        assert_eq!(
            prediction_error_message(&error),
            "An error occurred during prediction"
        );
    }

    #[test]
    fn test_reported_failure_message_is_shown() {
        let error = ReportError::Reported {
            endpoint: "/api/predict",
            message: Some("Invalid cholesterol value".to_string()),
        };
        assert_eq!(prediction_error_message(&error), "Invalid cholesterol value");
    }

    #[test]
    fn test_connection_failure_message() {
        let error = ReportError::shape("/api/predict", "missing boolean `success` field");
        assert_eq!(
            prediction_error_message(&error),
            "Failed to connect to the server. Please try again."
        );
    }

    #[test]
    fn test_error_notice_has_reload_action() {
        let html = render_prediction_error("Model <offline>").to_string();
        assert!(html.contains("<strong>Error:</strong> Model &lt;offline&gt;"));
        assert!(html.contains(r#"onclick="location.reload()""#));
        assert!(html.contains("Try Again"));
    }
}
