use super::{failure_notice, paragraph, percent};
use crate::error::FailureKind;
use crate::html::{div, el, fragment, icon, span, text, Element, Node};
use crate::models::ModelInfo;

fn card(delay: &'static str, title_icon: &'static str, title: &'static str) -> Element {
    div()
        .class("model-info-card animate__animated animate__fadeInUp")
        .style(format!("animation-delay: {}", delay))
        .child(el("h3").child(icon(title_icon)).child(text(format!(" {}", title))))
}

fn metric_item(label: &'static str, value: String) -> Element {
    div()
        .class("metric-item")
        .child(span().class("metric-label").child(label))
        .child(span().class("metric-value").child(value))
}

fn colored_metric(label: &'static str, value: f64, color: &'static str) -> Element {
    div()
        .class("metric-item")
        .child(span().class("metric-label").child(label))
        .child(
            span()
                .class("metric-value")
                .style(format!("color: {}", color))
                .child(percent(value, 2)),
        )
}

/// Identity, metrics and feature cards for the deployed model
pub fn render_model_info(info: &ModelInfo, feature_preview: usize) -> Node {
    let identity = card("0.1s", "fa-robot", "Model Details").child(
        div()
            .class("metric-grid")
            .child(metric_item("Model Name", info.model_name.clone()))
            .child(metric_item("Algorithm", info.model_type.clone()))
            .child(metric_item("Training Date", info.training_date.clone())),
    );

    let m = &info.metrics;
    let metrics = card("0.2s", "fa-chart-bar", "Performance Metrics").child(
        div()
            .class("metric-grid")
            .child(colored_metric("Accuracy", m.accuracy, "var(--success-color)"))
            .child(colored_metric("Precision", m.precision, "var(--primary-light)"))
            .child(colored_metric("Recall", m.recall, "var(--warning-color)"))
            .child(colored_metric("F1 Score", m.f1_score, "var(--accent-color)"))
            .child(colored_metric("ROC-AUC", m.roc_auc, "var(--primary-color)"))
            .child(colored_metric(
                "Overall Score",
                m.overall_score,
                "var(--secondary-color)",
            )),
    );

    // Only a preview of the features is listed; the total is always the real count.
    let features = card("0.3s", "fa-list", "Input Features")
        .child(
            div().class("metric-grid").children(
                info.features
                    .iter()
                    .take(feature_preview)
                    .enumerate()
                    .map(|(index, feature)| {
                        div().class("metric-item").child(
                            span()
                                .class("metric-label")
                                .child(format!("{}. {}", index + 1, feature)),
                        )
                    }),
            ),
        )
        .child(
            div()
                .class("feature-total")
                .style(
                    "margin-top: 1rem; text-align: center; color: var(--text-muted); \
                     font-size: 0.875rem;",
                )
                .child(format!("Total Features: {}", info.features.len())),
        );

    fragment([identity, metrics, features])
}

/// Notice shown when model information could not be loaded
pub fn render_model_info_error(kind: FailureKind) -> Node {
    let message = match kind {
        FailureKind::Reported => "Failed to load model information",
        FailureKind::Connection => "Error connecting to server",
    };
    failure_notice(paragraph(message)).into()
}
