use super::{percent, width_style, RenderLimits};
use crate::html::{div, el, fragment, icon, span, text, Element, Node};
use crate::models::{ComparisonData, ModelRecord};
use std::collections::HashMap;

const MEDAL_COLORS: [&str; 3] = ["#FFD700", "#C0C0C0", "#CD7F32"];
const DEFAULT_MEDAL_COLOR: &str = "var(--text-secondary)";

/// Aggregates derived from a comparison payload
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub total_models: u64,
    pub best_roc_auc: f64,
    pub avg_accuracy: f64,
    pub avg_roc_auc: f64,
    /// First word of the best model's name
    pub best_short_name: String,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl ComparisonSummary {
    pub fn from_data(data: &ComparisonData) -> Self {
        Self {
            total_models: data.total_models,
            best_roc_auc: data.best_model.roc_auc,
            avg_accuracy: mean(data.models.iter().map(|m| m.accuracy)),
            avg_roc_auc: mean(data.models.iter().map(|m| m.roc_auc)),
            best_short_name: data
                .best_model
                .name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Mean ROC-AUC per category, in the order categories first appear
pub fn category_averages(models: &[ModelRecord]) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();

    for model in models {
        let slot = *index.entry(model.category.as_str()).or_insert_with(|| {
            groups.push((model.category.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(model.roc_auc);
    }

    groups
        .into_iter()
        .map(|(category, scores)| (category.to_string(), mean(scores.into_iter())))
        .collect()
}

/// Trophy color for a position in the top list
pub fn medal_color(position: usize) -> &'static str {
    MEDAL_COLORS
        .get(position)
        .copied()
        .unwrap_or(DEFAULT_MEDAL_COLOR)
}

fn category_class(category: &str) -> String {
    let slug: String = category
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .collect();
    format!("model-category category-{}", slug)
}

fn stat_card(card_icon: &'static str, value: String, label: &'static str) -> Element {
    div()
        .class("stat-card")
        .child(div().class("stat-icon").child(icon(card_icon)))
        .child(div().class("stat-value").child(value))
        .child(div().class("stat-label").child(label))
}

fn chart_card(delay: &'static str, title_icon: &'static str, title: String) -> Element {
    div()
        .class("chart-card animate__animated animate__fadeInUp")
        .style(format!("animation-delay: {}", delay))
        .child(
            div()
                .class("chart-title")
                .child(icon(title_icon))
                .child(text(format!(" {}", title))),
        )
}

fn bar_item(label: String, value: f64) -> Element {
    div()
        .class("bar-item")
        .child(div().class("bar-label").child(label))
        .child(
            div().class("bar-visual").child(
                div()
                    .class("bar-fill")
                    .style(width_style(value))
                    .child(percent(value, 1)),
            ),
        )
}

fn radar_item(metric: impl Into<Node>, score: f64) -> Element {
    div()
        .class("radar-item")
        .child(span().class("radar-metric").child(metric))
        .child(span().class("radar-score").child(percent(score, 2)))
}

fn stats_row(summary: &ComparisonSummary) -> Element {
    div()
        .class("comparison-stats animate__animated animate__fadeInUp")
        .child(stat_card(
            "fa-brain",
            summary.total_models.to_string(),
            "Models Trained",
        ))
        .child(stat_card(
            "fa-trophy",
            percent(summary.best_roc_auc, 2),
            "Best ROC-AUC",
        ))
        .child(stat_card(
            "fa-chart-line",
            percent(summary.avg_accuracy, 2),
            "Avg Accuracy",
        ))
        .child(stat_card(
            "fa-award",
            summary.best_short_name.clone(),
            "Best Model",
        ))
}

fn table_row(rank: usize, model: &ModelRecord) -> Element {
    let badge = model.is_best.then(|| {
        span()
            .class("best-badge")
            .child(icon("fa-star"))
            .child(" Best")
    });

    let cell = || el("td");
    el("tr")
        .class(if model.is_best { "best-model" } else { "" })
        .child(cell().child(el("strong").child(format!("#{}", rank))))
        .child(
            cell().child(
                div()
                    .class("model-name")
                    .child(model.name.clone())
                    .child(badge),
            ),
        )
        .child(
            cell().child(
                span()
                    .class(category_class(&model.category))
                    .child(model.category.clone()),
            ),
        )
        .child(
            cell().child(
                div()
                    .class("metric-bar")
                    .child(
                        div().class("metric-progress").child(
                            div()
                                .class("metric-fill")
                                .style(width_style(model.accuracy)),
                        ),
                    )
                    .child(span().class("metric-value").child(percent(model.accuracy, 2))),
            ),
        )
        .child(cell().child(percent(model.precision, 2)))
        .child(cell().child(percent(model.recall, 2)))
        .child(cell().child(percent(model.f1_score, 2)))
        .child(
            cell().child(
                el("strong")
                    .style("color: var(--accent-color)")
                    .child(percent(model.roc_auc, 2)),
            ),
        )
}

fn models_table(models: &[ModelRecord]) -> Element {
    let header = el("tr").children(
        [
            "Rank",
            "Model Name",
            "Category",
            "Accuracy",
            "Precision",
            "Recall",
            "F1-Score",
            "ROC-AUC",
        ]
        .into_iter()
        .map(|label| el("th").child(label)),
    );

    // Rank is input position; the server sorts by ROC-AUC.
    let rows = models
        .iter()
        .enumerate()
        .map(|(index, model)| table_row(index + 1, model));

    div()
        .class("models-table-container animate__animated animate__fadeInUp")
        .style("animation-delay: 0.2s")
        .child(
            el("h3")
                .child(icon("fa-table"))
                .child(" Complete Model Performance"),
        )
        .child(
            div().style("overflow-x: auto;").child(
                el("table")
                    .class("models-table")
                    .child(el("thead").child(header))
                    .child(el("tbody").children(rows)),
            ),
        )
}

fn charts(data: &ComparisonData, limits: RenderLimits) -> Element {
    let best = &data.best_model;

    let bar_chart = chart_card("0.3s", "fa-chart-bar", "ROC-AUC Comparison".to_string()).child(
        div().class("bar-chart").children(
            data.models
                .iter()
                .take(limits.bar_chart)
                .map(|model| bar_item(model.name.clone(), model.roc_auc)),
        ),
    );

    let best_metrics = chart_card("0.4s", "fa-star", format!("Best Model: {}", best.name)).child(
        div()
            .class("radar-container")
            .child(radar_item("Accuracy", best.accuracy))
            .child(radar_item("Precision", best.precision))
            .child(radar_item("Recall", best.recall))
            .child(radar_item("F1-Score", best.f1_score))
            .child(radar_item("ROC-AUC", best.roc_auc)),
    );

    let by_category = chart_card(
        "0.5s",
        "fa-layer-group",
        "Performance by Category".to_string(),
    )
    .child(
        div().class("bar-chart").children(
            category_averages(&data.models)
                .into_iter()
                .map(|(category, average)| bar_item(category, average)),
        ),
    );

    let top_models = chart_card(
        "0.6s",
        "fa-medal",
        format!("Top {} Models by ROC-AUC", limits.top_models),
    )
    .child(
        div().class("radar-container").children(
            data.models
                .iter()
                .take(limits.top_models)
                .enumerate()
                .map(|(position, model)| {
                    let label = Node::Fragment(vec![
                        icon("fa-trophy")
                            .style(format!("color: {}", medal_color(position)))
                            .into(),
                        text(format!(" {}", model.name)),
                    ]);
                    radar_item(label, model.roc_auc)
                }),
        ),
    );

    div()
        .class("charts-container")
        .child(bar_chart)
        .child(best_metrics)
        .child(by_category)
        .child(top_models)
}

/// Full comparison report: stat tiles, ranked table and derived charts
pub fn render_comparison(data: &ComparisonData, limits: RenderLimits) -> Node {
    let summary = ComparisonSummary::from_data(data);
    fragment([
        stats_row(&summary),
        models_table(&data.models),
        charts(data, limits),
    ])
}

/// Notice shown when the comparison could not be loaded, whatever the cause
pub fn render_comparison_error() -> Node {
    div()
        .class("error-message")
        .child(icon("fa-exclamation-circle"))
        .child(el("p").child("Failed to load comparison data"))
        .into()
}
