//! Pure render functions: typed payload in, HTML tree out.

mod comparison;
mod model_info;
mod prediction;

pub use comparison::{
    category_averages, render_comparison, render_comparison_error, ComparisonSummary,
};
pub use model_info::{render_model_info, render_model_info_error};
pub use prediction::{prediction_error_message, render_prediction, render_prediction_error};

use crate::config::Config;
use crate::html::{div, icon, text, Node};

/// How many entries the truncated views show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub feature_preview: usize,
    pub bar_chart: usize,
    pub top_models: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            feature_preview: 6,
            bar_chart: 8,
            top_models: 5,
        }
    }
}

impl From<&Config> for RenderLimits {
    fn from(config: &Config) -> Self {
        Self {
            feature_preview: config.feature_preview,
            bar_chart: config.bar_chart_limit,
            top_models: config.top_models_limit,
        }
    }
}

/// A [0, 1] metric as a percentage, e.g. `0.8851` with 2 decimals is `88.51%`
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{}%", to_fixed(value * 100.0, decimals))
}

/// Fixed-point formatting that rounds exact ties away from zero.
///
/// `format!` rounds a value lying exactly halfway to even, so `81.25` with one
/// decimal would print as `81.2` where the browser prints `81.3`.
fn to_fixed(value: f64, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, value);
    if !value.is_finite() {
        return rounded;
    }

    // A finite f64 terminates within 1074 fractional digits, so this is exact.
    let exact = format!("{:.1074}", value.abs());
    let Some((whole, fraction)) = exact.split_once('.') else {
        return rounded;
    };
    let (kept, rest) = fraction.split_at(decimals.min(fraction.len()));
    let tie = rest
        .strip_prefix('5')
        .is_some_and(|tail| tail.bytes().all(|b| b == b'0'));
    if !tie {
        return rounded;
    }

    let mut digits: Vec<char> = whole.chars().chain(kept.chars()).collect();
    let mut carry = true;
    for digit in digits.iter_mut().rev() {
        if *digit == '9' {
            *digit = '0';
        } else {
            *digit = char::from(*digit as u8 + 1);
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, '1');
    }

    let split = digits.len() - kept.len();
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.extend(&digits[..split]);
    if !kept.is_empty() {
        out.push('.');
        out.extend(&digits[split..]);
    }
    out
}

/// Width for a bar or progress fill, unrounded like the value it reflects
fn width_style(value: f64) -> String {
    format!("width: {}%", value * 100.0)
}

/// The red "no results" notice shared by every panel
fn failure_notice(message: Node) -> crate::html::Element {
    div()
        .class("no-results")
        .style("color: var(--danger-color);")
        .child(icon("fa-exclamation-circle"))
        .child(message)
}

fn paragraph(message: &'static str) -> Node {
    crate::html::el("p").child(text(message)).into()
}
