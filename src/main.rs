use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod client;
mod config;
mod error;
mod html;
mod models;
mod output;
mod page;
mod render;
mod runner;

use crate::config::Config;
use crate::models::PatientForm;
use crate::output::{OutputFormat, Scope};
use crate::runner::Runner;

/// Disease PredictionIQ client - submit patient data and render model reports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the service base URL from the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output format: html, plain or json
    #[arg(short, long, default_value = "html", global = true)]
    output: OutputFormat,

    /// Write the output to this file instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Verbose output - log every request
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a patient form and render the diagnosis
    Predict(FormArgs),
    /// Render the deployed model's details and metrics
    ModelInfo,
    /// Render the comparison of every trained model
    Compare,
    /// Load every panel into one standalone page
    Dashboard(FormArgs),
}

#[derive(clap::Args, Debug, Default)]
struct FormArgs {
    /// Start from the sample patient
    #[arg(long)]
    sample: bool,

    /// Read form fields from a TOML or JSON file
    #[arg(long)]
    form: Option<PathBuf>,

    /// Set a single field, e.g. --field age=54
    #[arg(long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,
}

impl FormArgs {
    /// Build the form, or `None` when no field source was given
    fn build(&self) -> anyhow::Result<Option<PatientForm>> {
        if !self.sample && self.form.is_none() && self.fields.is_empty() {
            return Ok(None);
        }

        let mut form = if self.sample {
            PatientForm::sample()
        } else {
            PatientForm::new()
        };
        if let Some(path) = &self.form {
            for (name, value) in PatientForm::from_file(path)?.ordered() {
                form.set(name, value);
            }
        }
        for assignment in &self.fields {
            form.apply_assignment(assignment)?;
        }
        Ok(Some(form))
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let runner = Runner::new(&config)?;

    let (report, scope) = match &args.command {
        Command::Predict(form_args) => {
            let form = form_args.build()?.ok_or_else(|| {
                anyhow::anyhow!("No form fields given; use --sample, --form or --field")
            })?;
            (runner.predict(form).await?, Scope::Panels)
        }
        Command::ModelInfo => (runner.model_info().await?, Scope::Panels),
        Command::Compare => (runner.compare().await?, Scope::Panels),
        Command::Dashboard(form_args) => {
            (runner.dashboard(form_args.build()?).await?, Scope::Document)
        }
    };

    let rendered = output::render(&report, runner.page(), args.output, scope)?;
    output::emit(&rendered, args.out.as_deref())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_predict_arguments() {
        let args = Args::try_parse_from([
            "predictioniq",
            "predict",
            "--sample",
            "--field",
            "age=41",
            "-o",
            "plain",
        ])
        .unwrap();
        assert_eq!(args.output, OutputFormat::Plain);
        match args.command {
            Command::Predict(form_args) => {
                let form = form_args.build().unwrap().unwrap();
                assert_eq!(form.get("age"), Some("41"));
                assert_eq!(form.get("cholesterol"), Some("233"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_dashboard_without_form_fields() {
        let args =
            Args::try_parse_from(["predictioniq", "dashboard", "--out", "report.html"]).unwrap();
        assert_eq!(args.out, Some(PathBuf::from("report.html")));
        assert_eq!(args.output, OutputFormat::Html);
        match args.command {
            Command::Dashboard(form_args) => assert!(form_args.build().unwrap().is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_field_assignment() {
        let form_args = FormArgs {
            fields: vec!["age".to_string()],
            ..FormArgs::default()
        };
        assert!(form_args.build().is_err());
    }
}
