//! Command-line interface

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use mcsim_core::config::ModelConfig;

use crate::model_file;
use crate::report::Report;
use crate::util::io::write_values;

#[derive(Parser, Debug)]
#[command(name = "mcsim")]
#[command(about = "Monte Carlo simulation of a formula over random variables")]
#[command(allow_negative_numbers = true)]
pub struct Args {
    /// Path to the YAML model file
    pub model: PathBuf,

    /// Number of trials (overrides the model file)
    #[arg(short = 'n', long)]
    pub trials: Option<i64>,

    /// Seed for reproducible runs (overrides the model file)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Trials sampled and evaluated per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Goal value to evaluate; may be repeated
    #[arg(short, long = "goal", value_parser = parse_finite)]
    pub goals: Vec<f64>,

    /// Value of the first variable to estimate the result for; may be repeated
    #[arg(short, long = "estimate", value_parser = parse_finite)]
    pub estimates: Vec<f64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write every outcome, one per line, to this file
    #[arg(short, long)]
    pub outcomes: Option<PathBuf>,

    /// Write the model, with command-line overrides applied, to this file
    #[arg(long)]
    pub save_model: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{s} is not a finite number"))
    }
}

/// Command-line values take precedence over the model file
pub fn apply_overrides(config: &mut ModelConfig, args: &Args) {
    if let Some(trials) = args.trials {
        config.simulation.trials = trials;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    if args.batch_size.is_some() {
        config.simulation.batch_size = args.batch_size;
    }
}

/// Load the model, run it, and write the report to `out`
pub fn run(args: &Args, out: &mut dyn Write) -> color_eyre::Result<()> {
    let mut config = model_file::load(&args.model)?;
    apply_overrides(&mut config, args);
    if let Some(path) = &args.save_model {
        model_file::save(path, &config)?;
        tracing::info!(path = %path.display(), "saved model");
    }

    let model = config.build()?;
    let trials = config.simulation.trial_count()?;
    let engine = config.engine();

    tracing::info!(
        formula = %model.formula().source(),
        variables = model.len(),
        trials,
        seed = ?engine.seed(),
        batch_size = engine.batch_size(),
        "starting simulation"
    );
    let results = engine.run(&model, trials)?;
    tracing::info!(
        elapsed_ms = results.metrics().elapsed.as_millis() as u64,
        mean = results.statistics().mean,
        "simulation complete"
    );

    if let Some(path) = &args.outcomes {
        write_values(path, results.outcomes())
            .wrap_err_with(|| format!("failed to write outcomes to {}", path.display()))?;
    }

    let report = Report::new(&model, &results, engine.seed(), &args.goals, &args.estimates);
    if args.json {
        report.write_json(out)?;
    } else {
        report.render_text(out)?;
    }
    Ok(())
}
