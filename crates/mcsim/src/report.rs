//! Run reports
//!
//! A [`Report`] gathers what one invocation prints: the model, summary
//! statistics, and the answers to any goal and estimate queries. It renders
//! either as a plain-text summary or as JSON.

use std::io::{self, Write};

use mcsim_core::model::{GoalProbability, Model, Outlook, Results, Statistics};
use mcsim_core::RunMetrics;
use serde::Serialize;

use crate::util::format::{format_compact, format_number, format_percentage};

const RULE: &str = "─────────────────────────────────────";
const VALUE_WIDTH: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct GoalReport {
    #[serde(flatten)]
    pub goal: GoalProbability,
    pub outlook: Outlook,
}

/// One estimate query. A failed query carries its error instead of a value.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    pub x: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub formula: String,
    pub variables: Vec<String>,
    pub trials: usize,
    pub seed: Option<u64>,
    pub statistics: Statistics,
    pub interval_95: (f64, f64),
    pub metrics: RunMetrics,
    pub goals: Vec<GoalReport>,
    pub estimates: Vec<EstimateReport>,
}

impl Report {
    pub fn new(
        model: &Model,
        results: &Results,
        seed: Option<u64>,
        goals: &[f64],
        estimates: &[f64],
    ) -> Self {
        let statistics = *results.statistics();
        let goals = goals
            .iter()
            .map(|&target| {
                let goal = results.goal_probability(target);
                GoalReport {
                    outlook: goal.outlook(),
                    goal,
                }
            })
            .collect();
        let estimates = estimates
            .iter()
            .map(|&x| match results.estimate(x) {
                Ok(estimate) => EstimateReport {
                    x,
                    y: Some(estimate.y),
                    percentile: Some(estimate.percentile),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(x, error = %e, "estimate failed");
                    EstimateReport {
                        x,
                        y: None,
                        percentile: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        Self {
            formula: model.formula().source().to_string(),
            variables: model.variables().iter().map(ToString::to_string).collect(),
            trials: results.len(),
            seed,
            statistics,
            interval_95: statistics.interval_95(),
            metrics: results.metrics().clone(),
            goals,
            estimates,
        }
    }

    pub fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }

    pub fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
        let s = &self.statistics;

        writeln!(out, "Simulation statistics")?;
        writeln!(out, "=====================")?;
        writeln!(out, "  y = {}", self.formula)?;
        for variable in &self.variables {
            writeln!(out, "  {variable}")?;
        }
        match self.seed {
            Some(seed) => writeln!(out, "  {} trials (seed {seed})", format_number(self.trials as f64, 0))?,
            None => writeln!(out, "  {} trials", format_number(self.trials as f64, 0))?,
        }

        section(out, "Central tendency")?;
        stat_line(out, "Mean:", s.mean)?;
        stat_line(out, "Median:", s.median)?;

        section(out, "Dispersion")?;
        stat_line(out, "Std deviation:", s.std)?;
        stat_line(out, "Minimum:", s.min)?;
        stat_line(out, "Maximum:", s.max)?;

        section(out, "Percentiles")?;
        stat_line(out, "P2.5:", s.p2_5)?;
        stat_line(out, "P25 (Q1):", s.p25)?;
        stat_line(out, "P75 (Q3):", s.p75)?;
        stat_line(out, "P97.5:", s.p97_5)?;

        section(out, "95% interval")?;
        let (low, high) = self.interval_95;
        writeln!(out, "  [{}  -  {}]", format_number(low, 4), format_number(high, 4))?;

        if !self.goals.is_empty() {
            section(out, "Goals")?;
            for g in &self.goals {
                writeln!(
                    out,
                    "  y >= {}: percentile {:.2} | probability {} ({})",
                    format_number(g.goal.target, 2),
                    g.goal.percentile,
                    format_percentage(g.goal.probability),
                    g.outlook
                )?;
            }
        }

        if !self.estimates.is_empty() {
            section(out, "Estimates")?;
            for e in &self.estimates {
                match (e.y, e.percentile, &e.error) {
                    (Some(y), Some(percentile), _) => writeln!(
                        out,
                        "  x = {}: y = {} | percentile {:.2}",
                        format_number(e.x, 2),
                        format_compact(y),
                        percentile
                    )?,
                    (_, _, error) => writeln!(
                        out,
                        "  x = {}: error: {}",
                        format_number(e.x, 2),
                        error.as_deref().unwrap_or("no value")
                    )?,
                }
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "  completed in {:.3}s ({} trials/s)",
            self.metrics.elapsed.as_secs_f64(),
            format_number(self.metrics.trials_per_second(), 0)
        )
    }
}

fn section(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {title}")?;
    writeln!(out, "  {RULE}")
}

fn stat_line(out: &mut dyn Write, label: &str, value: f64) -> io::Result<()> {
    writeln!(
        out,
        "  {:<20}{:>width$}",
        label,
        format_number(value, 4),
        width = VALUE_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsim_core::config::ModelBuilder;
    use mcsim_core::simulation::Engine;

    fn report(goals: &[f64], estimates: &[f64]) -> Report {
        let model = ModelBuilder::new()
            .formula("x * 100 + y")
            .uniform("x", 0.0, 10.0)
            .normal("y", 0.0, 1.0)
            .build()
            .unwrap();
        let results = Engine::new().with_seed(3).run(&model, 1_000).unwrap();
        Report::new(&model, &results, Some(3), goals, estimates)
    }

    fn render(report: &Report) -> String {
        let mut buf = Vec::new();
        report.render_text(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_sections() {
        let text = render(&report(&[500.0], &[]));
        assert!(text.contains("y = x * 100 + y"));
        assert!(text.contains("1,000 trials (seed 3)"));
        for heading in ["Central tendency", "Dispersion", "Percentiles", "95% interval", "Goals"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(!text.contains("Estimates"));
        assert!(text.contains("y >= 500.00: percentile"));
    }

    #[test]
    fn test_failed_estimate_is_reported_not_fatal() {
        // `y` is unbound during estimation, so every estimate fails
        let r = report(&[], &[5.0]);
        assert_eq!(r.estimates.len(), 1);
        assert!(r.estimates[0].y.is_none());
        assert!(r.estimates[0].error.as_deref().unwrap().contains('y'));

        let text = render(&r);
        assert!(text.contains("x = 5.00: error:"));
    }

    #[test]
    fn test_goal_outlook() {
        let r = report(&[-1_000.0, 2_000.0], &[]);
        assert_eq!(r.goals[0].outlook, Outlook::Likely);
        assert_eq!(r.goals[0].goal.probability, 100.0);
        assert_eq!(r.goals[1].outlook, Outlook::Unlikely);
        assert_eq!(r.goals[1].goal.probability, 0.0);
    }

    #[test]
    fn test_json_shape() {
        let r = report(&[500.0], &[5.0]);
        let mut buf = Vec::new();
        r.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["trials"], 1000);
        assert_eq!(value["seed"], 3);
        assert_eq!(value["variables"].as_array().unwrap().len(), 2);
        assert!(value["statistics"]["mean"].is_f64());
        assert_eq!(value["goals"][0]["target"], 500.0);
        assert!(!value["goals"][0]["outlook"].as_str().unwrap().is_empty());
        assert!(value["estimates"][0].get("y").is_none());
        assert!(value["estimates"][0]["error"].is_string());
        assert!(value["metrics"]["elapsed"].is_f64());
    }
}
