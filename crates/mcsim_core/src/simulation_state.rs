use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::error::EvaluationError;
use crate::evaluate::Formula;
use crate::metrics::RunMetrics;
use crate::model::{Model, Variable};

/// Working state of one engine run, advanced one batch at a time
#[derive(Debug)]
pub struct SimulationRun<'m> {
    pub trial_count: usize,
    pub batch_size: usize,
    formula: &'m Formula,
    sampling: RunSampling<'m>,
    progress: RunProgress,
}

/// Per-variable random streams and the current batch of draws
#[derive(Debug)]
struct RunSampling<'m> {
    variables: &'m [Arc<Variable>],
    /// One stream per variable, in declaration order
    streams: Vec<SmallRng>,
    /// `sample_matrix[v][i]` is variable `v`'s draw for trial `i` of the batch
    sample_matrix: Vec<Vec<f64>>,
}

#[derive(Debug)]
struct RunProgress {
    /// Scratch row of one trial's values, indexed by slot
    row: Vec<f64>,
    outcomes: Vec<f64>,
    metrics: RunMetrics,
}

impl<'m> SimulationRun<'m> {
    /// Derive one stream per variable from `master`, in declaration order.
    pub fn new<R: RngCore + ?Sized>(
        model: &'m Model,
        trial_count: usize,
        batch_size: usize,
        master: &mut R,
    ) -> Self {
        let variables = model.variables();
        let streams = variables
            .iter()
            .map(|_| SmallRng::seed_from_u64(master.next_u64()))
            .collect();
        let batch_size = batch_size.clamp(1, trial_count.max(1));

        Self {
            trial_count,
            batch_size,
            formula: model.formula(),
            sampling: RunSampling {
                variables,
                streams,
                sample_matrix: vec![Vec::with_capacity(batch_size); variables.len()],
            },
            progress: RunProgress {
                row: vec![0.0; variables.len()],
                outcomes: Vec::with_capacity(trial_count),
                metrics: RunMetrics::new(trial_count),
            },
        }
    }

    /// Number of trials evaluated so far
    pub fn completed(&self) -> usize {
        self.progress.outcomes.len()
    }

    pub fn is_finished(&self) -> bool {
        self.completed() >= self.trial_count
    }

    /// Sample and evaluate the next batch. Returns the batch size, 0 once
    /// every trial is done.
    pub fn step(&mut self) -> Result<usize, EvaluationError> {
        let size = self.batch_size.min(self.trial_count - self.completed());
        if size == 0 {
            return Ok(0);
        }

        let sampling = &mut self.sampling;
        for ((variable, stream), buf) in sampling
            .variables
            .iter()
            .zip(sampling.streams.iter_mut())
            .zip(sampling.sample_matrix.iter_mut())
        {
            variable.sample_into(size, stream, buf);
        }

        let progress = &mut self.progress;
        for i in 0..size {
            for (slot, column) in sampling.sample_matrix.iter().enumerate() {
                progress.row[slot] = column[i];
            }
            let outcome = self.formula.evaluate_slots(&progress.row)?;
            progress.outcomes.push(outcome);
        }

        progress.metrics.record_batch(size, sampling.variables.len());
        progress.metrics.record_evaluations(size);
        Ok(size)
    }

    /// Draws of the most recent batch for the variable in `slot`
    pub fn batch_samples(&self, slot: usize) -> Option<&[f64]> {
        self.sampling.sample_matrix.get(slot).map(Vec::as_slice)
    }

    pub fn outcomes(&self) -> &[f64] {
        &self.progress.outcomes
    }

    pub fn into_parts(self) -> (Vec<f64>, RunMetrics) {
        (self.progress.outcomes, self.progress.metrics)
    }
}
