use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::error::{InvalidTrialCountError, RunError};
use crate::model::{Model, Results};
use crate::simulation_state::SimulationRun;

/// Trials sampled and evaluated together unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Runs a [`Model`] for a number of trials.
///
/// The engine itself is stateless configuration; every call to
/// [`Engine::run`] starts fresh from the configured seed, so two runs of an
/// engine with a seed produce identical outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    seed: Option<u64>,
    batch_size: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the master generator for reproducible runs
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_optional_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Trials per sample/evaluate batch. Does not affect the outcomes, only
    /// peak memory. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `trials` trials of `model`.
    ///
    /// Fails with [`RunError::InvalidTrialCount`] for zero trials and with
    /// [`RunError::Evaluation`] as soon as any trial fails to evaluate.
    pub fn run(&self, model: &Model, trials: usize) -> Result<Results, RunError> {
        let mut master = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.run_with_rng(model, trials, &mut master)
    }

    /// Run with a caller-supplied master generator. The configured seed is
    /// ignored.
    pub fn run_with_rng<R: RngCore + ?Sized>(
        &self,
        model: &Model,
        trials: usize,
        master: &mut R,
    ) -> Result<Results, RunError> {
        if trials == 0 {
            return Err(InvalidTrialCountError { requested: 0 }.into());
        }

        tracing::debug!(
            formula = model.formula().source(),
            variables = model.len(),
            trials,
            batch_size = self.batch_size,
            seed = ?self.seed,
            "starting run"
        );
        let start = Instant::now();

        let mut run = SimulationRun::new(model, trials, self.batch_size, master);
        while !run.is_finished() {
            let size = run.step().inspect_err(|e| {
                tracing::debug!(completed = run.completed(), error = %e, "run aborted");
            })?;
            tracing::trace!(size, completed = run.completed(), trials, "batch done");
        }

        let (outcomes, mut metrics) = run.into_parts();
        metrics.elapsed = start.elapsed();
        tracing::debug!(
            trials,
            batches = metrics.batches,
            elapsed_ms = metrics.elapsed.as_millis() as u64,
            "run finished"
        );

        Ok(Results::new(model.shared_formula(), outcomes, metrics))
    }
}

/// Validate a signed trial count, as read from files or the command line
pub fn trial_count(requested: i64) -> Result<usize, InvalidTrialCountError> {
    usize::try_from(requested)
        .ok()
        .filter(|&n| n > 0)
        .ok_or(InvalidTrialCountError { requested })
}

/// Run `model` once with a fresh OS-seeded engine
pub fn simulate(model: &Model, trials: usize) -> Result<Results, RunError> {
    Engine::new().run(model, trials)
}
