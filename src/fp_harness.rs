//! Monte-Carlo Harness
//!
//! Repeats the full pipeline `simulations` times:
//!
//! 1. generate a fresh random graph of normal peers
//! 2. attach both anchors with their strategies and budgets
//! 3. solve the steady state in closed form and by iteration
//! 4. cross-check both results (a mismatch aborts the run)
//! 5. classify the normal peers and record the winner
//!
//! Every trial draws from its own `StdRng`, seeded from a master generator
//! that is seeded once from the top-level seed. Trials can therefore run on
//! the rayon pool and still reduce, in trial order, to the same report as a
//! sequential run.
//!
//! Degenerate random graphs (a zero-degree peer under `inverse_degree`, a
//! peer left isolated after attachment) discard the attempt and draw a new
//! graph from the same trial generator; they never count as a trial.

use crate::fp_attach::{attach, AttachError};
use crate::fp_classify::{classify, ClassifyError, Outcome};
use crate::fp_config::{ConfigError, HarnessConfig};
use crate::fp_graph::{GraphError, WeightedMultigraph};
use crate::fp_oracle::{verify, ConvergenceMismatch};
use crate::fp_solver::{OpinionSolver, SolverError};
use crate::fp_stats::{SimulationReport, TrialRecord};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

/// Failure of a single trial attempt
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Mismatch(#[from] ConvergenceMismatch),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl TrialError {
    /// Errors caused by an unlucky random graph; the trial is retried
    pub fn is_degenerate(&self) -> bool {
        match self {
            TrialError::Attach(e) => e.is_degenerate(),
            TrialError::Solver(SolverError::IsolatedPeer(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Non-recoverable trial failure; aborts the run
    #[error("trial {trial} aborted: {source}")]
    Trial {
        trial: usize,
        #[source]
        source: TrialError,
    },

    #[error("trial {trial} gave up after {attempts} degenerate graphs (last: {last})")]
    RetriesExhausted {
        trial: usize,
        attempts: usize,
        last: TrialError,
    },
}

impl HarnessError {
    pub fn is_convergence_mismatch(&self) -> bool {
        matches!(
            self,
            HarnessError::Trial {
                source: TrialError::Mismatch(_),
                ..
            }
        )
    }
}

/// What one evaluated graph produced
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub iterations: usize,
    pub max_solver_gap: f64,
}

/// Runs independent trials and aggregates them into a [`SimulationReport`]
#[derive(Debug, Clone)]
pub struct MonteCarloHarness {
    config: HarnessConfig,
    solver: OpinionSolver,
}

impl MonteCarloHarness {
    /// Validate `config` and build the harness
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let solver = OpinionSolver::new(config.alpha)
            .map_err(|_| ConfigError::InvalidAlpha(config.alpha))?
            .with_threshold(config.convergence.threshold)
            .with_max_iterations(config.convergence.max_iterations);
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run all trials
    pub fn run(&self) -> Result<SimulationReport, HarnessError> {
        let seed = self.config.resolve_seed();
        let mut master = StdRng::seed_from_u64(seed);
        let trial_seeds: Vec<u64> = (0..self.config.simulations)
            .map(|_| master.next_u64())
            .collect();

        info!(
            "Starting {} simulations ({}), seed {}",
            self.config.simulations,
            self.config.summary(),
            seed
        );

        let trials = if self.config.parallel {
            trial_seeds
                .par_iter()
                .enumerate()
                .map(|(trial, &trial_seed)| self.run_trial(trial, trial_seed))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            trial_seeds
                .iter()
                .enumerate()
                .map(|(trial, &trial_seed)| self.run_trial(trial, trial_seed))
                .collect::<Result<Vec<_>, _>>()?
        };

        let report = SimulationReport::from_trials(
            self.config.summary(),
            seed,
            self.config.anchor_a,
            self.config.anchor_b,
            self.config.confidence.z,
            self.config.confidence.half_width_percent,
            trials,
        );

        info!(
            "Finished {} simulations ({} retried): {} wins {:.2}%, {} wins {:.2}%, ties {:.2}%",
            report.simulations,
            report.total_retries,
            report.anchor_a.strategy,
            report.win_pct_a,
            report.anchor_b.strategy,
            report.win_pct_b,
            report.tie_pct
        );
        Ok(report)
    }

    /// Run one trial from its own seed, retrying degenerate graphs
    pub fn run_trial(&self, trial: usize, trial_seed: u64) -> Result<TrialRecord, HarnessError> {
        let mut rng = StdRng::seed_from_u64(trial_seed);
        let mut retries = 0;

        loop {
            match self.attempt(&mut rng) {
                Ok(evaluation) => {
                    debug!(
                        "trial {}: {:?} after {} retries, {} iterations",
                        trial, evaluation.outcome, retries, evaluation.iterations
                    );
                    return Ok(TrialRecord {
                        trial,
                        outcome: evaluation.outcome,
                        retries,
                        iterations: evaluation.iterations,
                        max_solver_gap: evaluation.max_solver_gap,
                    });
                }
                Err(e) if e.is_degenerate() => {
                    retries += 1;
                    warn!("trial {}: {}, match ignored and retried", trial, e);
                    if retries > self.config.max_retries {
                        return Err(HarnessError::RetriesExhausted {
                            trial,
                            attempts: retries,
                            last: e,
                        });
                    }
                }
                Err(e) => {
                    if let TrialError::Mismatch(mismatch) = &e {
                        error!("trial {}: {}", trial, mismatch);
                    }
                    return Err(HarnessError::Trial { trial, source: e });
                }
            }
        }
    }

    /// Generate, attach and evaluate one graph
    fn attempt(&self, rng: &mut StdRng) -> Result<Evaluation, TrialError> {
        let mut graph = self
            .config
            .topology
            .generate(self.config.num_peers, rng)?;
        self.config.initial_opinions.apply(&mut graph, rng)?;
        attach(&mut graph, rng, self.config.anchor_a, self.config.anchor_b)?;
        self.evaluate(&mut graph)
    }

    /// Solve, cross-check and classify an attached graph
    ///
    /// The closed-form opinions are written back to the normal peers before
    /// classification.
    pub fn evaluate(&self, graph: &mut WeightedMultigraph) -> Result<Evaluation, TrialError> {
        let closed_form = self.solver.solve(graph)?;
        let iterated = self.solver.iterate(graph)?;
        verify(
            &closed_form,
            &iterated.opinions,
            self.config.convergence.decimal_places,
        )?;

        let max_solver_gap = closed_form
            .iter()
            .zip(&iterated.opinions)
            .map(|(c, i)| (c - i).abs())
            .fold(0.0, f64::max);

        graph.set_opinions(&closed_form)?;
        let outcome = classify(graph, self.config.neutral_range)?;

        Ok(Evaluation {
            outcome,
            iterations: iterated.iterations,
            max_solver_gap,
        })
    }
}
