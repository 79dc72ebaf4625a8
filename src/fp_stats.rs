//! Statistics and results for the Monte-Carlo harness

use crate::fp_classify::Outcome;
use crate::fp_interface::AttachmentBudget;

/// Standard normal quantile for a 95% interval
pub const DEFAULT_Z: f64 = 1.96;

/// Desired confidence half width, percent of the mean
pub const DEFAULT_HALF_WIDTH_PERCENT: f64 = 0.5;

// ============================================================================
// Estimators
// ============================================================================

pub fn mean(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    Some(series.iter().sum::<f64>() / series.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(series: &[f64]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let m = mean(series)?;
    let ss: f64 = series.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (series.len() - 1) as f64).sqrt())
}

/// Trials needed for a half width of `r` percent of the mean:
/// `n = (100 * z * s / (r * mean))^2`
pub fn required_sample_size(series: &[f64], z: f64, r: f64) -> Option<f64> {
    let m = mean(series)?;
    let s = sample_std_dev(series)?;
    if m == 0.0 || r <= 0.0 {
        return None;
    }
    Some(((100.0 * z * s) / (r * m)).powi(2))
}

/// Half width, as percent of the mean, achieved after `n` trials:
/// `r = 100 * z * s / (sqrt(n) * mean)`
pub fn achieved_precision(series: &[f64], z: f64, n: usize) -> Option<f64> {
    let m = mean(series)?;
    let s = sample_std_dev(series)?;
    if m == 0.0 || n == 0 {
        return None;
    }
    Some((100.0 * z * s) / ((n as f64).sqrt() * m))
}

// ============================================================================
// Trial Records
// ============================================================================

/// Which anchor won a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    AnchorA,
    AnchorB,
    Tie,
}

impl Winner {
    pub fn of(outcome: &Outcome) -> Self {
        use std::cmp::Ordering::*;
        match outcome.positive.cmp(&outcome.negative) {
            Greater => Winner::AnchorA,
            Less => Winner::AnchorB,
            Equal => Winner::Tie,
        }
    }
}

/// Result of one completed trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// Trial index
    pub trial: usize,

    /// Follower counts
    pub outcome: Outcome,

    /// Degenerate graphs discarded before this trial completed
    pub retries: usize,

    /// Rounds the iterative solver needed
    pub iterations: usize,

    /// Largest closed-form vs iterative gap
    pub max_solver_gap: f64,
}

impl TrialRecord {
    pub fn winner(&self) -> Winner {
        Winner::of(&self.outcome)
    }
}

// ============================================================================
// Simulation Report
// ============================================================================

/// Sample size analysis for one follower series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizeEstimate {
    /// Trials needed for the configured half width
    pub required: Option<f64>,

    /// Half width achieved by the trials run, percent of mean
    pub precision: Option<f64>,
}

impl SampleSizeEstimate {
    pub fn from_series(series: &[f64], z: f64, half_width_percent: f64) -> Self {
        Self {
            required: required_sample_size(series, z, half_width_percent),
            precision: achieved_precision(series, z, series.len()),
        }
    }
}

/// Aggregate result of a Monte-Carlo run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Configuration summary
    pub config_summary: String,

    /// Seed used for the run
    pub seed_used: u64,

    pub anchor_a: AttachmentBudget,
    pub anchor_b: AttachmentBudget,

    /// Completed trials
    pub simulations: usize,

    /// Degenerate graphs discarded across the run
    pub total_retries: usize,

    /// Mean fraction following A / B / neither
    pub mean_pos: f64,
    pub mean_neg: f64,
    pub mean_neutral: f64,

    /// Win and tie percentages (0 to 100)
    pub win_pct_a: f64,
    pub win_pct_b: f64,
    pub tie_pct: f64,

    /// Sample size analysis of the A and B follower series
    pub sample_size_a: SampleSizeEstimate,
    pub sample_size_b: SampleSizeEstimate,

    /// Per-trial records in trial order
    pub trials: Vec<TrialRecord>,
}

impl SimulationReport {
    /// Reduce trial records, in order, into a report
    pub fn from_trials(
        config_summary: String,
        seed_used: u64,
        anchor_a: AttachmentBudget,
        anchor_b: AttachmentBudget,
        z: f64,
        half_width_percent: f64,
        trials: Vec<TrialRecord>,
    ) -> Self {
        let pos: Vec<f64> = trials.iter().map(|t| t.outcome.positive_fraction()).collect();
        let neg: Vec<f64> = trials.iter().map(|t| t.outcome.negative_fraction()).collect();
        let neutral: Vec<f64> = trials.iter().map(|t| t.outcome.neutral_fraction()).collect();

        let (mut wins_a, mut wins_b, mut ties) = (0usize, 0usize, 0usize);
        for trial in &trials {
            match trial.winner() {
                Winner::AnchorA => wins_a += 1,
                Winner::AnchorB => wins_b += 1,
                Winner::Tie => ties += 1,
            }
        }

        let simulations = trials.len();
        let pct = |count: usize| {
            if simulations == 0 {
                0.0
            } else {
                count as f64 / simulations as f64 * 100.0
            }
        };

        Self {
            config_summary,
            seed_used,
            anchor_a,
            anchor_b,
            simulations,
            total_retries: trials.iter().map(|t| t.retries).sum(),
            mean_pos: mean(&pos).unwrap_or(0.0),
            mean_neg: mean(&neg).unwrap_or(0.0),
            mean_neutral: mean(&neutral).unwrap_or(0.0),
            win_pct_a: pct(wins_a),
            win_pct_b: pct(wins_b),
            tie_pct: pct(ties),
            sample_size_a: SampleSizeEstimate::from_series(&pos, z, half_width_percent),
            sample_size_b: SampleSizeEstimate::from_series(&neg, z, half_width_percent),
            trials,
        }
    }

    /// Print a summary of the simulation results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Forceful Peers Simulation Results               ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  {}", self.config_summary);
        println!("  Seed: {}", self.seed_used);
        println!(
            "  Simulations: {} ({} degenerate graphs retried)\n",
            self.simulations, self.total_retries
        );

        println!(
            "                      {:>16} {:>16} {:>10}",
            self.anchor_a.strategy.tag(),
            self.anchor_b.strategy.tag(),
            "neutral"
        );
        println!(
            "  Followers:          {:>15.2}% {:>15.2}% {:>9.2}%",
            self.mean_pos * 100.0,
            self.mean_neg * 100.0,
            self.mean_neutral * 100.0
        );
        println!(
            "  Wins:               {:>15.2}% {:>15.2}% {:>9.2}%",
            self.win_pct_a, self.win_pct_b, self.tie_pct
        );
        println!();

        println!("Sample Size:");
        for (label, estimate) in [("A", &self.sample_size_a), ("B", &self.sample_size_b)] {
            match (estimate.required, estimate.precision) {
                (Some(required), Some(precision)) => println!(
                    "  Anchor {}: {:.0} trials needed, achieved ±{:.3}% of mean",
                    label,
                    required.ceil(),
                    precision
                ),
                _ => println!("  Anchor {}: not enough variation to estimate", label),
            }
        }

        let iterations: Vec<usize> = self.trials.iter().map(|t| t.iterations).collect();
        if let (Some(min), Some(max)) = (iterations.iter().min(), iterations.iter().max()) {
            let avg = iterations.iter().sum::<usize>() as f64 / iterations.len() as f64;
            println!();
            println!("Solver:");
            println!("  Iterations: min={}, max={}, avg={:.1}", min, max, avg);
        }
        println!();
    }
}
