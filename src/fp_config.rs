//! Monte-Carlo Harness Configuration

use crate::fp_interface::{AttachmentBudget, Strategy};
use crate::fp_oracle::{tolerance, DEFAULT_DECIMAL_PLACES};
use crate::fp_solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD};
use crate::fp_stats::{DEFAULT_HALF_WIDTH_PERCENT, DEFAULT_Z};
use crate::fp_topology::{InitialOpinions, Topology};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

/// Invalid or unknown configuration; raised before any trial runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown strategy '{0}' (expected uniform, degree, degree_squared or inverse_degree)")]
    UnknownStrategy(String),

    #[error("unknown graph type '{0}' (expected erdos_renyi, geometric or barabasi_albert)")]
    UnknownGraphType(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("alpha {0} outside (0, 1)")]
    InvalidAlpha(f64),

    #[error("population must contain at least one normal peer")]
    EmptyPopulation,

    #[error("neutral range {0} must be non-negative")]
    InvalidNeutralRange(f64),

    #[error("at least one simulation is required")]
    NoSimulations,

    #[error("convergence threshold {0} must be positive")]
    InvalidThreshold(f64),

    #[error("iteration ceiling must be at least 1")]
    InvalidMaxIterations,

    /// Iteration can stop `threshold * (1 - alpha) / alpha` away from the
    /// fixed point, which must stay inside the cross-check tolerance
    #[error(
        "threshold {threshold} too loose for alpha {alpha}: iteration may stop \
         outside the {decimal_places} decimal place cross-check"
    )]
    LooseThreshold {
        threshold: f64,
        alpha: f64,
        decimal_places: u32,
    },

    #[error("initial opinions range [{low}, {high}) must be non-empty and inside [-1, 1]")]
    InvalidInitialOpinions { low: f64, high: f64 },

    #[error("confidence settings need z > 0 and half width > 0")]
    InvalidConfidence,
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Configuration of a Monte-Carlo run
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Number of normal peers per trial
    pub num_peers: usize,

    /// Random graph model for the normal peers
    pub topology: Topology,

    /// Self-opinion weight
    pub alpha: f64,

    /// Anchor A (+1)
    pub anchor_a: AttachmentBudget,

    /// Anchor B (-1)
    pub anchor_b: AttachmentBudget,

    /// Opinions within [-range, range] count as neutral
    pub neutral_range: f64,

    /// Completed trials to run (retries not counted)
    pub simulations: usize,

    /// Top-level seed (None = generate random)
    pub seed: Option<u64>,

    /// How normal peers start
    pub initial_opinions: InitialOpinions,

    /// Solver and oracle settings
    pub convergence: ConvergenceConfig,

    /// Sample size estimation settings
    pub confidence: ConfidenceConfig,

    /// Degenerate graphs tolerated per trial before giving up
    pub max_retries: usize,

    /// Run trials on the rayon pool
    pub parallel: bool,
}

/// Iterative solver and cross-check settings
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// Stop when the largest per-round change is at most this
    pub threshold: f64,

    /// Iteration ceiling
    pub max_iterations: usize,

    /// Decimal places the two solvers must agree to
    pub decimal_places: u32,
}

/// Confidence interval settings for the sample size estimate
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Standard normal quantile (1.96 for 95%)
    pub z: f64,

    /// Desired half width as a percentage of the mean
    pub half_width_percent: f64,
}

// ============================================================================
// Default Implementations
// ============================================================================

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            num_peers: 100,
            topology: Topology::BarabasiAlbert { attachments: 5 },
            alpha: 0.3,
            anchor_a: AttachmentBudget::new(Strategy::Degree, 50),
            anchor_b: AttachmentBudget::new(Strategy::DegreeSquared, 50),
            neutral_range: 0.001,
            simulations: 50,
            seed: None,
            initial_opinions: InitialOpinions::default(),
            convergence: ConvergenceConfig::default(),
            confidence: ConfidenceConfig::default(),
            max_retries: 1000,
            parallel: true,
        }
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            z: DEFAULT_Z,
            half_width_percent: DEFAULT_HALF_WIDTH_PERCENT,
        }
    }
}

impl HarnessConfig {
    /// Reject settings no trial could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_peers == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        self.topology.validate(self.num_peers)?;
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if !(self.neutral_range >= 0.0) {
            return Err(ConfigError::InvalidNeutralRange(self.neutral_range));
        }
        if self.simulations == 0 {
            return Err(ConfigError::NoSimulations);
        }
        if !(self.convergence.threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.convergence.threshold));
        }
        if self.convergence.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        let residual = self.convergence.threshold * (1.0 - self.alpha) / self.alpha;
        if residual >= tolerance(self.convergence.decimal_places) {
            return Err(ConfigError::LooseThreshold {
                threshold: self.convergence.threshold,
                alpha: self.alpha,
                decimal_places: self.convergence.decimal_places,
            });
        }
        if !(self.confidence.z > 0.0 && self.confidence.half_width_percent > 0.0) {
            return Err(ConfigError::InvalidConfidence);
        }
        self.initial_opinions.validate()
    }

    /// Get or generate seed
    pub fn resolve_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| StdRng::from_entropy().next_u64())
    }

    /// One-line description for logs and result headers
    pub fn summary(&self) -> String {
        format!(
            "{} peers, {} topology, alpha {}, {} ({}) vs {} ({}), neutral range {}",
            self.num_peers,
            self.topology.tag(),
            self.alpha,
            self.anchor_a.strategy,
            self.anchor_a.budget,
            self.anchor_b.strategy,
            self.anchor_b.budget,
            self.neutral_range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let mut config = HarnessConfig {
            alpha: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidAlpha(1.0)));

        config.alpha = 0.3;
        config.neutral_range = -0.1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidNeutralRange(-0.1)));

        config.neutral_range = 0.0;
        config.num_peers = 5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTopology(_))));
    }

    #[test]
    fn test_small_alpha_needs_tighter_threshold() {
        let mut config = HarnessConfig {
            alpha: 0.05,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::LooseThreshold {
                threshold: DEFAULT_THRESHOLD,
                alpha: 0.05,
                decimal_places: DEFAULT_DECIMAL_PLACES,
            })
        );

        config.convergence.threshold = 1e-6;
        assert!(config.validate().is_ok());

        config.alpha = 0.1;
        config.convergence.threshold = DEFAULT_THRESHOLD;
        assert!(config.validate().is_ok());

        // more decimal places tighten the bound again
        config.convergence.decimal_places = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LooseThreshold { .. })
        ));
    }

    #[test]
    fn test_seed_resolution() {
        let config = HarnessConfig {
            seed: Some(1442232808),
            ..Default::default()
        };
        assert_eq!(config.resolve_seed(), 1442232808);
    }

    #[test]
    fn test_yaml_overrides_with_short_tags() {
        let yaml = r#"
num_peers: 30
alpha: 0.5
topology:
  kind: random
  edge_probability: 0.2
anchor_a:
  strategy: "1/D"
  budget: 10
anchor_b:
  strategy: D^2
  budget: 12
convergence:
  decimal_places: 5
"#;
        let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_peers, 30);
        assert_eq!(config.topology, Topology::ErdosRenyi { edge_probability: 0.2 });
        assert_eq!(config.anchor_a, AttachmentBudget::new(Strategy::InverseDegree, 10));
        assert_eq!(config.anchor_b.strategy, Strategy::DegreeSquared);
        assert_eq!(config.convergence.decimal_places, 5);
        assert_eq!(config.convergence.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.simulations, 50);
    }

    #[test]
    fn test_yaml_unknown_strategy_fails() {
        let yaml = "anchor_a:\n  strategy: closeness\n  budget: 3\n";
        assert!(serde_yaml::from_str::<HarnessConfig>(yaml).is_err());
    }
}
