//! # fpRust - Forceful Peers Opinion Dynamics
//!
//! A Rust implementation of opinion propagation on a weighted peer network.
//! Normal peers repeatedly average their opinion with their neighbors, while
//! two forceful (anchor) peers hold fixed opinions of +1 and -1 and compete
//! for followers by choosing where to spend an edge budget.
//!
//! ## Core Components
//!
//! - **WeightedMultigraph**: peers and accumulated edge weights
//! - **StrategySampler**: uniform / degree / degree² / inverse-degree neighbor sampling
//! - **attach**: wires both anchors into a fresh graph
//! - **OpinionSolver**: closed-form steady state plus synchronous iteration
//! - **verify**: cross-checks the two solver results
//! - **classify**: counts followers of each anchor
//! - **MonteCarloHarness**: repeats the pipeline and aggregates a report
//!
//! ## Usage
//!
//! ```no_run
//! use fp_rust::{HarnessConfig, MonteCarloHarness};
//!
//! let config = HarnessConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let harness = MonteCarloHarness::new(config)?;
//! let report = harness.run()?;
//! report.print_summary();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Scenarios
//!
//! YAML scenarios are run by the `scenario_runner` binary in `simulator/`;
//! `strategy_matrix` plays every pair of strategies against each other.

// Model
pub mod fp_interface;
pub mod fp_graph;
pub mod fp_topology;

// Propagation engine
pub mod fp_strategy;
pub mod fp_attach;
pub mod fp_solver;
pub mod fp_oracle;
pub mod fp_classify;

// Monte-Carlo harness
pub mod fp_config;
pub mod fp_stats;
pub mod fp_harness;

// Re-export commonly used types
pub use fp_attach::{attach, AttachError, Attachment};
pub use fp_classify::{classify, ClassifyError, Outcome};
pub use fp_config::{ConfidenceConfig, ConfigError, ConvergenceConfig, HarnessConfig};
pub use fp_graph::{GraphError, WeightedMultigraph};
pub use fp_harness::{HarnessError, MonteCarloHarness, TrialError};
pub use fp_interface::{AttachmentBudget, OpinionVector, Peer, PeerId, PeerKind, Strategy, Weight};
pub use fp_oracle::{verify, ConvergenceMismatch};
pub use fp_solver::{OpinionSolver, SolverError};
pub use fp_stats::{SimulationReport, TrialRecord, Winner};
pub use fp_strategy::{SamplerError, StrategySampler};
pub use fp_topology::{InitialOpinions, Topology};
