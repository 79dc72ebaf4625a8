//! Opinion Solver
//!
//! Two independent ways to reach the steady-state opinions of the normal
//! peers:
//!
//! - **Closed form**: `R = (I - A)^-1 (h + AF * RF)` solved by LU
//!   factorization, where `A[i][j] = (1 - alpha) * w(i, j) / deg(i)` over
//!   normal neighbors, `AF` holds the same ratio for the two anchors,
//!   `h[i] = alpha * initial_opinion(i)` and `RF = [+1, -1]`.
//! - **Iteration**: synchronous local averaging
//!   `x'[i] = alpha * initial(i) + (1 - alpha) / deg(i) * sum_j w(i, j) * x[j]`
//!   until the largest change in a round drops to the threshold.
//!
//! Every row of `A` sums to `1 - alpha < 1`, so `I - A` is invertible and the
//! iteration is a contraction. Both results are compared by the oracle.

use crate::fp_graph::WeightedMultigraph;
use crate::fp_interface::{OpinionVector, PeerId};
use log::debug;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Default stop threshold on the largest per-round opinion change
pub const DEFAULT_THRESHOLD: f64 = 1e-5;

/// Default ceiling on iteration rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Alpha must lie strictly between 0 and 1
    #[error("alpha {0} outside (0, 1)")]
    InvalidAlpha(f64),

    /// Nothing to solve
    #[error("graph has no normal peers")]
    EmptyPopulation,

    /// Normal peer without incident edges, update undefined
    #[error("normal peer {0} has no incident edges")]
    IsolatedPeer(PeerId),

    /// Iteration ceiling reached before the threshold
    #[error("no convergence after {iterations} iterations (last change {max_delta})")]
    NonConvergence { iterations: usize, max_delta: f64 },

    /// LU factorization failed on `I - A`
    #[error("I - A is singular")]
    Singular,
}

/// The matrices of the closed-form system
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// `N x N`, normal-to-normal influence
    pub a: DMatrix<f64>,

    /// `N x 2`, normal-to-anchor influence
    pub af: DMatrix<f64>,

    /// Bias vector `alpha * initial_opinion`
    pub h: DVector<f64>,

    /// Anchor opinions `[A, B]`
    pub rf: DVector<f64>,
}

/// Result of the iterative solve
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub opinions: OpinionVector,
    pub iterations: usize,
    pub max_delta: f64,
}

/// Per-peer update coefficients, computed once per graph
struct Propagation {
    // (1 - alpha) / deg(i)
    scale: Vec<f64>,

    // weighted normal neighbors of each normal peer
    inner: Vec<Vec<(PeerId, f64)>>,

    // alpha * initial(i) + scale(i) * sum of weighted anchor opinions
    fixed: Vec<f64>,
}

impl Propagation {
    fn new(graph: &WeightedMultigraph, alpha: f64) -> Result<Self, SolverError> {
        let n = graph.normal_count();
        if n == 0 {
            return Err(SolverError::EmptyPopulation);
        }

        let peers = graph.peers();
        let mut scale = Vec::with_capacity(n);
        let mut inner = Vec::with_capacity(n);
        let mut fixed = Vec::with_capacity(n);

        for id in graph.normal_peers() {
            let degree = graph.degree(id).unwrap_or(0);
            if degree == 0 {
                return Err(SolverError::IsolatedPeer(id));
            }
            let s = (1.0 - alpha) / degree as f64;

            let mut neighbors = Vec::new();
            let mut anchored = 0.0;
            for (j, w) in graph.neighbors(id).into_iter().flatten() {
                if graph.is_anchor(j) {
                    anchored += w as f64 * peers[j].opinion;
                } else {
                    neighbors.push((j, w as f64));
                }
            }

            scale.push(s);
            inner.push(neighbors);
            fixed.push(alpha * peers[id].initial_opinion + s * anchored);
        }

        Ok(Self { scale, inner, fixed })
    }

    /// One synchronous round reading only `snapshot`; returns the largest change
    fn step(&self, snapshot: &[f64], next: &mut [f64]) -> f64 {
        let mut max_delta: f64 = 0.0;
        for (i, out) in next.iter_mut().enumerate() {
            let sum: f64 = self.inner[i].iter().map(|&(j, w)| w * snapshot[j]).sum();
            *out = self.fixed[i] + self.scale[i] * sum;
            max_delta = max_delta.max((*out - snapshot[i]).abs());
        }
        max_delta
    }
}

/// Steady-state solver for a graph with self-weight `alpha`
#[derive(Debug, Clone, Copy)]
pub struct OpinionSolver {
    alpha: f64,
    threshold: f64,
    max_iterations: usize,
}

impl OpinionSolver {
    pub fn new(alpha: f64) -> Result<Self, SolverError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(SolverError::InvalidAlpha(alpha));
        }
        Ok(Self {
            alpha,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Build `A`, `AF`, `h` and `RF` for `graph`
    pub fn linear_system(&self, graph: &WeightedMultigraph) -> Result<LinearSystem, SolverError> {
        let n = graph.normal_count();
        if n == 0 {
            return Err(SolverError::EmptyPopulation);
        }

        let peers = graph.peers();
        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut af = DMatrix::<f64>::zeros(n, 2);
        let mut h = DVector::<f64>::zeros(n);

        for i in graph.normal_peers() {
            let degree = graph.degree(i).unwrap_or(0);
            if degree == 0 {
                return Err(SolverError::IsolatedPeer(i));
            }
            let s = (1.0 - self.alpha) / degree as f64;

            for (j, w) in graph.neighbors(i).into_iter().flatten() {
                if graph.is_anchor(j) {
                    af[(i, j - n)] = s * w as f64;
                } else {
                    a[(i, j)] = s * w as f64;
                }
            }
            h[i] = self.alpha * peers[i].initial_opinion;
        }

        let rf = match graph.anchors() {
            Some((anchor_a, anchor_b)) => {
                DVector::from_vec(vec![peers[anchor_a].opinion, peers[anchor_b].opinion])
            }
            None => DVector::zeros(2),
        };

        Ok(LinearSystem { a, af, h, rf })
    }

    /// Closed-form steady state
    pub fn solve(&self, graph: &WeightedMultigraph) -> Result<OpinionVector, SolverError> {
        let system = self.linear_system(graph)?;
        let n = system.h.len();

        let lhs = DMatrix::<f64>::identity(n, n) - &system.a;
        let rhs = &system.h + &system.af * &system.rf;
        let solution = lhs.lu().solve(&rhs).ok_or(SolverError::Singular)?;

        Ok(solution.iter().copied().collect())
    }

    /// One synchronous update round from the graph's current opinions
    pub fn step(&self, graph: &WeightedMultigraph) -> Result<OpinionVector, SolverError> {
        let propagation = Propagation::new(graph, self.alpha)?;
        let snapshot = graph.opinions();
        let mut next = vec![0.0; snapshot.len()];
        propagation.step(&snapshot, &mut next);
        Ok(next)
    }

    /// Iterate synchronous rounds from the graph's current opinions to the fixed point
    pub fn iterate(&self, graph: &WeightedMultigraph) -> Result<IterationOutcome, SolverError> {
        let propagation = Propagation::new(graph, self.alpha)?;

        let mut current = graph.opinions();
        let mut next = vec![0.0; current.len()];
        let mut iterations = 0;

        loop {
            let max_delta = propagation.step(&current, &mut next);
            std::mem::swap(&mut current, &mut next);
            iterations += 1;

            if max_delta <= self.threshold {
                debug!("iteration converged after {} rounds", iterations);
                return Ok(IterationOutcome {
                    opinions: current,
                    iterations,
                    max_delta,
                });
            }
            if iterations >= self.max_iterations || !max_delta.is_finite() {
                return Err(SolverError::NonConvergence {
                    iterations,
                    max_delta,
                });
            }
        }
    }
}
