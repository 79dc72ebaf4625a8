//! Strategy Sampler
//!
//! Turns an attachment [`Strategy`] into a discrete distribution over the
//! normal peers of a graph and draws neighbors from it with replacement.
//!
//! | strategy         | weight of peer `i`   |
//! |------------------|----------------------|
//! | `uniform`        | `1`                  |
//! | `degree`         | `deg(i)`             |
//! | `degree_squared` | `deg(i)^2`           |
//! | `inverse_degree` | `1 / deg(i)`         |
//!
//! Weights are normalized by their sum. Before anchors are attached the sum of
//! degrees is `2 * total_edge_weight`, so `degree` matches `deg(i) / 2W`.

use crate::fp_graph::WeightedMultigraph;
use crate::fp_interface::{PeerId, Strategy};
use rand::Rng;
use thiserror::Error;

/// Errors raised while building a distribution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    /// Graph has no normal peers to choose from
    #[error("no normal peers to sample from")]
    EmptyPopulation,

    /// `inverse_degree` is undefined for a peer without edges
    #[error("peer {0} has degree 0, inverse-degree weight undefined")]
    ZeroDegree(PeerId),

    /// Every weight is zero, e.g. `degree` on an edgeless graph
    #[error("{0} strategy has zero total weight on this graph")]
    ZeroTotalWeight(Strategy),
}

impl SamplerError {
    /// True for errors caused by an unlucky random topology
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            SamplerError::ZeroDegree(_) | SamplerError::ZeroTotalWeight(_)
        )
    }
}

/// Cumulative distribution over normal peer ids
#[derive(Debug, Clone)]
pub struct StrategySampler {
    strategy: Strategy,

    // upper boundary of each peer's bucket; last entry is exactly 1.0
    cumulative: Vec<f64>,
}

impl StrategySampler {
    /// Build the distribution of `strategy` over the current normal peers
    pub fn new(graph: &WeightedMultigraph, strategy: Strategy) -> Result<Self, SamplerError> {
        let n = graph.normal_count();
        if n == 0 {
            return Err(SamplerError::EmptyPopulation);
        }

        let degrees: Vec<f64> = graph
            .normal_peers()
            .map(|id| graph.degree(id).unwrap_or(0) as f64)
            .collect();

        let weights: Vec<f64> = match strategy {
            Strategy::Uniform => vec![1.0; n],
            Strategy::Degree => degrees,
            Strategy::DegreeSquared => degrees.iter().map(|d| d * d).collect(),
            Strategy::InverseDegree => {
                if let Some(isolated) = degrees.iter().position(|&d| d == 0.0) {
                    return Err(SamplerError::ZeroDegree(isolated));
                }
                degrees.iter().map(|d| 1.0 / d).collect()
            }
        };

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SamplerError::ZeroTotalWeight(strategy));
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / total
            })
            .collect();
        // guard against rounding leaving the last boundary just under 1.0
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self {
            strategy,
            cumulative,
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Probability of each normal peer
    pub fn probabilities(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.cumulative
            .iter()
            .map(|&c| {
                let p = c - previous;
                previous = c;
                p
            })
            .collect()
    }

    /// Upper bucket boundaries
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Peer whose half-open bucket `[lo, hi)` contains `u`
    ///
    /// A draw landing exactly on a boundary belongs to the bucket that boundary
    /// opens, so zero-probability peers are never selected.
    pub fn locate(&self, u: f64) -> PeerId {
        let idx = self.cumulative.partition_point(|&c| c <= u);
        idx.min(self.cumulative.len() - 1)
    }

    /// Draw one peer
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> PeerId {
        self.locate(rng.gen::<f64>())
    }

    /// Draw `budget` peers with replacement
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, budget: u32) -> Vec<PeerId> {
        (0..budget).map(|_| self.draw(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn path3() -> WeightedMultigraph {
        let mut graph = WeightedMultigraph::new(3);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(1, 2, 1).unwrap();
        graph
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_strategy_boundaries_on_path() {
        let graph = path3();

        let degree = StrategySampler::new(&graph, Strategy::Degree).unwrap();
        assert_close(degree.cumulative(), &[0.25, 0.75, 1.0]);

        let squared = StrategySampler::new(&graph, Strategy::DegreeSquared).unwrap();
        assert_close(squared.cumulative(), &[1.0 / 6.0, 5.0 / 6.0, 1.0]);

        let inverse = StrategySampler::new(&graph, Strategy::InverseDegree).unwrap();
        assert_close(inverse.cumulative(), &[0.4, 0.6, 1.0]);

        let uniform = StrategySampler::new(&graph, Strategy::Uniform).unwrap();
        assert_close(&uniform.probabilities(), &[1.0 / 3.0; 3]);
    }

    #[test]
    fn test_locate_half_open_buckets() {
        let sampler = StrategySampler::new(&path3(), Strategy::Degree).unwrap();
        assert_eq!(sampler.locate(0.0), 0);
        assert_eq!(sampler.locate(0.2499), 0);
        assert_eq!(sampler.locate(0.25), 1);
        assert_eq!(sampler.locate(0.75), 2);
        assert_eq!(sampler.locate(0.9999), 2);
    }

    #[test]
    fn test_zero_probability_peer_never_drawn() {
        let mut graph = WeightedMultigraph::new(3);
        graph.add_edge(1, 2, 1).unwrap();
        let sampler = StrategySampler::new(&graph, Strategy::Degree).unwrap();

        assert_eq!(sampler.locate(0.0), 1);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sampler.sample(&mut rng, 500).iter().all(|&p| p != 0));
    }

    #[test]
    fn test_sampling_matches_manual_draws() {
        let sampler = StrategySampler::new(&path3(), Strategy::InverseDegree).unwrap();

        let mut rng = StdRng::seed_from_u64(10);
        let expected: Vec<PeerId> = (0..3)
            .map(|_| {
                let u: f64 = rng.gen();
                if u < 0.4 {
                    0
                } else if u < 0.6 {
                    1
                } else {
                    2
                }
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(10);
        assert_eq!(sampler.sample(&mut rng, 3), expected);
    }

    #[test]
    fn test_inverse_degree_rejects_isolated_peer() {
        let mut graph = path3();
        let mut bigger = WeightedMultigraph::new(4);
        bigger.add_edge(0, 1, 1).unwrap();
        bigger.add_edge(1, 2, 1).unwrap();

        assert_eq!(
            StrategySampler::new(&bigger, Strategy::InverseDegree).unwrap_err(),
            SamplerError::ZeroDegree(3)
        );
        // other strategies tolerate it
        assert!(StrategySampler::new(&bigger, Strategy::Degree).is_ok());

        graph.add_edge(0, 2, 1).unwrap();
        assert!(StrategySampler::new(&graph, Strategy::InverseDegree).is_ok());
    }

    #[test]
    fn test_degenerate_graphs() {
        let edgeless = WeightedMultigraph::new(3);
        let err = StrategySampler::new(&edgeless, Strategy::DegreeSquared).unwrap_err();
        assert_eq!(err, SamplerError::ZeroTotalWeight(Strategy::DegreeSquared));
        assert!(err.is_degenerate());

        let empty = WeightedMultigraph::new(0);
        let err = StrategySampler::new(&empty, Strategy::Uniform).unwrap_err();
        assert_eq!(err, SamplerError::EmptyPopulation);
        assert!(!err.is_degenerate());
    }

    #[test]
    fn test_uniform_frequencies_chi_square() {
        let n = 10;
        let mut graph = WeightedMultigraph::new(n);
        for i in 0..n - 1 {
            graph.add_edge(i, i + 1, 1).unwrap();
        }
        let sampler = StrategySampler::new(&graph, Strategy::Uniform).unwrap();

        let draws = 100_000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = vec![0usize; n];
        for peer in sampler.sample(&mut rng, draws) {
            counts[peer] += 1;
        }

        let expected = draws as f64 / n as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        // 9 degrees of freedom, p = 0.001 critical value
        assert!(chi_square < 27.88, "chi-square {} too large", chi_square);
    }
}
