//! Peer Attacher
//!
//! Wires the two anchors into a freshly generated graph. Both neighbor
//! multisets are sampled from the pre-anchor graph, so anchor B never sees
//! the degree bump caused by anchor A.

use crate::fp_graph::{GraphError, WeightedMultigraph};
use crate::fp_interface::{AttachmentBudget, PeerId};
use crate::fp_strategy::{SamplerError, StrategySampler};
use log::debug;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl AttachError {
    pub fn is_degenerate(&self) -> bool {
        match self {
            AttachError::Sampler(e) => e.is_degenerate(),
            AttachError::Graph(_) => false,
        }
    }
}

/// Ids assigned to the anchors and the distinct neighbors each one picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub anchor_a: PeerId,
    pub anchor_b: PeerId,
    pub distinct_a: usize,
    pub distinct_b: usize,
}

/// Attach anchor A (+1) and anchor B (-1) to `graph`
pub fn attach<R: Rng + ?Sized>(
    graph: &mut WeightedMultigraph,
    rng: &mut R,
    a: AttachmentBudget,
    b: AttachmentBudget,
) -> Result<Attachment, AttachError> {
    let neighbors_a = StrategySampler::new(graph, a.strategy)?.sample(rng, a.budget);
    let neighbors_b = StrategySampler::new(graph, b.strategy)?.sample(rng, b.budget);

    let (anchor_a, anchor_b) = graph.add_anchors(a.strategy, b.strategy)?;
    for &peer in &neighbors_a {
        graph.add_edge(anchor_a, peer, 1)?;
    }
    for &peer in &neighbors_b {
        graph.add_edge(anchor_b, peer, 1)?;
    }

    let attachment = Attachment {
        anchor_a,
        anchor_b,
        distinct_a: graph.neighbors(anchor_a)?.count(),
        distinct_b: graph.neighbors(anchor_b)?.count(),
    };
    debug!(
        "attached {} (budget {}, {} peers) and {} (budget {}, {} peers)",
        a.strategy, a.budget, attachment.distinct_a, b.strategy, b.budget, attachment.distinct_b
    );
    Ok(attachment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp_interface::Strategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ring(n: usize) -> WeightedMultigraph {
        let mut graph = WeightedMultigraph::new(n);
        for i in 0..n {
            graph.add_edge(i, (i + 1) % n, 1).unwrap();
        }
        graph
    }

    #[test]
    fn test_budget_is_total_edge_weight() {
        let mut graph = ring(5);
        let mut rng = StdRng::seed_from_u64(3);

        let attachment = attach(
            &mut graph,
            &mut rng,
            AttachmentBudget::new(Strategy::Uniform, 40),
            AttachmentBudget::new(Strategy::Degree, 17),
        )
        .unwrap();

        assert_eq!((attachment.anchor_a, attachment.anchor_b), (5, 6));
        assert_eq!(graph.degree(5).unwrap(), 40);
        assert_eq!(graph.degree(6).unwrap(), 17);
        // 40 draws over 5 peers must repeat
        assert!(attachment.distinct_a <= 5);
        assert_eq!(graph.total_edge_weight(), 5 + 40 + 17);
    }

    #[test]
    fn test_anchors_are_not_neighbors_of_each_other() {
        let mut graph = ring(4);
        let mut rng = StdRng::seed_from_u64(11);
        attach(
            &mut graph,
            &mut rng,
            AttachmentBudget::new(Strategy::DegreeSquared, 10),
            AttachmentBudget::new(Strategy::InverseDegree, 10),
        )
        .unwrap();

        assert_eq!(graph.edge_weight(4, 5), None);
        assert!(graph.neighbors(4).unwrap().all(|(p, _)| p < 4));
        assert!(graph.neighbors(5).unwrap().all(|(p, _)| p < 4));
        assert_eq!(graph.peer(4).unwrap().opinion, 1.0);
        assert_eq!(graph.peer(5).unwrap().opinion, -1.0);
    }

    #[test]
    fn test_zero_degree_propagates_and_leaves_graph_untouched() {
        let mut graph = WeightedMultigraph::new(3);
        graph.add_edge(0, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let err = attach(
            &mut graph,
            &mut rng,
            AttachmentBudget::new(Strategy::Uniform, 5),
            AttachmentBudget::new(Strategy::InverseDegree, 5),
        )
        .unwrap_err();

        assert_eq!(err, AttachError::Sampler(SamplerError::ZeroDegree(2)));
        assert!(err.is_degenerate());
        assert_eq!(graph.anchors(), None);
    }

    #[test]
    fn test_zero_budget_attaches_without_edges() {
        let mut graph = ring(3);
        let mut rng = StdRng::seed_from_u64(5);
        let attachment = attach(
            &mut graph,
            &mut rng,
            AttachmentBudget::new(Strategy::Uniform, 0),
            AttachmentBudget::new(Strategy::Uniform, 2),
        )
        .unwrap();
        assert_eq!(attachment.distinct_a, 0);
        assert_eq!(graph.degree(3).unwrap(), 0);
    }
}
