//! Weighted Multigraph
//!
//! Holds the peers of one trial and the weighted edges between them. Repeated
//! logical edges between the same pair collapse into a single edge whose
//! weight counts the repetitions.
//!
//! Normal peers occupy ids `0..N`. Anchors are appended as a pair at `N` and
//! `N + 1` and are the only peers whose opinion never changes.

use crate::fp_interface::{
    OpinionVector, Peer, PeerId, Strategy, Weight, ANCHOR_A_OPINION, ANCHOR_B_OPINION,
};
use indexmap::IndexMap;
use std::ops::Range;
use thiserror::Error;

/// Structural errors; these are programming errors, never retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Edge endpoints are the same peer
    #[error("self-loop on peer {0} is not modeled")]
    SelfLoop(PeerId),

    /// Peer id outside the graph
    #[error("peer {peer} out of range (graph has {peer_count} peers)")]
    PeerOutOfRange { peer: PeerId, peer_count: usize },

    /// Edges carry a weight of at least one
    #[error("edge ({0}, {1}) added with zero weight")]
    ZeroWeight(PeerId, PeerId),

    /// Accumulated weight would not fit in a `Weight`
    #[error("weight of edge ({0}, {1}) overflows")]
    WeightOverflow(PeerId, PeerId),

    /// A graph carries at most one anchor pair
    #[error("anchors already attached")]
    AnchorsAlreadyAttached,

    /// Opinion vector does not cover the normal population
    #[error("opinion vector has {actual} entries, expected {expected}")]
    OpinionLength { expected: usize, actual: usize },
}

/// Peers plus weighted undirected edges
#[derive(Debug, Clone)]
pub struct WeightedMultigraph {
    peers: Vec<Peer>,

    // per-peer neighbor -> weight, insertion ordered so iteration is reproducible
    adjacency: Vec<IndexMap<PeerId, Weight>>,

    normal_count: usize,
    total_weight: u64,
}

impl WeightedMultigraph {
    /// Create a graph of `normal_count` normal peers with no edges
    pub fn new(normal_count: usize) -> Self {
        Self {
            peers: (0..normal_count).map(Peer::normal).collect(),
            adjacency: vec![IndexMap::new(); normal_count],
            normal_count,
            total_weight: 0,
        }
    }

    pub fn normal_count(&self) -> usize {
        self.normal_count
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn normal_peers(&self) -> Range<PeerId> {
        0..self.normal_count
    }

    pub fn peer(&self, id: PeerId) -> Result<&Peer, GraphError> {
        self.check(id)?;
        Ok(&self.peers[id])
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Anchor ids `(A, B)` once attached
    pub fn anchors(&self) -> Option<(PeerId, PeerId)> {
        if self.peers.len() == self.normal_count + 2 {
            Some((self.normal_count, self.normal_count + 1))
        } else {
            None
        }
    }

    pub fn is_anchor(&self, id: PeerId) -> bool {
        id >= self.normal_count && id < self.peers.len()
    }

    fn check(&self, id: PeerId) -> Result<(), GraphError> {
        if id < self.peers.len() {
            Ok(())
        } else {
            Err(GraphError::PeerOutOfRange {
                peer: id,
                peer_count: self.peers.len(),
            })
        }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Add `weight` to edge `(u, v)`, creating it if absent
    pub fn add_edge(&mut self, u: PeerId, v: PeerId, weight: Weight) -> Result<(), GraphError> {
        self.check(u)?;
        self.check(v)?;
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        if weight == 0 {
            return Err(GraphError::ZeroWeight(u, v));
        }

        let current = self.adjacency[u].get(&v).copied().unwrap_or(0);
        let updated = current
            .checked_add(weight)
            .ok_or(GraphError::WeightOverflow(u, v))?;
        self.adjacency[u].insert(v, updated);
        self.adjacency[v].insert(u, updated);
        self.total_weight += weight as u64;
        Ok(())
    }

    /// Append the anchor pair at ids `N` (+1) and `N + 1` (-1)
    pub fn add_anchors(
        &mut self,
        strategy_a: Strategy,
        strategy_b: Strategy,
    ) -> Result<(PeerId, PeerId), GraphError> {
        if self.peers.len() != self.normal_count {
            return Err(GraphError::AnchorsAlreadyAttached);
        }

        let a = self.normal_count;
        let b = a + 1;
        self.peers.push(Peer::anchor(a, ANCHOR_A_OPINION, strategy_a));
        self.peers.push(Peer::anchor(b, ANCHOR_B_OPINION, strategy_b));
        self.adjacency.push(IndexMap::new());
        self.adjacency.push(IndexMap::new());
        Ok((a, b))
    }

    /// Overwrite opinions of the normal peers; anchors are untouched
    pub fn set_opinions(&mut self, opinions: &[f64]) -> Result<(), GraphError> {
        self.check_len(opinions.len())?;
        for (peer, &opinion) in self.peers.iter_mut().zip(opinions) {
            peer.opinion = opinion;
        }
        Ok(())
    }

    /// Overwrite the bias term of the normal peers
    pub fn set_initial_opinions(&mut self, opinions: &[f64]) -> Result<(), GraphError> {
        self.check_len(opinions.len())?;
        for (peer, &opinion) in self.peers.iter_mut().zip(opinions) {
            peer.initial_opinion = opinion;
        }
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), GraphError> {
        if actual == self.normal_count {
            Ok(())
        } else {
            Err(GraphError::OpinionLength {
                expected: self.normal_count,
                actual,
            })
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Sum of incident edge weights
    pub fn degree(&self, id: PeerId) -> Result<u64, GraphError> {
        self.check(id)?;
        Ok(self.adjacency[id].values().map(|&w| w as u64).sum())
    }

    /// Neighbors of `id` with the accumulated edge weight
    pub fn neighbors(
        &self,
        id: PeerId,
    ) -> Result<impl Iterator<Item = (PeerId, Weight)> + '_, GraphError> {
        self.check(id)?;
        Ok(self.adjacency[id].iter().map(|(&n, &w)| (n, w)))
    }

    pub fn edge_weight(&self, u: PeerId, v: PeerId) -> Option<Weight> {
        self.adjacency.get(u)?.get(&v).copied()
    }

    /// Sum of all edge weights (each undirected edge counted once)
    pub fn total_edge_weight(&self) -> u64 {
        self.total_weight
    }

    /// Number of distinct weighted edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Current opinions of the normal peers
    pub fn opinions(&self) -> OpinionVector {
        self.peers[..self.normal_count]
            .iter()
            .map(|p| p.opinion)
            .collect()
    }

    /// Normal peers with no incident edges
    pub fn isolated_peers(&self) -> Vec<PeerId> {
        self.normal_peers()
            .filter(|&id| self.adjacency[id].is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp_interface::PeerKind;

    fn path3() -> WeightedMultigraph {
        let mut graph = WeightedMultigraph::new(3);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(1, 2, 1).unwrap();
        graph
    }

    #[test]
    fn test_degree_and_neighbors() {
        let graph = path3();
        assert_eq!(graph.degree(0).unwrap(), 1);
        assert_eq!(graph.degree(1).unwrap(), 2);
        let neighbors: Vec<_> = graph.neighbors(1).unwrap().collect();
        assert_eq!(neighbors, vec![(0, 1), (2, 1)]);
        assert_eq!(graph.total_edge_weight(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_repeated_edges_accumulate() {
        let mut graph = path3();
        graph.add_edge(1, 0, 1).unwrap();
        graph.add_edge(0, 1, 2).unwrap();
        assert_eq!(graph.edge_weight(0, 1), Some(4));
        assert_eq!(graph.edge_weight(1, 0), Some(4));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(1).unwrap(), 5);
        assert_eq!(graph.total_edge_weight(), 5);
    }

    #[test]
    fn test_invalid_edges() {
        let mut graph = path3();
        assert_eq!(graph.add_edge(2, 2, 1), Err(GraphError::SelfLoop(2)));
        assert_eq!(
            graph.add_edge(0, 7, 1),
            Err(GraphError::PeerOutOfRange { peer: 7, peer_count: 3 })
        );
        assert_eq!(graph.add_edge(0, 2, 0), Err(GraphError::ZeroWeight(0, 2)));
        assert!(graph.degree(3).is_err());
    }

    #[test]
    fn test_anchor_pair() {
        let mut graph = path3();
        assert_eq!(graph.anchors(), None);

        let (a, b) = graph
            .add_anchors(Strategy::Degree, Strategy::InverseDegree)
            .unwrap();
        assert_eq!((a, b), (3, 4));
        assert_eq!(graph.peer(a).unwrap().opinion, 1.0);
        assert_eq!(graph.peer(b).unwrap().opinion, -1.0);
        assert!(graph.is_anchor(4));
        assert!(!graph.is_anchor(2));
        assert_eq!(
            graph.peer(b).unwrap().kind,
            PeerKind::Anchor {
                strategy: Strategy::InverseDegree
            }
        );
        assert_eq!(
            graph.add_anchors(Strategy::Uniform, Strategy::Uniform),
            Err(GraphError::AnchorsAlreadyAttached)
        );
    }

    #[test]
    fn test_set_opinions_leaves_anchors_alone() {
        let mut graph = path3();
        graph.add_anchors(Strategy::Uniform, Strategy::Uniform).unwrap();
        graph.set_opinions(&[0.5, -0.5, 0.25]).unwrap();

        assert_eq!(graph.opinions(), vec![0.5, -0.5, 0.25]);
        assert_eq!(graph.peer(3).unwrap().opinion, 1.0);
        assert_eq!(graph.peer(4).unwrap().opinion, -1.0);
        assert_eq!(
            graph.set_opinions(&[0.0; 5]),
            Err(GraphError::OpinionLength { expected: 3, actual: 5 })
        );
    }

    #[test]
    fn test_weight_overflow_leaves_edge_unchanged() {
        let mut graph = WeightedMultigraph::new(2);
        graph.add_edge(0, 1, Weight::MAX).unwrap();

        assert_eq!(graph.add_edge(0, 1, 1), Err(GraphError::WeightOverflow(0, 1)));
        assert_eq!(graph.edge_weight(0, 1), Some(Weight::MAX));
        assert_eq!(graph.edge_weight(1, 0), Some(Weight::MAX));
        assert_eq!(graph.total_edge_weight(), Weight::MAX as u64);
    }

    #[test]
    fn test_isolated_peers() {
        let mut graph = WeightedMultigraph::new(4);
        graph.add_edge(0, 1, 1).unwrap();
        assert_eq!(graph.isolated_peers(), vec![2, 3]);
    }
}
