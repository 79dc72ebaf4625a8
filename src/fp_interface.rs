use crate::fp_config::ConfigError;
use std::fmt;
use std::str::FromStr;

// peers are dense indices: normal peers first, the two anchors last
pub type PeerId = usize;
pub type Weight = u32;

/// Opinion pinned by the first anchor
pub const ANCHOR_A_OPINION: f64 = 1.0;
/// Opinion pinned by the second anchor
pub const ANCHOR_B_OPINION: f64 = -1.0;

/// Steady-state (or iterated) opinions of the normal peers, indexed by peer id
pub type OpinionVector = Vec<f64>;

// ============================================================================
// Attachment Strategies
// ============================================================================

/// Probability-weighting rule an anchor uses to pick its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every normal peer equally likely
    #[serde(alias = "random")]
    Uniform,

    /// Proportional to degree
    #[serde(alias = "D")]
    Degree,

    /// Proportional to degree squared
    #[serde(alias = "D^2")]
    DegreeSquared,

    /// Proportional to 1/degree
    #[serde(alias = "1/D")]
    InverseDegree,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Uniform,
        Strategy::Degree,
        Strategy::DegreeSquared,
        Strategy::InverseDegree,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::Uniform => "uniform",
            Strategy::Degree => "degree",
            Strategy::DegreeSquared => "degree_squared",
            Strategy::InverseDegree => "inverse_degree",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" | "random" => Ok(Strategy::Uniform),
            "degree" | "D" => Ok(Strategy::Degree),
            "degree_squared" | "D^2" => Ok(Strategy::DegreeSquared),
            "inverse_degree" | "1/D" => Ok(Strategy::InverseDegree),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Strategy and total edge weight granted to one anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct AttachmentBudget {
    pub strategy: Strategy,

    /// Total edge weight the anchor spreads over the normal population
    pub budget: u32,
}

impl AttachmentBudget {
    pub fn new(strategy: Strategy, budget: u32) -> Self {
        Self { strategy, budget }
    }
}

// ============================================================================
// Peers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    Normal,
    Anchor { strategy: Strategy },
}

/// A single peer of the opinion network
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub id: PeerId,

    /// Current opinion
    pub opinion: f64,

    /// Bias term weighted by alpha in every update
    pub initial_opinion: f64,

    pub kind: PeerKind,
}

impl Peer {
    pub fn normal(id: PeerId) -> Self {
        Self {
            id,
            opinion: 0.0,
            initial_opinion: 0.0,
            kind: PeerKind::Normal,
        }
    }

    pub fn anchor(id: PeerId, opinion: f64, strategy: Strategy) -> Self {
        Self {
            id,
            opinion,
            initial_opinion: opinion,
            kind: PeerKind::Anchor { strategy },
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.kind, PeerKind::Anchor { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_tags_roundtrip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.tag().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_strategy_short_tags() {
        assert_eq!("random".parse::<Strategy>().unwrap(), Strategy::Uniform);
        assert_eq!("D".parse::<Strategy>().unwrap(), Strategy::Degree);
        assert_eq!("D^2".parse::<Strategy>().unwrap(), Strategy::DegreeSquared);
        assert_eq!("1/D".parse::<Strategy>().unwrap(), Strategy::InverseDegree);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = "closeness".parse::<Strategy>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("closeness".to_string()));
    }

    #[test]
    fn test_anchor_record() {
        let anchor = Peer::anchor(10, ANCHOR_B_OPINION, Strategy::Degree);
        assert!(anchor.is_anchor());
        assert_eq!(anchor.initial_opinion, -1.0);
        assert_eq!(anchor.kind, PeerKind::Anchor { strategy: Strategy::Degree });
        assert_eq!(Peer::normal(3).kind, PeerKind::Normal);
    }
}
