//! Random Topology Generation
//!
//! Builds the normal population of a trial. All generated edges have weight 1;
//! anchors are attached afterwards by the attacher.

use crate::fp_config::ConfigError;
use crate::fp_graph::{GraphError, WeightedMultigraph};
use crate::fp_interface::PeerId;
use hashbrown::HashSet;
use rand::Rng;

/// Random graph model for the normal peers
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// G(n, p): every pair linked independently with `edge_probability`
    #[serde(alias = "random")]
    ErdosRenyi { edge_probability: f64 },

    /// Peers in the unit square, linked when within `radius`
    Geometric { radius: f64 },

    /// Preferential attachment, `attachments` edges per arriving peer
    #[serde(alias = "scale_free")]
    BarabasiAlbert { attachments: usize },
}

impl Topology {
    /// Build from a graph-type tag and its characteristic parameter
    pub fn from_tag(tag: &str, parameter: f64) -> Result<Self, ConfigError> {
        match tag {
            "erdos_renyi" | "random" => Ok(Topology::ErdosRenyi {
                edge_probability: parameter,
            }),
            "geometric" => Ok(Topology::Geometric { radius: parameter }),
            "barabasi_albert" | "scale_free" => {
                if parameter.fract() != 0.0 || parameter < 0.0 {
                    return Err(ConfigError::InvalidTopology(format!(
                        "attachment count must be a whole number, got {}",
                        parameter
                    )));
                }
                Ok(Topology::BarabasiAlbert {
                    attachments: parameter as usize,
                })
            }
            other => Err(ConfigError::UnknownGraphType(other.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Topology::ErdosRenyi { .. } => "erdos_renyi",
            Topology::Geometric { .. } => "geometric",
            Topology::BarabasiAlbert { .. } => "barabasi_albert",
        }
    }

    /// Check the parameter against a population of `num_peers`
    pub fn validate(&self, num_peers: usize) -> Result<(), ConfigError> {
        match *self {
            Topology::ErdosRenyi { edge_probability } => {
                if !(0.0..=1.0).contains(&edge_probability) {
                    return Err(ConfigError::InvalidTopology(format!(
                        "edge probability {} outside [0, 1]",
                        edge_probability
                    )));
                }
            }
            Topology::Geometric { radius } => {
                if !(radius > 0.0 && radius.is_finite()) {
                    return Err(ConfigError::InvalidTopology(format!(
                        "radius {} must be positive",
                        radius
                    )));
                }
            }
            Topology::BarabasiAlbert { attachments } => {
                if attachments < 1 || attachments >= num_peers {
                    return Err(ConfigError::InvalidTopology(format!(
                        "barabasi_albert needs 1 <= attachments < {}, got {}",
                        num_peers, attachments
                    )));
                }
            }
        }
        Ok(())
    }

    /// Generate a graph of `num_peers` normal peers
    pub fn generate<R: Rng + ?Sized>(
        &self,
        num_peers: usize,
        rng: &mut R,
    ) -> Result<WeightedMultigraph, GraphError> {
        match *self {
            Topology::ErdosRenyi { edge_probability } => {
                erdos_renyi(num_peers, edge_probability, rng)
            }
            Topology::Geometric { radius } => geometric(num_peers, radius, rng),
            Topology::BarabasiAlbert { attachments } => {
                barabasi_albert(num_peers, attachments, rng)
            }
        }
    }
}

fn erdos_renyi<R: Rng + ?Sized>(
    n: usize,
    p: f64,
    rng: &mut R,
) -> Result<WeightedMultigraph, GraphError> {
    let mut graph = WeightedMultigraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen::<f64>() < p {
                graph.add_edge(u, v, 1)?;
            }
        }
    }
    Ok(graph)
}

fn geometric<R: Rng + ?Sized>(
    n: usize,
    radius: f64,
    rng: &mut R,
) -> Result<WeightedMultigraph, GraphError> {
    let positions: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();
    let r2 = radius * radius;

    let mut graph = WeightedMultigraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            let dx = positions[u].0 - positions[v].0;
            let dy = positions[u].1 - positions[v].1;
            if dx * dx + dy * dy <= r2 {
                graph.add_edge(u, v, 1)?;
            }
        }
    }
    Ok(graph)
}

/// Start from `m` unlinked peers; each new peer links to `m` distinct targets
/// chosen from a list where every peer appears once per incident edge.
fn barabasi_albert<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    rng: &mut R,
) -> Result<WeightedMultigraph, GraphError> {
    let mut graph = WeightedMultigraph::new(n);
    let mut targets: Vec<PeerId> = (0..m).collect();
    let mut repeated: Vec<PeerId> = Vec::with_capacity(2 * n * m);

    for source in m..n {
        for &target in &targets {
            graph.add_edge(source, target, 1)?;
        }
        repeated.extend(targets.iter().copied());
        repeated.extend(std::iter::repeat(source).take(m));

        // distinct picks, kept in draw order for reproducible adjacency order
        let mut chosen = HashSet::with_capacity(m);
        targets.clear();
        while targets.len() < m {
            let pick = repeated[rng.gen_range(0..repeated.len())];
            if chosen.insert(pick) {
                targets.push(pick);
            }
        }
    }
    Ok(graph)
}

// ============================================================================
// Initial Opinions
// ============================================================================

/// How normal peers are seeded before propagation
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialOpinions {
    /// Opinion and bias both 0
    #[default]
    Neutral,

    /// Opinion and bias drawn uniformly from `[low, high)`
    Uniform { low: f64, high: f64 },
}

impl InitialOpinions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            InitialOpinions::Neutral => Ok(()),
            InitialOpinions::Uniform { low, high } => {
                if low < high && low >= -1.0 && high <= 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidInitialOpinions { low, high })
                }
            }
        }
    }

    /// Seed opinion and bias of every normal peer
    pub fn apply<R: Rng + ?Sized>(
        &self,
        graph: &mut WeightedMultigraph,
        rng: &mut R,
    ) -> Result<(), GraphError> {
        let opinions: Vec<f64> = match *self {
            InitialOpinions::Neutral => vec![0.0; graph.normal_count()],
            InitialOpinions::Uniform { low, high } => (0..graph.normal_count())
                .map(|_| rng.gen_range(low..high))
                .collect(),
        };
        graph.set_opinions(&opinions)?;
        graph.set_initial_opinions(&opinions)
    }
}
