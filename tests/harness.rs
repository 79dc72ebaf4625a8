//! End-to-end runs of the Monte-Carlo harness

use fp_rust::{
    AttachmentBudget, ConfigError, HarnessConfig, HarnessError, InitialOpinions,
    MonteCarloHarness, Strategy, Topology,
};

fn config(seed: u64) -> HarnessConfig {
    HarnessConfig {
        num_peers: 40,
        topology: Topology::BarabasiAlbert { attachments: 3 },
        anchor_a: AttachmentBudget::new(Strategy::Degree, 20),
        anchor_b: AttachmentBudget::new(Strategy::DegreeSquared, 20),
        simulations: 12,
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_same_seed_same_report() {
    let first = MonteCarloHarness::new(config(1442232808)).unwrap().run().unwrap();
    let second = MonteCarloHarness::new(config(1442232808)).unwrap().run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let parallel = MonteCarloHarness::new(config(77)).unwrap().run().unwrap();
    let sequential = MonteCarloHarness::new(HarnessConfig {
        parallel: false,
        ..config(77)
    })
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(parallel, sequential);
}

#[test]
fn test_report_invariants() {
    let report = MonteCarloHarness::new(config(5)).unwrap().run().unwrap();

    assert_eq!(report.simulations, 12);
    assert_eq!(report.seed_used, 5);
    assert!((report.win_pct_a + report.win_pct_b + report.tie_pct - 100.0).abs() < 1e-9);
    assert!((report.mean_pos + report.mean_neg + report.mean_neutral - 1.0).abs() < 1e-9);
    for trial in &report.trials {
        assert_eq!(trial.outcome.total(), 40);
        assert!(trial.iterations > 0);
    }
}

#[test]
fn test_sparse_graph_retries_until_complete() {
    // with p = 0.1 most 20-peer graphs have an isolated peer
    let config = HarnessConfig {
        num_peers: 20,
        topology: Topology::ErdosRenyi { edge_probability: 0.1 },
        anchor_a: AttachmentBudget::new(Strategy::InverseDegree, 10),
        anchor_b: AttachmentBudget::new(Strategy::Uniform, 10),
        simulations: 10,
        seed: Some(2024),
        ..Default::default()
    };
    let report = MonteCarloHarness::new(config).unwrap().run().unwrap();

    assert_eq!(report.simulations, 10);
    assert!(report.total_retries > 0);
    assert_eq!(
        report.total_retries,
        report.trials.iter().map(|t| t.retries).sum::<usize>()
    );
}

#[test]
fn test_uniform_initial_opinions_run() {
    let config = HarnessConfig {
        topology: Topology::Geometric { radius: 0.5 },
        initial_opinions: InitialOpinions::Uniform { low: -0.5, high: 0.5 },
        max_retries: 10_000,
        ..config(11)
    };
    let report = MonteCarloHarness::new(config).unwrap().run().unwrap();
    assert_eq!(report.trials.len(), 12);
}

#[test]
fn test_small_alpha_runs_or_is_rejected_up_front() {
    let small_budgets = |alpha: f64| HarnessConfig {
        num_peers: 100,
        topology: Topology::BarabasiAlbert { attachments: 5 },
        alpha,
        anchor_a: AttachmentBudget::new(Strategy::Degree, 5),
        anchor_b: AttachmentBudget::new(Strategy::DegreeSquared, 5),
        simulations: 5,
        seed: Some(1),
        parallel: false,
        ..Default::default()
    };

    let report = MonteCarloHarness::new(small_budgets(0.1)).unwrap().run().unwrap();
    assert_eq!(report.simulations, 5);

    for alpha in [0.05, 0.02, 0.01] {
        assert!(matches!(
            MonteCarloHarness::new(small_budgets(alpha)),
            Err(ConfigError::LooseThreshold { .. })
        ));
    }

    // a tighter threshold makes the same alpha usable
    let mut config = small_budgets(0.05);
    config.convergence.threshold = 1e-6;
    let report = MonteCarloHarness::new(config).unwrap().run().unwrap();
    assert_eq!(report.simulations, 5);
}

#[test]
fn test_empty_graph_exhausts_retries() {
    let config = HarnessConfig {
        num_peers: 8,
        topology: Topology::ErdosRenyi { edge_probability: 0.0 },
        anchor_a: AttachmentBudget::new(Strategy::InverseDegree, 4),
        max_retries: 3,
        ..config(1)
    };
    let err = MonteCarloHarness::new(config).unwrap().run().unwrap_err();

    assert!(matches!(err, HarnessError::RetriesExhausted { attempts: 4, .. }));
    assert!(!err.is_convergence_mismatch());
}

#[test]
fn test_scenario_yaml_drives_harness() {
    let yaml = r#"
num_peers: 25
topology:
  kind: scale_free
  attachments: 2
anchor_a:
  strategy: D
  budget: 10
anchor_b:
  strategy: random
  budget: 10
simulations: 4
seed: 99
parallel: false
"#;
    let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
    let report = MonteCarloHarness::new(config).unwrap().run().unwrap();

    assert_eq!(report.simulations, 4);
    assert_eq!(report.anchor_b.strategy, Strategy::Uniform);
}
