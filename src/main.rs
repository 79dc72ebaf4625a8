use fp_rust::{AttachmentBudget, HarnessConfig, MonteCarloHarness, Strategy, Topology};
use log::info;
use simple_logger::SimpleLogger;
use std::time::Instant;

fn main() {
    SimpleLogger::new().init().unwrap();

    info!("starting");
    let start = Instant::now();

    let config = HarnessConfig {
        num_peers: 100,
        topology: Topology::BarabasiAlbert { attachments: 5 },
        alpha: 0.3,
        anchor_a: AttachmentBudget::new(Strategy::Degree, 50),
        anchor_b: AttachmentBudget::new(Strategy::DegreeSquared, 50),
        neutral_range: 0.001,
        simulations: 50,
        seed: None,
        ..Default::default()
    };

    let harness = MonteCarloHarness::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let report = harness.run().unwrap_or_else(|e| {
        eprintln!("Simulation aborted: {}", e);
        std::process::exit(1);
    });

    report.print_summary();

    info!("let seed = {};", report.seed_used);
    info!("time elapsed {:?}", start.elapsed());
}
