// Strategy Matrix - play every strategy pairing from one base scenario
//
// Usage:
//   cargo run --release --bin strategy_matrix
//   cargo run --release --bin strategy_matrix scenarios/degree_vs_degree_squared.yaml --seed 7
//
// Rows are anchor A's strategy, columns anchor B's; cells are A's win
// percentage with B's in parentheses. Budgets come from the base scenario.

mod scenario;

use fp_rust::{AttachmentBudget, HarnessConfig, MonteCarloHarness, Strategy};
use log::info;
use scenario::{parse_seed, ScenarioFile};
use simple_logger::SimpleLogger;
use std::env;
use std::path::Path;

fn main() {
    SimpleLogger::new().with_level(log::LevelFilter::Warn).init().unwrap();

    let args: Vec<String> = env::args().collect();
    let mut base = HarnessConfig::default();
    let mut seed = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--seed" {
            seed = iter.next().and_then(|s| parse_seed(s));
            if seed.is_none() {
                eprintln!("--seed needs a decimal or 0x-prefixed hex value");
                std::process::exit(1);
            }
        } else {
            base = ScenarioFile::load_or_exit(Path::new(arg)).config;
        }
    }

    // every pairing shares one seed so they face the same graphs
    let seed = seed.or(base.seed).unwrap_or_else(|| base.resolve_seed());
    base.seed = Some(seed);

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║        Strategy Matrix                                 ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Base: {}", base.summary());
    println!("Seed: {}, {} simulations per pairing\n", seed, base.simulations);

    let mut rows = Vec::new();
    for strategy_a in Strategy::ALL {
        let mut row = Vec::new();
        for strategy_b in Strategy::ALL {
            let config = HarnessConfig {
                anchor_a: AttachmentBudget::new(strategy_a, base.anchor_a.budget),
                anchor_b: AttachmentBudget::new(strategy_b, base.anchor_b.budget),
                ..base.clone()
            };

            let harness = MonteCarloHarness::new(config).unwrap_or_else(|e| {
                eprintln!("Invalid configuration: {}", e);
                std::process::exit(1);
            });
            let report = harness.run().unwrap_or_else(|e| {
                eprintln!("{} vs {} aborted: {}", strategy_a, strategy_b, e);
                std::process::exit(1);
            });

            info!(
                "{} vs {}: {:.1}% / {:.1}%",
                strategy_a, strategy_b, report.win_pct_a, report.win_pct_b
            );
            row.push((report.win_pct_a, report.win_pct_b));
        }
        rows.push(row);
    }

    print!("{:>16}", "A \\ B");
    for strategy_b in Strategy::ALL {
        print!(" {:>16}", strategy_b.tag());
    }
    println!();

    for (strategy_a, row) in Strategy::ALL.iter().zip(&rows) {
        print!("{:>16}", strategy_a.tag());
        for (win_a, win_b) in row {
            print!(" {:>16}", format!("{:.1} ({:.1})", win_a, win_b));
        }
        println!();
    }
    println!();
}
