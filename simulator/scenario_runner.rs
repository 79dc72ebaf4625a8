// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/degree_vs_degree_squared.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/sparse_random.yaml --seed 1442232808
//   cargo run --bin scenario_runner scenarios/ --verbose | --quiet
//   cargo run --bin scenario_runner scenarios/ --topology random:0.1  (graph tag:parameter)

mod scenario;

use fp_rust::{MonteCarloHarness, Topology};
use log::LevelFilter;
use scenario::{parse_seed, parse_topology, scenario_files, ScenarioFile};
use simple_logger::SimpleLogger;
use std::env;
use std::path::Path;

struct Options {
    seed: Option<u64>,
    topology: Option<Topology>,
    level: LevelFilter,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <scenario.yaml | directory/> [--seed SEED] [--topology TAG:PARAM] [--verbose | --quiet]",
            args[0]
        );
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/degree_vs_degree_squared.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/sparse_random.yaml --seed 0x55f3a1c8", args[0]);
        std::process::exit(1);
    }

    let options = parse_options(&args[2..]);
    SimpleLogger::new().with_level(options.level).init().unwrap();

    let path = Path::new(&args[1]);
    if path.is_file() {
        run_scenario_file(path, &options);
    } else if path.is_dir() {
        run_scenario_directory(path, &options);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        seed: None,
        topology: None,
        level: LevelFilter::Info,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().and_then(|s| parse_seed(s));
                if value.is_none() {
                    eprintln!("--seed needs a decimal or 0x-prefixed hex value");
                    std::process::exit(1);
                }
                options.seed = value;
            }
            "--topology" => {
                let value = iter.next().map(|s| parse_topology(s));
                match value {
                    Some(Ok(topology)) => options.topology = Some(topology),
                    Some(Err(e)) => {
                        eprintln!("--topology: {}", e);
                        std::process::exit(1);
                    }
                    None => {
                        eprintln!("--topology needs TAG:PARAM, e.g. scale_free:5");
                        std::process::exit(1);
                    }
                }
            }
            "--verbose" => options.level = LevelFilter::Debug,
            "--quiet" => options.level = LevelFilter::Warn,
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
    }
    options
}

fn run_scenario_directory(dir: &Path, options: &Options) {
    let scenarios = scenario_files(dir);

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                 ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, options);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, options: &Options) {
    println!("Loading scenario from: {}", path.display());

    let scenario = ScenarioFile::load_or_exit(path);

    // Print scenario header
    let title = scenario.title(path);
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  {}{}", title, " ".repeat(54_usize.saturating_sub(title.len())));
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = scenario.config;
    if options.seed.is_some() {
        config.seed = options.seed;
    }
    if let Some(topology) = options.topology {
        config.topology = topology;
    }

    println!("Configuration:");
    println!("  Peers: {}", config.num_peers);
    println!("  Topology: {:?}", config.topology);
    println!("  Alpha: {}", config.alpha);
    println!(
        "  Anchor A: {} (budget {})",
        config.anchor_a.strategy, config.anchor_a.budget
    );
    println!(
        "  Anchor B: {} (budget {})",
        config.anchor_b.strategy, config.anchor_b.budget
    );
    println!("  Simulations: {}", config.simulations);
    println!("\nStarting simulation...\n");

    let harness = MonteCarloHarness::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid scenario {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let report = harness.run().unwrap_or_else(|e| {
        eprintln!("Simulation aborted: {}", e);
        std::process::exit(1);
    });

    report.print_summary();

    println!("\n✓ Scenario complete!\n");
}
