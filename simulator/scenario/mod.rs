// Scenario files - YAML wrapper around HarnessConfig

use fp_rust::{ConfigError, HarnessConfig, Topology};
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    pub meta: ScenarioMeta,

    /// Harness configuration (missing keys take defaults)
    #[serde(default)]
    pub config: HarnessConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

impl ScenarioFile {
    /// Read and parse a scenario, exiting with a message on failure
    pub fn load_or_exit(path: &Path) -> Self {
        let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        });

        serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
            eprintln!("Failed to parse {}: {}", path.display(), e);
            std::process::exit(1);
        })
    }

    pub fn title(&self, path: &Path) -> String {
        self.meta.name.clone().unwrap_or_else(|| {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unnamed");
            format!("Scenario: {}", stem)
        })
    }
}

/// All .yaml/.yml files in `dir`, sorted
#[allow(dead_code)]
pub fn scenario_files(dir: &Path) -> Vec<PathBuf> {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();
    scenarios
}

/// Parse a decimal or 0x-prefixed hex seed
pub fn parse_seed(text: &str) -> Option<u64> {
    match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Parse `TAG:PARAM`, e.g. `random:0.1`, `geometric:0.25`, `scale_free:5`
#[allow(dead_code)]
pub fn parse_topology(text: &str) -> Result<Topology, ConfigError> {
    let (tag, parameter) = text
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidTopology(format!("expected TAG:PARAM, got '{}'", text)))?;
    let parameter: f64 = parameter.parse().map_err(|_| {
        ConfigError::InvalidTopology(format!("parameter '{}' is not a number", parameter))
    })?;
    Topology::from_tag(tag, parameter)
}
