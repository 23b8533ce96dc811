//! Scenario replay
//!
//! This module provides the `scenario` subcommand. A scenario is a YAML list
//! of operations applied one after another to a persistent vector. Every
//! intermediate version is kept, and after the replay each one is checked
//! against the contents it had when it was produced.

use anyhow::{Context, Result, bail, ensure};
use clap::Args;
use radix_vector::VectorError;
use radix_vector::persistent::PersistentVector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the scenario subcommand
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Scenario YAML file path
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// Print the rendering of every version (overrides the scenario's `render`)
    #[arg(long)]
    pub render: bool,

    /// Write a JSON summary of the replay to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Scenario configuration from YAML
#[derive(Debug, Deserialize)]
struct ScenarioConfig {
    name: Option<String>,
    render: Option<bool>,
    steps: Vec<Step>,
}

/// One operation of a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    /// Append a single value
    Push(i64),
    /// Append `start..end`
    PushRange { start: i64, end: i64 },
    /// Replace the value at `index`
    Update { index: usize, value: i64 },
    /// Read `index`, optionally asserting its value
    Get { index: usize, expect: Option<i64> },
    /// Assert that reading `index` is rejected as out of bounds
    ExpectOutOfBounds { index: usize },
    /// Label the current version
    Checkpoint(String),
}

/// A version produced during replay, with the contents it must keep.
struct Version {
    label: Option<String>,
    vector: PersistentVector<i64>,
    expected: Vec<i64>,
}

/// Summary written by `--report`
#[derive(Debug, Serialize)]
struct ScenarioReport {
    name: String,
    steps: usize,
    versions: Vec<VersionReport>,
}

#[derive(Debug, Serialize)]
struct VersionReport {
    label: Option<String>,
    length: usize,
    depth: usize,
}

/// Applies `steps` to an empty vector and returns every produced version.
///
/// The first entry is always the empty vector.
fn replay(steps: &[Step]) -> Result<Vec<Version>> {
    let mut versions = vec![Version {
        label: None,
        vector: PersistentVector::new(),
        expected: Vec::new(),
    }];

    for (position, step) in steps.iter().enumerate() {
        let current = versions.last().context("replay history is empty")?;
        let step_number = position + 1;

        let next = match step {
            Step::Push(value) => Some((
                current.vector.push_back(*value),
                with_pushed(&current.expected, std::iter::once(*value)),
            )),
            Step::PushRange { start, end } => Some((
                current.vector.push_back_many(*start..*end),
                with_pushed(&current.expected, *start..*end),
            )),
            Step::Update { index, value } => {
                let vector = current
                    .vector
                    .update(*index, *value)
                    .with_context(|| format!("step {step_number}: update failed"))?;
                let mut expected = current.expected.clone();
                expected[*index] = *value;
                Some((vector, expected))
            }
            Step::Get { index, expect } => {
                let actual = *current
                    .vector
                    .get(*index)
                    .with_context(|| format!("step {step_number}: get failed"))?;
                if let Some(expected) = expect {
                    ensure!(
                        actual == *expected,
                        "step {step_number}: get({index}) returned {actual}, expected {expected}"
                    );
                }
                tracing::info!(step = step_number, index, value = actual, "get");
                None
            }
            Step::ExpectOutOfBounds { index } => {
                match current.vector.get(*index) {
                    Err(VectorError::OutOfBounds { .. }) => {}
                    Ok(value) => bail!(
                        "step {step_number}: get({index}) returned {value}, expected out of bounds"
                    ),
                }
                None
            }
            Step::Checkpoint(label) => {
                let current = versions.last_mut().context("replay history is empty")?;
                current.label = Some(label.clone());
                None
            }
        };

        if let Some((vector, expected)) = next {
            tracing::debug!(
                step = step_number,
                length = vector.len(),
                depth = vector.depth(),
                "new version"
            );
            versions.push(Version {
                label: None,
                vector,
                expected,
            });
        }
    }

    Ok(versions)
}

fn with_pushed(base: &[i64], values: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut expected = base.to_vec();
    expected.extend(values);
    expected
}

/// Checks that every version still holds exactly its recorded contents.
fn verify(versions: &[Version]) -> Result<()> {
    for (number, version) in versions.iter().enumerate() {
        ensure!(
            version.vector.len() == version.expected.len(),
            "version {number}: length {} differs from recorded {}",
            version.vector.len(),
            version.expected.len()
        );
        for (index, expected) in version.expected.iter().enumerate() {
            let actual = version
                .vector
                .get(index)
                .with_context(|| format!("version {number}: index {index} unreadable"))?;
            ensure!(
                actual == expected,
                "version {number}: index {index} holds {actual}, recorded {expected}"
            );
        }
    }
    Ok(())
}

fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    serde_yaml::from_str(&content).context("Failed to parse scenario YAML")
}

/// Main entry point for scenario command
pub fn run(args: &ScenarioArgs) -> Result<()> {
    let scenario = load_scenario(&args.file)?;
    let name = scenario
        .name
        .clone()
        .unwrap_or_else(|| args.file.display().to_string());
    // Priority: CLI > Scenario YAML > Default
    let render = args.render || scenario.render.unwrap_or(false);

    tracing::info!(scenario = %name, steps = scenario.steps.len(), "replaying scenario");

    let versions = replay(&scenario.steps)?;
    verify(&versions)?;

    for (number, version) in versions.iter().enumerate() {
        let label = version.label.as_deref().unwrap_or("-");
        if render {
            println!("v{number} [{label}] {}", version.vector);
        } else {
            println!(
                "v{number} [{label}] length={} depth={}",
                version.vector.len(),
                version.vector.depth()
            );
        }
    }

    tracing::info!(versions = versions.len(), "all versions verified");

    if let Some(report_path) = &args.report {
        let report = ScenarioReport {
            name,
            steps: scenario.steps.len(),
            versions: versions
                .iter()
                .map(|version| VersionReport {
                    label: version.label.clone(),
                    length: version.vector.len(),
                    depth: version.vector.depth(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
    }

    Ok(())
}
