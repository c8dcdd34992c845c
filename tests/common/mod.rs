// Shared test helpers for integration tests
#![allow(dead_code)]

use build_matrix::config::BuildMatrix;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// The four-combination scenario matrix: python x libboost x openmm.
pub const SCENARIO_AXES: &str = r#"
[[axes]]
name = "python"
values = ["3.10", "3.11"]

[[axes]]
name = "libboost"
values = ["1.84"]

[[axes]]
name = "openmm"
values = ["8.1", "8.2"]
"#;

/// Log file names of the scenario matrix, in build order.
pub const SCENARIO_LOGS: [&str; 4] = [
    "stub-3.10-1.84-8.1.log",
    "stub-3.10-1.84-8.2.log",
    "stub-3.11-1.84-8.1.log",
    "stub-3.11-1.84-8.2.log",
];

/// A temporary working directory with its canonical path.
pub fn setup_work_dir() -> (TempDir, PathBuf) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let path = temp_dir
        .path()
        .canonicalize()
        .expect("Failed to canonicalize temporary directory");
    (temp_dir, path)
}

/// Writes `stub.sh`, a fake builder that prints its arguments and environment,
/// drops an artifact into the `--output-folder` it receives, records the call
/// in `calls.txt` and exits with `exit_code`.
pub fn write_stub(dir: &Path, exit_code: i32) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
echo "building $*"
echo "python from env: $MATRIX_PYTHON"
echo "stderr line" >&2
mkdir -p "$2" && echo artifact > "$2/artifact-$MATRIX_PYTHON-$MATRIX_OPENMM.txt"
echo "$*" >> calls.txt
exit {}
"#,
        exit_code
    );
    let path = dir.join("stub.sh");
    fs::write(&path, script).expect("Failed to write stub script");
    path
}

/// The scenario configuration driving `stub.sh`, with extra top-level keys.
pub fn scenario_toml(extra: &str) -> String {
    format!(
        r#"language = "en"
tool = "stub"
command = "sh stub.sh --output-folder {{output_dir}}"
variant_arg = "--variant {{axis}}={{value}}"
output_dir = "out"
log_dir = "logs"
{}
{}"#,
        extra, SCENARIO_AXES
    )
}

pub fn scenario_matrix(extra: &str) -> BuildMatrix {
    BuildMatrix::from_toml_str(&scenario_toml(extra)).expect("scenario matrix is valid")
}

/// Writes the scenario configuration as `BuildMatrix.toml` into `dir`.
pub fn write_scenario_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("BuildMatrix.toml");
    fs::write(&path, scenario_toml(extra)).expect("Failed to write BuildMatrix.toml");
    path
}

/// The lines recorded by `stub.sh`, one per invocation.
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.txt"))
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
