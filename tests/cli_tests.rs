//! # CLI Tests / CLI 测试
//!
//! Runs the `build-matrix` binary end to end against a stub builder and checks
//! exit codes, console output, reports, `init` and `clean`.
//!
//! 针对桩构建器端到端运行 `build-matrix` 可执行文件，
//! 检查退出码、控制台输出、报告、`init` 和 `clean`。

use assert_cmd::prelude::*;
use build_matrix::cli::{build_cli, pre_parse_language, run_options};
use build_matrix::config::load_build_matrix;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

mod common;

fn build_matrix_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("build-matrix").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1").arg("--lang").arg("en");
    cmd
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod argument_tests {
    use super::*;

    #[test]
    fn test_pre_parse_finds_both_lang_forms() {
        assert_eq!(
            pre_parse_language(args(&["build-matrix", "--lang", "zh-CN", "run"])),
            Some("zh-CN".to_string())
        );
        assert_eq!(
            pre_parse_language(args(&["build-matrix", "run", "--lang=en"])),
            Some("en".to_string())
        );
        assert_eq!(pre_parse_language(args(&["build-matrix", "run"])), None);
    }

    #[test]
    fn test_run_options_are_extracted() {
        let matches = build_cli()
            .try_get_matches_from([
                "build-matrix",
                "run",
                "-c",
                "m.toml",
                "-j",
                "4",
                "--fail-fast",
                "--total-runners",
                "3",
                "--runner-index",
                "1",
                "--json",
                "out.json",
            ])
            .unwrap();
        let (_, run_matches) = matches.subcommand().unwrap();
        let options = run_options(run_matches);

        assert_eq!(options.config, PathBuf::from("m.toml"));
        assert_eq!(options.work_dir, PathBuf::from("."));
        assert_eq!(options.jobs, Some(4));
        assert!(options.fail_fast);
        assert_eq!(options.total_runners, Some(3));
        assert_eq!(options.runner_index, Some(1));
        assert!(!options.dry_run);
        assert_eq!(options.json, Some(PathBuf::from("out.json")));
        assert!(options.html.is_none());
        assert!(options.lang.is_none());
    }

    #[test]
    fn test_defaults_and_global_lang() {
        let matches = build_cli()
            .try_get_matches_from(["build-matrix", "run", "--lang", "zh-CN"])
            .unwrap();
        let (_, run_matches) = matches.subcommand().unwrap();
        let options = run_options(run_matches);
        assert_eq!(options.config, PathBuf::from("BuildMatrix.toml"));
        assert_eq!(options.lang.as_deref(), Some("zh-CN"));
    }

    #[test]
    fn test_runner_flags_require_each_other() {
        let result =
            build_cli().try_get_matches_from(["build-matrix", "run", "--total-runners", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(build_cli().try_get_matches_from(["build-matrix"]).is_err());
    }
}

#[cfg(all(test, unix))]
mod run_tests {
    use super::*;

    /// A passing stub builds all four combinations and the run succeeds.
    #[test]
    fn test_successful_run() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 0);
        common::write_scenario_config(&work_dir, "");

        build_matrix_cmd(&work_dir)
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("ALL COMBINATIONS BUILT SUCCESSFULLY"))
            .stdout(predicate::str::contains("Total: 4, succeeded: 4, failed: 0, skipped: 0"));

        for name in common::SCENARIO_LOGS {
            assert!(work_dir.join("logs").join(name).exists(), "missing {}", name);
        }
        assert_eq!(common::recorded_calls(&work_dir).len(), 4);
    }

    /// A failing stub still runs every combination, but the process exits non-zero.
    #[test]
    fn test_failed_combinations_fail_the_run() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 1);
        common::write_scenario_config(&work_dir, "");

        build_matrix_cmd(&work_dir)
            .arg("run")
            .assert()
            .failure()
            .stdout(predicate::str::contains("BUILD FAILURES"))
            .stdout(predicate::str::contains("stderr line"))
            .stderr(predicate::str::contains("Error:"))
            .stderr(predicate::str::contains("4 failed and 0 skipped"));

        assert_eq!(common::recorded_calls(&work_dir).len(), 4);
    }

    #[test]
    fn test_fail_fast_flag() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 1);
        common::write_scenario_config(&work_dir, "");

        build_matrix_cmd(&work_dir)
            .args(["run", "--fail-fast"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("1 failed and 3 skipped"));

        assert_eq!(common::recorded_calls(&work_dir).len(), 1);
    }

    #[test]
    fn test_dry_run_prints_plan_without_running() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 0);
        common::write_scenario_config(&work_dir, "");
        fs::create_dir_all(work_dir.join("out")).unwrap();
        fs::write(work_dir.join("out/keep.txt"), "previous").unwrap();

        build_matrix_cmd(&work_dir)
            .args(["run", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--- Build Plan ---"))
            .stdout(predicate::str::contains("stub-3.11-1.84-8.2.log"))
            .stdout(predicate::str::contains("$ sh stub.sh --output-folder"));

        assert!(common::recorded_calls(&work_dir).is_empty());
        assert!(work_dir.join("out/keep.txt").exists());
        assert!(!work_dir.join("logs").exists());
    }

    #[test]
    fn test_sharded_run_builds_its_share() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 0);
        common::write_scenario_config(&work_dir, "");

        build_matrix_cmd(&work_dir)
            .args(["run", "--total-runners", "2", "--runner-index", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("runner 2 of 2"));

        let calls = common::recorded_calls(&work_dir);
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("python=3.10") && calls[0].contains("openmm=8.2"));
        assert!(calls[1].contains("python=3.11") && calls[1].contains("openmm=8.2"));
    }

    #[test]
    fn test_reports_are_written() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_stub(&work_dir, 0);
        common::write_scenario_config(&work_dir, "[[exclude]]\nopenmm = \"8.1\"\n");

        build_matrix_cmd(&work_dir)
            .args(["run", "--html", "report.html", "--json", "report.json"])
            .assert()
            .success();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(work_dir.join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["succeeded"], 2);
        assert_eq!(json["excluded"], 2);

        let html = fs::read_to_string(work_dir.join("report.html")).unwrap();
        assert!(html.contains("python=3.11, libboost=1.84, openmm=8.2"));
    }

    #[test]
    fn test_invalid_config_fails_before_cleanup() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        fs::write(
            work_dir.join("BuildMatrix.toml"),
            "command = \"make\"\noutput_dir = \"out\"\n\n[[axes]]\nname = \"python\"\nvalues = []\n",
        )
        .unwrap();
        fs::create_dir_all(work_dir.join("out")).unwrap();
        fs::write(work_dir.join("out/keep.txt"), "previous").unwrap();

        build_matrix_cmd(&work_dir)
            .arg("run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("'python' has no values"));

        assert!(work_dir.join("out/keep.txt").exists());
    }

    #[test]
    fn test_missing_config_file() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        build_matrix_cmd(&work_dir)
            .args(["run", "-c", "nope.toml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.toml"));
    }

    #[test]
    fn test_clean_removes_previous_run() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        common::write_scenario_config(&work_dir, "");
        fs::create_dir_all(work_dir.join("out/sub")).unwrap();
        fs::write(work_dir.join("out/sub/a.txt"), "old").unwrap();
        fs::create_dir_all(work_dir.join("logs")).unwrap();
        fs::write(work_dir.join("logs/stub-3.10-1.84-8.1.log"), "old").unwrap();

        build_matrix_cmd(&work_dir)
            .arg("clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 stale log files"));

        assert_eq!(fs::read_dir(work_dir.join("out")).unwrap().count(), 0);
        assert_eq!(fs::read_dir(work_dir.join("logs")).unwrap().count(), 0);
    }
}

#[cfg(test)]
mod init_tests {
    use super::*;
    use build_matrix::cli::commands::init::{DEFAULT_CONFIG, parse_values};
    use build_matrix::config::BuildMatrix;
    use build_matrix::models::VariantAxis;

    #[test]
    fn test_default_config_is_the_three_axis_matrix() {
        let matrix = BuildMatrix::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(matrix.axes[0].values, ["3.10", "3.11", "3.12"]);
        assert_eq!(matrix.axes[1].values, ["1.84"]);
        assert_eq!(matrix.axes[2].values, ["8.1", "8.2"]);
        assert!(matrix.continue_on_error);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values(" 3.10, 3.11 ,,3.12 "), ["3.10", "3.11", "3.12"]);
        assert!(parse_values(" , ").is_empty());
    }

    #[test]
    fn test_wizard_axis_from_parsed_values() {
        let axis = VariantAxis::new("python", parse_values("3.10, 3.11"));
        assert_eq!(axis.name, "python");
        assert_eq!(axis.values, ["3.10", "3.11"]);
    }

    #[test]
    fn test_init_non_interactive_writes_valid_config() {
        let (_temp_dir, work_dir) = common::setup_work_dir();

        build_matrix_cmd(&work_dir)
            .args(["init", "--non-interactive"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created BuildMatrix.toml"));

        let matrix = load_build_matrix(&work_dir.join("BuildMatrix.toml")).unwrap();
        let names: Vec<_> = matrix.axes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["python", "libboost", "openmm"]);
        assert_eq!(matrix.tool, "conda-build");
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let (_temp_dir, work_dir) = common::setup_work_dir();
        let path = work_dir.join("BuildMatrix.toml");
        fs::write(&path, "# mine").unwrap();

        build_matrix_cmd(&work_dir)
            .args(["init", "--non-interactive"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        build_matrix_cmd(&work_dir)
            .args(["init", "--non-interactive", "--force"])
            .assert()
            .success();
        assert!(load_build_matrix(&path).is_ok());
    }

    #[test]
    fn test_init_custom_output_creates_parents() {
        let (_temp_dir, work_dir) = common::setup_work_dir();

        build_matrix_cmd(&work_dir)
            .args(["init", "--non-interactive", "--output", "ci/matrix.toml"])
            .assert()
            .success();

        assert!(load_build_matrix(&work_dir.join("ci/matrix.toml")).is_ok());
    }
}
