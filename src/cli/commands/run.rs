//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command of the build matrix CLI, which
//! prepares a clean slate and invokes the external builder once for every
//! planned combination.
//!
//! 此模块实现构建矩阵 CLI 的 `run` 命令，
//! 它准备全新的状态，并为每个计划中的组合调用一次外部构建器。

use anyhow::{Context, Result, bail};
use chrono::Local;
use colored::*;
use futures::{StreamExt, stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, BuildMatrix},
        execution::run_build,
        models::{BuildResult, MatrixReport},
        planner::{self, ExecutionPlan},
    },
    infra::{fs::{absolute_path, prepare_clean_slate}, t},
    reporting::{
        console::{print_failure_details, print_plan, print_summary},
        html::generate_html_report,
        json::write_json_report,
    },
};

/// Options of the `run` command, as given on the command line.
/// `run` 命令的选项，来自命令行。
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Path to the matrix configuration file / 矩阵配置文件路径
    pub config: PathBuf,
    /// Working directory of the builder / 构建器的工作目录
    pub work_dir: PathBuf,
    /// Overrides `jobs` from the configuration / 覆盖配置中的 `jobs`
    pub jobs: Option<usize>,
    /// Stop starting new combinations after the first failure / 第一次失败后不再启动新组合
    pub fail_fast: bool,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    /// Print the plan and exit / 打印计划并退出
    pub dry_run: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Explicit `--lang`; takes precedence over the configured language.
    pub lang: Option<String>,
}

/// Executes the run command with the provided options.
///
/// # Arguments
/// * `options` - The parsed command line options
///
/// # Returns
/// `Ok(())` when every planned combination succeeded, an error otherwise
pub async fn execute(options: RunOptions) -> Result<()> {
    let mut matrix = config::load_build_matrix(&options.config)?;
    if options.lang.is_none() {
        crate::set_language(&matrix.language);
    }
    if let Some(jobs) = options.jobs {
        matrix.jobs = jobs;
    }
    if options.fail_fast {
        matrix.continue_on_error = false;
    }

    let work_dir = absolute_path(&options.work_dir)?;
    println!(
        "{}",
        t!("run.loaded_matrix", path = options.config.display())
    );

    let plan = planner::plan_execution(
        &matrix,
        &work_dir,
        options.total_runners,
        options.runner_index,
    )?;
    print_plan_header(&plan, &matrix, options.total_runners, options.runner_index);

    if options.dry_run {
        print_plan(&plan, &matrix);
        return Ok(());
    }

    let cleanup = prepare_clean_slate(&plan.output_root, &plan.log_dir, &matrix.tool, plan.axis_count)
        .with_context(|| t!("run.setup_failed").to_string())?;
    if cleanup.removed_output_dir {
        println!(
            "{}",
            t!("run.removed_output_dir", path = plan.output_root.display()).dimmed()
        );
    }
    if !cleanup.removed_logs.is_empty() {
        println!(
            "{}",
            t!("run.removed_logs", count = cleanup.removed_logs.len()).dimmed()
        );
    }

    if plan.builds.is_empty() {
        println!("{}", t!("run.no_builds").green());
        return Ok(());
    }

    let interrupt = setup_signal_handler();
    let started_at = Local::now();
    let results = run_builds(&plan, &matrix, &work_dir, interrupt).await;
    let report = MatrixReport::new(&matrix.tool, started_at, results, plan.excluded_count);

    print_summary(&report);

    if let Some(report_path) = &options.html {
        println!("\n{}", t!("run.writing_html", path = report_path.display()));
        if let Err(e) = generate_html_report(&report, report_path) {
            eprintln!("{} {:#}", t!("run.html_failed").red(), e);
        }
    }
    if let Some(report_path) = &options.json {
        println!("\n{}", t!("run.writing_json", path = report_path.display()));
        if let Err(e) = write_json_report(&report, report_path) {
            eprintln!("{} {:#}", t!("run.json_failed").red(), e);
        }
    }

    if report.has_failures() {
        print_failure_details(&report);
        bail!(
            "{}",
            t!("run.matrix_failed", failed = report.failed, skipped = report.skipped)
        );
    }

    println!("\n{}", t!("run.all_succeeded").green().bold());
    Ok(())
}

fn print_plan_header(
    plan: &ExecutionPlan,
    matrix: &BuildMatrix,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) {
    let axes = matrix
        .axes
        .iter()
        .map(|axis| format!("{}({})", axis.name, axis.values.len()))
        .collect::<Vec<_>>()
        .join(" x ");
    println!(
        "{}",
        t!("run.matrix_size", total = plan.total_combinations, axes = axes).cyan()
    );

    if plan.excluded_count > 0 {
        println!(
            "{}",
            t!("run.excluded_count", count = plan.excluded_count).cyan()
        );
    }

    if let (Some(total), Some(index)) = (total_runners, runner_index) {
        println!(
            "{}",
            t!(
                "run.split_runner",
                index = index + 1,
                total = total,
                count = plan.builds.len()
            )
            .bold()
        );
    } else {
        println!(
            "{}",
            t!("run.single_runner", jobs = matrix.effective_jobs()).bold()
        );
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("run.shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => eprintln!("{}", t!("run.signal_handler_failed", error = e).yellow()),
        }
    });

    token
}

/// Runs every planned build, at most `jobs` at a time, and returns the results in plan order.
///
/// Combinations are started in plan order. A combination that has not started
/// when `interrupt` is cancelled, or when an earlier combination failed with
/// `continue_on_error` disabled, is recorded as `Skipped`. Builds already in
/// flight always run to completion.
///
/// 运行每个计划中的构建，最多同时运行 `jobs` 个，并按计划顺序返回结果。
/// 组合按计划顺序启动。当 `interrupt` 被取消，或在禁用 `continue_on_error` 时
/// 较早的组合失败，尚未开始的组合记录为 `Skipped`。已在运行的构建总是运行至完成。
pub async fn run_builds(
    plan: &ExecutionPlan,
    matrix: &BuildMatrix,
    work_dir: &Path,
    interrupt: CancellationToken,
) -> Vec<BuildResult> {
    let fail_fast_token = CancellationToken::new();
    let continue_on_error = matrix.continue_on_error;
    let jobs = matrix.effective_jobs().max(1);
    let matrix = Arc::new(matrix.clone());
    let work_dir = Arc::new(work_dir.to_path_buf());

    stream::iter(plan.builds.iter().cloned().map(|build| {
        let fail_fast_token = fail_fast_token.clone();
        let interrupt = interrupt.clone();
        let matrix = Arc::clone(&matrix);
        let work_dir = Arc::clone(&work_dir);

        async move {
            if interrupt.is_cancelled() || fail_fast_token.is_cancelled() {
                return BuildResult::Skipped {
                    combination: build.combination,
                };
            }

            let combination = build.combination.clone();
            let log_path = build.log_path.clone();
            let start_time = Instant::now();
            let handle =
                tokio::spawn(async move { run_build(build, &matrix, &work_dir).await });

            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    eprintln!(
                        "{}",
                        t!("run.build_error", name = combination.label(), error = format!("{:#}", e)).red()
                    );
                    BuildResult::Failed {
                        combination,
                        log_path,
                        exit_code: None,
                        duration: start_time.elapsed(),
                    }
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        t!("run.task_failed", name = combination.label(), error = e).red()
                    );
                    BuildResult::Failed {
                        combination,
                        log_path,
                        exit_code: None,
                        duration: start_time.elapsed(),
                    }
                }
            };

            if result.is_failure() && !continue_on_error {
                fail_fast_token.cancel();
            }
            result
        }
    }))
    .buffered(jobs)
    .collect()
    .await
}
