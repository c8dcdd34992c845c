//! # Build Execution Module / 构建执行模块
//!
//! This module runs a single build invocation: it renders the external build
//! command for one combination, runs it with stdout/stderr redirected into the
//! combination's log file, and turns the exit status into a `BuildResult`.
//!
//! 此模块执行单次构建调用：为一个组合渲染外部构建命令，
//! 将其 stdout/stderr 重定向到该组合的日志文件中运行，并将退出状态转换为 `BuildResult`。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::{
    core::{config::BuildMatrix, models::BuildResult, planner::PlannedBuild},
    infra::{command, t},
};

/// Runs the external builder for one planned combination.
///
/// Every outcome of the builder itself, including a failed launch, an output
/// directory that cannot be created or a command template that renders to
/// nothing, is returned as `Ok(BuildResult::Failed)`
/// and described in the log. `Err` is only returned when the log file itself
/// cannot be created or written.
///
/// # Arguments
/// * `build` - The planned combination, with its log path and output directory
/// * `matrix` - The matrix configuration holding the command templates
/// * `work_dir` - The working directory of the builder
///
/// # Returns
/// A `BuildResult` indicating the outcome of the invocation
pub async fn run_build(build: PlannedBuild, matrix: &BuildMatrix, work_dir: &Path) -> Result<BuildResult> {
    let label = build.combination.label();
    println!(
        "{}",
        t!("run.building", position = build.position, name = &label).blue()
    );

    let start_time = Instant::now();

    let mut log = File::create(&build.log_path)
        .await
        .with_context(|| t!("run.log_create_failed", path = build.log_path.display()).to_string())?;

    let header = format!("# {}: {}\n", t!("log.combination"), label);
    log.write_all(header.as_bytes()).await?;

    let prepared = match tokio::fs::create_dir_all(&build.output_dir).await {
        Ok(()) => command::render_command(
            &matrix.command,
            matrix.variant_arg.as_deref(),
            &build.combination,
            &build.output_dir,
        )
        .with_context(|| t!("log.render_failed").to_string()),
        Err(e) => Err(anyhow::Error::new(e).context(
            t!("fs.create_dir_failed", path = build.output_dir.display()).to_string(),
        )),
    };

    let rendered = match prepared {
        Ok(rendered) => rendered,
        Err(e) => {
            let note = format!("# {:#}\n", e);
            log.write_all(note.as_bytes()).await?;
            log.flush().await?;
            let duration = start_time.elapsed();
            println!(
                "{}",
                t!("run.build_failed", name = &label, duration = format!("{:.2}", duration.as_secs_f64()), log = build.log_path.display()).red()
            );
            return Ok(BuildResult::Failed {
                combination: build.combination,
                log_path: build.log_path,
                exit_code: None,
                duration,
            });
        }
    };

    let command_line = format!("$ {}\n\n", rendered.display());
    log.write_all(command_line.as_bytes()).await?;

    let mut cmd = rendered.to_command();
    cmd.current_dir(work_dir)
        .envs(&matrix.env)
        .envs(command::variant_env(&build.combination, &build.output_dir));

    let status = command::spawn_and_capture(cmd, &mut log).await;
    let duration = start_time.elapsed();

    let (trailer, exit_code, succeeded) = match &status {
        Ok(status) => (format!("\n# {}\n", status), status.code(), status.success()),
        Err(e) => (
            format!("\n# {} '{}': {}\n", t!("log.launch_failed"), rendered.program, e),
            None,
            false,
        ),
    };
    log.write_all(trailer.as_bytes()).await?;
    log.flush().await?;

    let seconds = format!("{:.2}", duration.as_secs_f64());
    if succeeded {
        println!(
            "{}",
            t!("run.build_succeeded", name = &label, duration = seconds).green()
        );
        Ok(BuildResult::Succeeded {
            combination: build.combination,
            log_path: build.log_path,
            exit_code,
            duration,
        })
    } else {
        println!(
            "{}",
            t!("run.build_failed", name = &label, duration = seconds, log = build.log_path.display()).red()
        );
        Ok(BuildResult::Failed {
            combination: build.combination,
            log_path: build.log_path,
            exit_code,
            duration,
        })
    }
}
