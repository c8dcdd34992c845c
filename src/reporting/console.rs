//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of plans and build reports in the console.
//! It provides functionality for printing colorful, formatted summaries with
//! internationalization support.
//!
//! 此模块处理控制台中计划和构建报告的显示。
//! 它提供打印彩色格式化摘要的功能，支持国际化。

use colored::*;

use crate::core::config::BuildMatrix;
use crate::core::models::{BuildResult, MatrixReport};
use crate::core::planner::ExecutionPlan;
use crate::infra::command::render_command;
use crate::infra::fs::read_tail;
use crate::infra::t;

/// Number of log lines shown for each failed combination.
const FAILURE_TAIL_LINES: usize = 20;

/// Prints every planned build with its log file and rendered command, without running anything.
///
/// 打印每个计划中的构建及其日志文件和渲染后的命令，不执行任何操作。
pub fn print_plan(plan: &ExecutionPlan, matrix: &BuildMatrix) {
    println!("\n{}", t!("plan_banner").bold());

    for build in &plan.builds {
        println!(
            "  [{}/{}] {}",
            build.position,
            plan.total_combinations,
            build.combination.label().cyan()
        );
        match render_command(
            &matrix.command,
            matrix.variant_arg.as_deref(),
            &build.combination,
            &build.output_dir,
        ) {
            Ok(rendered) => println!("        $ {}", rendered.display()),
            Err(e) => println!("        {}", format!("{:#}", e).red()),
        }
        println!(
            "        {} {}",
            t!("plan.log_label").dimmed(),
            build.log_path.display()
        );
    }
}

/// Prints a formatted summary of build results to the console.
/// Displays a table with status, combination, exit code and duration,
/// using color coding to highlight different statuses.
///
/// 在控制台打印格式化的构建结果摘要。
/// 显示一个包含状态、组合、退出码和持续时间的表格，使用颜色编码突出显示不同的状态。
///
/// # Output Format / 输出格式
/// ```text
/// --- Build Matrix Summary ---
///   - Succeeded  | python=3.10, libboost=1.84, openmm=8.1  | exit 0     |   12.30s
///   - Failed     | python=3.10, libboost=1.84, openmm=8.2  | exit 1     |    4.05s
///   - Skipped    | python=3.11, libboost=1.84, openmm=8.1  |            |      N/A
/// ```
pub fn print_summary(report: &MatrixReport) {
    println!("\n{}", t!("summary_banner").bold());

    for result in &report.results {
        let status_str = result.status_str();
        let status_colored = match result {
            BuildResult::Succeeded { .. } => status_str.green(),
            BuildResult::Failed { .. } => status_str.red(),
            BuildResult::Skipped { .. } => status_str.dimmed(),
        };
        let exit_str = match result {
            BuildResult::Skipped { .. } => String::new(),
            _ => result
                .exit_code()
                .map(|code| format!("exit {}", code))
                .unwrap_or_else(|| "exit -".to_string()),
        };
        let duration_str = result
            .duration()
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "N/A".to_string());

        println!(
            "  - {:<12} | {:<40} | {:<10} | {:>9}",
            status_colored,
            result.combination().label(),
            exit_str,
            duration_str
        );
    }

    println!(
        "\n{}",
        t!(
            "summary_counts",
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped
        )
    );
    if report.excluded > 0 {
        println!("{}", t!("summary_excluded", count = report.excluded).dimmed());
    }
}

/// Prints the log location and the last lines of the log of every failed combination.
///
/// 打印每个失败组合的日志位置及其日志的最后几行。
pub fn print_failure_details(report: &MatrixReport) {
    let failures = report.failures();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("failure_banner").red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            t!("report_header_failure").red(),
            result.combination().label().cyan()
        );

        if let Some(log_path) = result.log_path() {
            println!("{} {}", t!("plan.log_label"), log_path.display());
            match read_tail(log_path, FAILURE_TAIL_LINES) {
                Ok(tail) => {
                    println!("\n--- {} ---\n", t!("log_tail", lines = FAILURE_TAIL_LINES).yellow());
                    println!("{}", tail);
                }
                Err(e) => println!("{}", format!("{:#}", e).yellow()),
            }
        }
        println!("\n{}", "-".repeat(80));
    }
}
