//! # Clean Command Module / 清理命令模块
//!
//! Performs only the clean-slate setup of a matrix: the output directory is
//! recreated empty and every log following the naming scheme is removed.
//!
//! 仅执行矩阵的全新状态准备：重新创建空的输出目录，并删除所有符合命名方案的日志。

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::core::{config, planner};
use crate::infra::{fs, t};

/// Executes the clean command.
pub fn execute(config_path: &Path, work_dir: &Path) -> Result<()> {
    let matrix = config::load_build_matrix(config_path)?;
    let work_dir = fs::absolute_path(work_dir)?;

    // Planning checks that the output directory does not contain the work dir.
    let plan = planner::plan_execution(&matrix, &work_dir, None, None)?;
    let summary = fs::prepare_clean_slate(&plan.output_root, &plan.log_dir, &matrix.tool, plan.axis_count)?;

    for log in &summary.removed_logs {
        println!("  - {}", log.display());
    }
    println!(
        "{}",
        t!(
            "clean.done",
            logs = summary.removed_logs.len(),
            path = plan.output_root.display()
        )
        .green()
    );
    Ok(())
}
