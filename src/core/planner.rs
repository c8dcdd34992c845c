//! # Build Execution Planner Module / 构建执行计划模块
//!
//! This module expands the variant axes into their Cartesian product and turns
//! it into an ordered execution plan: exclusions are applied, log and output
//! paths are assigned, and the plan is optionally split across CI runners.
//!
//! 此模块将变体轴展开为笛卡尔积，并将其转换为有序的执行计划：
//! 应用排除规则、分配日志和输出路径，并可选地在多个 CI 运行器之间拆分计划。

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::core::config::BuildMatrix;
use crate::core::models::{AxisValue, VariantAxis, VariantCombination};
use crate::infra::{fs::normalize_path, t};

/// A single combination scheduled for execution.
/// 计划执行的单个组合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBuild {
    /// 1-based position of the combination in the full (unexcluded) matrix.
    /// 组合在完整（未排除）矩阵中从 1 开始的位置。
    pub position: usize,
    /// The axis values of this build.
    /// 此构建的轴值。
    pub combination: VariantCombination,
    /// Where the builder's combined stdout/stderr is written.
    /// 构建器合并的 stdout/stderr 写入的位置。
    pub log_path: PathBuf,
    /// The directory substituted for `{output_dir}`.
    /// 替换 `{output_dir}` 的目录。
    pub output_dir: PathBuf,
}

/// Represents a complete execution plan for a build matrix.
/// 表示构建矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Builds to run on this runner, in matrix order.
    /// 此运行器上要运行的构建，按矩阵顺序排列。
    pub builds: Vec<PlannedBuild>,
    /// Size of the full Cartesian product before exclusions and sharding.
    /// 排除和分片之前完整笛卡尔积的大小。
    pub total_combinations: usize,
    /// The number of combinations dropped by `exclude` entries.
    /// 被 `exclude` 条目删除的组合数量。
    pub excluded_count: usize,
    /// Whether the builds are distributed across multiple runners (CI environment).
    /// 构建是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
    /// Whether every build installs into its own subdirectory of `output_root`.
    /// 每个构建是否安装到 `output_root` 下自己的子目录中。
    pub isolate_outputs: bool,
    /// The shared output directory, recreated at the start of a run.
    pub output_root: PathBuf,
    /// The directory holding the per-combination logs.
    pub log_dir: PathBuf,
    /// Number of axes, i.e. the number of values in every log name.
    pub axis_count: usize,
}

/// Expands the axes into every combination, first axis outermost and last axis innermost.
///
/// Returns an empty list when there are no axes or any axis has no values.
///
/// 将轴展开为所有组合，第一个轴在最外层，最后一个轴在最内层。
/// 当没有轴或任一轴没有值时返回空列表。
pub fn cartesian_product(axes: &[VariantAxis]) -> Vec<VariantCombination> {
    if axes.is_empty() || axes.iter().any(|axis| axis.values.is_empty()) {
        return Vec::new();
    }

    let total: usize = axes.iter().map(|axis| axis.values.len()).product();
    let mut combinations = Vec::with_capacity(total);
    let mut indices = vec![0usize; axes.len()];

    loop {
        combinations.push(VariantCombination::new(
            axes.iter()
                .zip(&indices)
                .map(|(axis, &i)| AxisValue {
                    axis: axis.name.clone(),
                    value: axis.values[i].clone(),
                })
                .collect(),
        ));

        // Odometer step: the innermost axis advances first.
        let mut pos = axes.len();
        loop {
            if pos == 0 {
                return combinations;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < axes[pos].values.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

/// Creates an execution plan for the given build matrix.
///
/// # Arguments
/// * `matrix` - The validated build matrix configuration
/// * `work_dir` - Directory relative `output_dir` and `log_dir` paths are resolved against
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
///
/// # Returns
/// An `ExecutionPlan` whose builds are in deterministic matrix order
pub fn plan_execution(
    matrix: &BuildMatrix,
    work_dir: &Path,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let all = cartesian_product(&matrix.axes);
    let total_combinations = all.len();

    let (kept, excluded): (Vec<_>, Vec<_>) = all
        .into_iter()
        .enumerate()
        .map(|(i, combination)| (i + 1, combination))
        .partition(|(_, combination)| !matrix.exclude.iter().any(|e| combination.matches(e)));

    let work_dir = normalize_path(work_dir);
    let output_root = normalize_path(&work_dir.join(&matrix.output_dir));
    let log_dir = normalize_path(&work_dir.join(&matrix.log_dir));
    let isolate_outputs = matrix.isolate_outputs || matrix.effective_jobs() > 1;

    // The output root is deleted wholesale during setup. A root that still
    // climbs out of a relative work dir cannot be checked.
    if work_dir.starts_with(&output_root)
        || output_root.components().any(|c| c == Component::ParentDir)
    {
        bail!(
            "{}",
            t!("plan.output_dir_contains_work_dir", path = output_root.display())
        );
    }
    if log_dir.starts_with(&output_root) {
        bail!(
            "{}",
            t!("plan.log_dir_inside_output_dir", path = log_dir.display())
        );
    }

    // Sanitizing values may map two combinations onto one file name.
    let mut seen_names: HashMap<String, &VariantCombination> = HashMap::new();
    for (_, combination) in &kept {
        let name = combination.log_file_name(&matrix.tool);
        if let Some(previous) = seen_names.insert(name.clone(), combination) {
            bail!(
                "{}",
                t!(
                    "plan.log_name_collision",
                    name = name,
                    first = previous.label(),
                    second = combination.label()
                )
            );
        }
    }

    let builds: Vec<PlannedBuild> = kept
        .into_iter()
        .map(|(position, combination)| {
            let log_path = log_dir.join(combination.log_file_name(&matrix.tool));
            let output_dir = if isolate_outputs {
                output_root.join(combination.slug())
            } else {
                output_root.clone()
            };
            PlannedBuild {
                position,
                combination,
                log_path,
                output_dir,
            }
        })
        .collect();

    // Distribute builds if running in CI
    let (builds, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("{}", t!("plan.runner_index_out_of_range"));
            }
            let distributed: Vec<_> = builds
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, build)| build)
                .collect();
            (distributed, true)
        }
        (None, None) => (builds, false),
        _ => bail!("{}", t!("plan.runner_args_incomplete")),
    };

    Ok(ExecutionPlan {
        builds,
        total_combinations,
        excluded_count: excluded.len(),
        is_distributed,
        isolate_outputs,
        output_root,
        log_dir,
        axis_count: matrix.axes.len(),
    })
}
