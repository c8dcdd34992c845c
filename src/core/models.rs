//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the build matrix
//! driver: variant axes and combinations, the result of a single build
//! invocation, and the aggregate report of a whole run.
//!
//! 此模块定义了整个构建矩阵驱动程序中使用的核心数据结构：
//! 变体轴和组合、单次构建调用的结果以及整个运行的汇总报告。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::fs::sanitize_component;
use crate::infra::t;

/// One dimension of the build matrix: a name and its ordered values.
/// Values are opaque strings; they are only substituted and displayed, never parsed.
///
/// 构建矩阵的一个维度：名称及其有序值。
/// 值是不透明的字符串；仅用于替换和显示，从不解析。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariantAxis {
    /// The axis name, also the `{name}` placeholder in command templates.
    /// 轴名称，同时也是命令模板中的 `{name}` 占位符。
    pub name: String,
    /// The ordered values of this axis.
    /// 此轴的有序值。
    pub values: Vec<String>,
}

impl VariantAxis {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single axis assignment inside a combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AxisValue {
    pub axis: String,
    pub value: String,
}

/// One concrete assignment of a single value to every axis, in axis order.
/// 为每个轴分配单个值的一个具体赋值，按轴的顺序排列。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VariantCombination {
    values: Vec<AxisValue>,
}

impl VariantCombination {
    pub fn new(values: Vec<AxisValue>) -> Self {
        Self { values }
    }

    /// The assignments in axis order.
    pub fn values(&self) -> &[AxisValue] {
        &self.values
    }

    /// Looks up the value chosen for `axis`.
    pub fn value_of(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.axis == axis)
            .map(|v| v.value.as_str())
    }

    /// Human readable form, e.g. `python=3.10, libboost=1.84`.
    pub fn label(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("{}={}", v.axis, v.value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The sanitized values joined by `-`, e.g. `3.10-1.84-8.1`.
    /// Used for log file names and isolated output directories.
    ///
    /// 以 `-` 连接的清理后的值，例如 `3.10-1.84-8.1`。
    /// 用于日志文件名和隔离的输出目录。
    pub fn slug(&self) -> String {
        self.values
            .iter()
            .map(|v| sanitize_component(&v.value))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// The log file name for this combination: `<tool>-<v1>-...-<vn>.log`.
    pub fn log_file_name(&self, tool: &str) -> String {
        format!("{}-{}.log", sanitize_component(tool), self.slug())
    }

    /// Returns `true` when every key/value of `partial` is part of this combination.
    pub fn matches(&self, partial: &BTreeMap<String, String>) -> bool {
        partial
            .iter()
            .all(|(axis, value)| self.value_of(axis) == Some(value.as_str()))
    }
}

impl fmt::Display for VariantCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Represents the final result of a single build invocation.
///
/// A launch failure and a non-zero exit are both `Failed`; the distinction only
/// lives in the combination's log file and in `exit_code` being `None`.
///
/// 表示单次构建调用的最终结果。
/// 启动失败和非零退出都属于 `Failed`；区别仅体现在组合的日志文件中以及 `exit_code` 为 `None`。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildResult {
    /// The builder exited with status zero.
    /// 构建器以状态零退出。
    Succeeded {
        /// The combination that was built / 已构建的组合
        combination: VariantCombination,
        /// Log file holding the builder's combined output / 保存构建器合并输出的日志文件
        log_path: PathBuf,
        /// Exit code of the builder / 构建器的退出码
        exit_code: Option<i32>,
        /// Wall-clock time of the invocation / 调用的实际耗时
        #[serde(serialize_with = "serialize_secs")]
        duration: Duration,
    },
    /// The builder exited non-zero, was killed, or could not be launched.
    /// 构建器以非零状态退出、被终止或无法启动。
    Failed {
        combination: VariantCombination,
        log_path: PathBuf,
        /// `None` when the process never ran or was terminated by a signal.
        /// 当进程从未运行或被信号终止时为 `None`。
        exit_code: Option<i32>,
        #[serde(serialize_with = "serialize_secs")]
        duration: Duration,
    },
    /// The combination was never started (fail-fast or interrupt).
    /// 组合从未开始（快速失败或中断）。
    Skipped { combination: VariantCombination },
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl BuildResult {
    pub fn combination(&self) -> &VariantCombination {
        match self {
            BuildResult::Succeeded { combination, .. }
            | BuildResult::Failed { combination, .. }
            | BuildResult::Skipped { combination } => combination,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BuildResult::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BuildResult::Skipped { .. })
    }

    /// Gets the log path. Skipped combinations never produce a log.
    /// 获取日志路径。跳过的组合不会产生日志。
    pub fn log_path(&self) -> Option<&Path> {
        match self {
            BuildResult::Succeeded { log_path, .. } | BuildResult::Failed { log_path, .. } => {
                Some(log_path)
            }
            BuildResult::Skipped { .. } => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildResult::Succeeded { exit_code, .. } | BuildResult::Failed { exit_code, .. } => {
                *exit_code
            }
            BuildResult::Skipped { .. } => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            BuildResult::Succeeded { duration, .. } | BuildResult::Failed { duration, .. } => {
                Some(*duration)
            }
            BuildResult::Skipped { .. } => None,
        }
    }

    /// Gets the localized status of the result for display.
    /// 获取结果的本地化状态以供显示。
    pub fn status_str(&self) -> String {
        match self {
            BuildResult::Succeeded { .. } => t!("report.status_succeeded").to_string(),
            BuildResult::Failed { .. } => t!("report.status_failed").to_string(),
            BuildResult::Skipped { .. } => t!("report.status_skipped").to_string(),
        }
    }

    /// Gets the CSS class used by the HTML report.
    pub fn status_class(&self) -> &'static str {
        match self {
            BuildResult::Succeeded { .. } => "status-succeeded",
            BuildResult::Failed { .. } => "status-failed",
            BuildResult::Skipped { .. } => "status-skipped",
        }
    }
}

/// Aggregate outcome of a matrix run.
/// 矩阵运行的汇总结果。
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub tool: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Combinations dropped by `exclude` entries; never attempted.
    /// 被 `exclude` 条目排除的组合；从未尝试。
    pub excluded: usize,
    pub results: Vec<BuildResult>,
}

impl MatrixReport {
    pub fn new(
        tool: impl Into<String>,
        started_at: DateTime<Local>,
        results: Vec<BuildResult>,
        excluded: usize,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let failed = results.iter().filter(|r| r.is_failure()).count();
        let skipped = results.iter().filter(|r| r.is_skipped()).count();
        Self {
            tool: tool.into(),
            started_at,
            finished_at: Local::now(),
            total: results.len(),
            succeeded,
            failed,
            skipped,
            excluded,
            results,
        }
    }

    /// `true` when any combination failed or was skipped.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.skipped > 0
    }

    pub fn failures(&self) -> Vec<&BuildResult> {
        self.results.iter().filter(|r| r.is_failure()).collect()
    }
}
