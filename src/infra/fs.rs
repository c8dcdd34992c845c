//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the file system side of a matrix run: the clean-slate
//! setup that removes stale output and logs, name sanitizing, and reading logs
//! back for reports.
//!
//! 此模块提供矩阵运行的文件系统部分：删除过时输出和日志的全新状态准备、
//! 名称清理以及为报告读回日志。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::infra::t;

/// What the clean-slate setup removed.
/// 全新状态准备所删除的内容。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Log files from a previous run that matched the naming scheme.
    /// 与命名方案匹配的上一次运行的日志文件。
    pub removed_logs: Vec<PathBuf>,
    /// Whether a previous output directory existed and was deleted.
    /// 上一次的输出目录是否存在并已被删除。
    pub removed_output_dir: bool,
}

/// Replaces every character that is unsafe in a file name with `_`.
/// ASCII alphanumerics, `.`, `_` and `+` are kept, so version strings stay readable.
///
/// 将文件名中每个不安全的字符替换为 `_`。
/// 保留 ASCII 字母数字、`.`、`_` 和 `+`，以便版本字符串保持可读。
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns `true` when `file_name` is `<tool>-<v1>-...-<vn>.log` with exactly
/// `axis_count` sanitized, non-empty values.
///
/// 当 `file_name` 恰好为带有 `axis_count` 个清理后非空值的
/// `<tool>-<v1>-...-<vn>.log` 时返回 `true`。
pub fn is_matrix_log_name(file_name: &str, tool: &str, axis_count: usize) -> bool {
    let prefix = format!("{}-", sanitize_component(tool));
    let Some(slug) = file_name
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix(".log"))
    else {
        return false;
    };

    let parts: Vec<&str> = slug.split('-').collect();
    parts.len() == axis_count
        && parts
            .iter()
            .all(|part| !part.is_empty() && sanitize_component(part) == *part)
}

/// Lists the log files in `log_dir` that follow the log naming scheme of a
/// matrix with `axis_count` axes, sorted by path. A missing `log_dir` has no logs.
pub fn find_stale_logs(log_dir: &Path, tool: &str, axis_count: usize) -> Result<Vec<PathBuf>> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(log_dir)
        .with_context(|| t!("fs.read_dir_failed", path = log_dir.display()).to_string())?;

    let mut logs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| t!("fs.read_dir_failed", path = log_dir.display()).to_string())?;
        let is_file = entry.file_type().map(|ty| ty.is_file()).unwrap_or(false);
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_file && is_matrix_log_name(&name, tool, axis_count) {
            logs.push(entry.path());
        }
    }
    logs.sort();
    Ok(logs)
}

/// Deletes the previous output directory and every stale log, then recreates
/// both directories empty. Any failure here is fatal to the run.
///
/// # Arguments
/// * `output_root` - The shared output directory
/// * `log_dir` - The directory holding per-combination logs
/// * `tool` - The log file prefix
/// * `axis_count` - Number of values in every log name
///
/// 删除之前的输出目录和所有过时日志，然后重新创建两个空目录。此处的任何失败对运行都是致命的。
pub fn prepare_clean_slate(
    output_root: &Path,
    log_dir: &Path,
    tool: &str,
    axis_count: usize,
) -> Result<CleanupSummary> {
    let removed_logs = find_stale_logs(log_dir, tool, axis_count)?;
    let removed_output_dir = output_root.exists();

    let mut stale: Vec<&Path> = removed_logs.iter().map(PathBuf::as_path).collect();
    if removed_output_dir {
        stale.push(output_root);
    }

    if !stale.is_empty() {
        fs_extra::remove_items(stale.as_slice()).with_context(|| {
            t!("fs.cleanup_failed", path = output_root.display()).to_string()
        })?;
    }

    fs::create_dir_all(output_root)
        .with_context(|| t!("fs.create_dir_failed", path = output_root.display()).to_string())?;
    fs::create_dir_all(log_dir)
        .with_context(|| t!("fs.create_dir_failed", path = log_dir.display()).to_string())?;

    Ok(CleanupSummary {
        removed_logs,
        removed_output_dir,
    })
}

/// Returns the last `lines` lines of a log file. Invalid UTF-8 is replaced.
pub fn read_tail(path: &Path, lines: usize) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| t!("fs.read_log_failed", path = path.display()).to_string())?;
    let content = String::from_utf8_lossy(&bytes);
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].join("\n"))
}

/// Resolves `.` and `..` components without touching the file system.
/// `..` never climbs above the root of an absolute path.
///
/// 在不访问文件系统的情况下解析 `.` 和 `..` 组件。
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path)
        .with_context(|| t!("fs.resolve_failed", path = path.display()).to_string())
}
