//! # Configuration Module / 配置模块
//!
//! This module defines the `BuildMatrix` configuration loaded from
//! `BuildMatrix.toml`: the ordered variant axes, the external build command
//! template, and the output/log layout of a matrix run.
//!
//! 此模块定义从 `BuildMatrix.toml` 加载的 `BuildMatrix` 配置：
//! 有序的变体轴、外部构建命令模板以及矩阵运行的输出/日志布局。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::VariantAxis;
use crate::infra::t;

/// Placeholder that is always substituted with the combination's output directory.
/// Axes may not use this name.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "output_dir";

/// Represents the entire build matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个构建矩阵配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildMatrix {
    /// The language for the driver's output messages (e.g., "en", "zh-CN").
    /// 驱动程序输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Name of the external tool. Used as the prefix of every log file name.
    /// 外部工具的名称，用作每个日志文件名的前缀。
    #[serde(default = "default_tool")]
    pub tool: String,

    /// The build command template. `{<axis>}` and `{output_dir}` are substituted
    /// per combination after the template has been split into arguments.
    /// 构建命令模板。模板被拆分为参数后，按组合替换 `{<axis>}` 和 `{output_dir}`。
    pub command: String,

    /// Optional argument template appended once per axis, with `{axis}` and
    /// `{value}` substituted (e.g. `--variant {axis}={value}`).
    /// 每个轴追加一次的可选参数模板，替换 `{axis}` 和 `{value}`。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_arg: Option<String>,

    /// Directory the builder installs artifacts into. Deleted and recreated at the start of each run.
    /// 构建器安装产物的目录。每次运行开始时删除并重新创建。
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory that receives one log file per combination.
    /// 接收每个组合一个日志文件的目录。
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Keep going after a failed combination. When `false`, the first failure
    /// skips every combination that has not started yet.
    /// 组合失败后继续执行。为 `false` 时，第一次失败会跳过所有尚未开始的组合。
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,

    /// Give every combination its own subdirectory of `output_dir`.
    /// Always on when more than one job runs at a time.
    /// 为每个组合在 `output_dir` 下分配独立子目录。并行作业数大于 1 时始终启用。
    #[serde(default)]
    pub isolate_outputs: bool,

    /// Maximum number of combinations built concurrently. `0` means one per CPU.
    /// 并发构建的最大组合数。`0` 表示每个 CPU 一个。
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Extra environment variables passed to the builder.
    /// 传递给构建器的额外环境变量。
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// The ordered variant axes. The first axis varies slowest.
    /// 有序的变体轴。第一个轴变化最慢。
    pub axes: Vec<VariantAxis>,

    /// Partial assignments; a combination matching every entry of one of them is not built.
    /// 部分赋值；与其中任一条目的所有键值都匹配的组合不会被构建。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<BTreeMap<String, String>>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tool() -> String {
    "build".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build_output")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_continue_on_error() -> bool {
    true
}

fn default_jobs() -> usize {
    1
}

impl BuildMatrix {
    /// Parses a matrix from TOML text and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let matrix: BuildMatrix = toml::from_str(content)?;
        matrix.validate()?;
        Ok(matrix)
    }

    /// Checks the invariants a run relies on. Every violation is a fatal
    /// configuration error, including an axis without values.
    ///
    /// 检查运行所依赖的不变量。每个违规都是致命的配置错误。
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            bail!("{}", t!("config.empty_tool"));
        }
        if self.command.trim().is_empty() {
            bail!("{}", t!("config.empty_command"));
        }
        if self.axes.is_empty() {
            bail!("{}", t!("config.no_axes"));
        }

        let mut names = HashSet::new();
        for axis in &self.axes {
            if axis.name.trim().is_empty() {
                bail!("{}", t!("config.empty_axis_name"));
            }
            if axis.name == OUTPUT_DIR_PLACEHOLDER {
                bail!("{}", t!("config.reserved_axis_name", name = &axis.name));
            }
            if !names.insert(axis.name.as_str()) {
                bail!("{}", t!("config.duplicate_axis", name = &axis.name));
            }
            if axis.values.is_empty() {
                bail!("{}", t!("config.empty_axis", name = &axis.name));
            }
            let mut seen = HashSet::new();
            for value in &axis.values {
                if !seen.insert(value.as_str()) {
                    bail!("{}", t!("config.duplicate_value", name = &axis.name, value = value));
                }
            }
        }

        for entry in &self.exclude {
            if entry.is_empty() {
                bail!("{}", t!("config.empty_exclude"));
            }
            for (name, value) in entry {
                let axis = self
                    .axes
                    .iter()
                    .find(|a| &a.name == name)
                    .ok_or_else(|| anyhow::anyhow!("{}", t!("config.exclude_unknown_axis", name = name)))?;
                if !axis.values.iter().any(|v| v == value) {
                    bail!("{}", t!("config.exclude_unknown_value", name = name, value = value));
                }
            }
        }

        Ok(())
    }

    /// The number of jobs to run concurrently, resolving `0` to the CPU count.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }
}

/// Reads, parses and validates a `BuildMatrix` file.
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// # Returns
/// The validated `BuildMatrix`
pub fn load_build_matrix(path: &Path) -> Result<BuildMatrix> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let matrix: BuildMatrix =
        toml::from_str(&content).with_context(|| t!("config.parse_failed", path = path.display()).to_string())?;
    matrix.validate()?;
    Ok(matrix)
}
