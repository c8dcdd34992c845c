//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command of the build matrix CLI,
//! which creates a new `BuildMatrix.toml`, either from the built-in example
//! or through an interactive wizard.
//!
//! 此模块实现构建矩阵 CLI 的 `init` 命令，
//! 它通过内置示例或交互式向导创建新的 `BuildMatrix.toml`。

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::{fs, path::Path, path::PathBuf};

use crate::core::config::BuildMatrix;
use crate::core::models::VariantAxis;
use crate::infra::t;

/// The starter configuration written by `init --non-interactive`.
pub const DEFAULT_CONFIG: &str = r#"# Build Matrix Configuration / 构建矩阵配置

# Language for messages / 消息语言
language = "en"

# Name of the external tool, used as the log file prefix / 外部工具名称，用作日志文件前缀
tool = "conda-build"

# Build command. {output_dir} and {<axis>} are substituted per combination.
# 构建命令。{output_dir} 和 {<axis>} 按组合替换。
command = "conda build recipe --output-folder {output_dir}"

# Appended once per axis / 每个轴追加一次
variant_arg = "--variant {axis}={value}"

# Recreated empty at the start of every run / 每次运行开始时重新创建为空
output_dir = "build_output"

# One log per combination: <log_dir>/<tool>-<v1>-...-<vn>.log
log_dir = "."

# Keep going after a failed combination / 组合失败后继续执行
continue_on_error = true

# Combinations built at the same time (0 = one per CPU) / 同时构建的组合数（0 = 每个 CPU 一个）
jobs = 1

# Variant axes, the first one varies slowest / 变体轴，第一个变化最慢
[[axes]]
name = "python"
values = ["3.10", "3.11", "3.12"]

[[axes]]
name = "libboost"
values = ["1.84"]

[[axes]]
name = "openmm"
values = ["8.1", "8.2"]

# Combinations that are never built / 永不构建的组合
# [[exclude]]
# python = "3.12"
# openmm = "8.1"
"#;

/// Executes the init command with the provided arguments.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
/// * `non_interactive` - Write the built-in example without prompting
///
/// # Returns
/// A Result indicating success or failure of the command execution
pub fn execute(output: PathBuf, force: bool, non_interactive: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if output.exists() && !force && (non_interactive || !confirm_overwrite(&theme, &output)?) {
        println!("{}", t!("init.file_exists", path = output.display()).red());
        println!("{}", t!("init.use_force").yellow());
        return Ok(());
    }

    let content = if non_interactive {
        DEFAULT_CONFIG.to_string()
    } else {
        run_wizard(&theme)?
    };

    // Create parent directories if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(&output, content)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = output.display()).bold()
    );
    println!("{}", t!("init.next_steps"));

    Ok(())
}

fn confirm_overwrite(theme: &ColorfulTheme, output: &Path) -> Result<bool> {
    Confirm::with_theme(theme)
        .with_prompt(t!("init.overwrite_prompt", path = output.display()).to_string())
        .default(false)
        .interact()
        .with_context(|| t!("init.prompt_failed").to_string())
}

/// Asks for the tool, the command templates and the axes, and returns the serialized matrix.
fn run_wizard(theme: &ColorfulTheme) -> Result<String> {
    println!("\n{}", t!("init.wizard_welcome").bold().cyan());
    println!("{}\n", t!("init.wizard_description"));

    let mut matrix = BuildMatrix::from_toml_str(DEFAULT_CONFIG)?;
    matrix.language = rust_i18n::locale().to_string();

    matrix.tool = Input::with_theme(theme)
        .with_prompt(t!("init.tool_prompt").to_string())
        .default(matrix.tool.clone())
        .interact_text()?;
    matrix.command = Input::with_theme(theme)
        .with_prompt(t!("init.command_prompt").to_string())
        .default(matrix.command.clone())
        .interact_text()?;
    let variant_arg: String = Input::with_theme(theme)
        .with_prompt(t!("init.variant_arg_prompt").to_string())
        .default(matrix.variant_arg.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    matrix.variant_arg = Some(variant_arg).filter(|arg| !arg.trim().is_empty());

    let use_example = Confirm::with_theme(theme)
        .with_prompt(t!("init.example_axes_prompt").to_string())
        .default(true)
        .interact()?;
    if !use_example {
        matrix.axes = prompt_for_axes(theme)?;
    }

    matrix.validate()?;
    toml::to_string_pretty(&matrix).with_context(|| t!("init.serialize_failed").to_string())
}

fn prompt_for_axes(theme: &ColorfulTheme) -> Result<Vec<VariantAxis>> {
    let mut axes = Vec::new();
    loop {
        let name: String = Input::with_theme(theme)
            .with_prompt(t!("init.axis_name_prompt").to_string())
            .allow_empty(true)
            .interact_text()?;
        let name = name.trim().to_string();
        if name.is_empty() {
            break;
        }

        let values: String = Input::with_theme(theme)
            .with_prompt(t!("init.axis_values_prompt", name = &name).to_string())
            .interact_text()?;
        axes.push(VariantAxis::new(name, parse_values(&values)));
    }

    if axes.is_empty() {
        bail!("{}", t!("config.no_axes"));
    }
    Ok(axes)
}

/// Splits a comma-separated list of axis values, dropping blanks.
pub fn parse_values(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
