//! # Command Module / 命令模块
//!
//! Builds the external builder's argument vector from the configured templates
//! and runs it as a subprocess whose combined stdout/stderr is written into a
//! caller-provided sink.
//!
//! 根据配置的模板构建外部构建器的参数向量，并将其作为子进程运行，
//! 其合并的 stdout/stderr 被写入调用方提供的输出目标。

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::core::config::OUTPUT_DIR_PLACEHOLDER;
use crate::core::models::VariantCombination;
use crate::infra::t;

/// A fully substituted command line, ready to be spawned.
/// 一个完全替换后、可以直接派生的命令行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderedCommand {
    /// The command line quoted for display and for the log header.
    pub fn display(&self) -> String {
        let argv: Vec<&str> = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect();
        shlex::try_join(argv.iter().copied()).unwrap_or_else(|_| argv.join(" "))
    }

    /// Creates a `tokio::process::Command` for this command line.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Renders the build command for one combination.
///
/// The templates are expanded with `shellexpand` and split with `shlex` first;
/// placeholders are substituted per argument afterwards, so a value containing
/// spaces always stays a single argument.
///
/// # Arguments
/// * `template` - The command template; `{<axis>}` and `{output_dir}` are substituted
/// * `variant_arg` - Optional per-axis argument template using `{axis}` and `{value}`
/// * `combination` - The axis values of this build
/// * `output_dir` - The directory substituted for `{output_dir}`
///
/// 为一个组合渲染构建命令。
/// 模板先用 `shellexpand` 展开并用 `shlex` 拆分；之后逐个参数替换占位符，
/// 因此包含空格的值始终保持为单个参数。
pub fn render_command(
    template: &str,
    variant_arg: Option<&str>,
    combination: &VariantCombination,
    output_dir: &Path,
) -> Result<RenderedCommand> {
    let output_dir = output_dir.display().to_string();
    let mut vars: HashMap<&str, &str> = combination
        .values()
        .iter()
        .map(|v| (v.axis.as_str(), v.value.as_str()))
        .collect();
    vars.insert(OUTPUT_DIR_PLACEHOLDER, output_dir.as_str());

    let mut argv: Vec<String> = split_template(template)?
        .iter()
        .map(|token| fill_placeholders(token, &vars))
        .collect();

    if let Some(arg_template) = variant_arg {
        let parts = split_template(arg_template)?;
        for value in combination.values() {
            let arg_vars: HashMap<&str, &str> =
                HashMap::from([("axis", value.axis.as_str()), ("value", value.value.as_str())]);
            argv.extend(parts.iter().map(|part| fill_placeholders(part, &arg_vars)));
        }
    }

    let mut argv = argv.into_iter();
    let program = argv
        .next()
        .ok_or_else(|| anyhow!("{}", t!("command.empty_after_parsing", command = template)))?;

    Ok(RenderedCommand {
        program,
        args: argv.collect(),
    })
}

/// Expands environment references and splits a template into arguments.
fn split_template(template: &str) -> Result<Vec<String>> {
    let expanded = shellexpand::full(template)
        .with_context(|| t!("command.expand_failed", command = template).to_string())?
        .to_string();

    shlex::split(&expanded)
        .ok_or_else(|| anyhow!("{}", t!("command.parse_failed", command = expanded)))
}

/// Replaces every `{name}` whose name is a key of `vars`. Unknown braces are kept verbatim.
///
/// Substitution is a single left-to-right pass, so a substituted value is never rescanned.
pub fn fill_placeholders(token: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replacement = after
            .find('}')
            .and_then(|end| vars.get(&after[..end]).map(|value| (end, *value)));
        match replacement {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Environment variables describing the combination: `MATRIX_<AXIS>` per axis
/// plus `MATRIX_OUTPUT_DIR`.
///
/// 描述组合的环境变量：每个轴一个 `MATRIX_<AXIS>`，另加 `MATRIX_OUTPUT_DIR`。
pub fn variant_env(combination: &VariantCombination, output_dir: &Path) -> Vec<(String, String)> {
    combination
        .values()
        .iter()
        .map(|v| (format!("MATRIX_{}", env_key(&v.axis)), v.value.clone()))
        .chain(std::iter::once((
            "MATRIX_OUTPUT_DIR".to_string(),
            output_dir.display().to_string(),
        )))
        .collect()
}

fn env_key(axis: &str) -> String {
    axis.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Spawns a command and writes its stdout and stderr, line by line, into `sink`.
/// The two streams are read concurrently, so lines appear in the order they arrive.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
/// * `sink` - Where the combined output goes, e.g. an open log file.
///
/// # Returns
/// The `ExitStatus` of the process. An `Err` means the process could not be
/// launched or the sink could not be written.
///
/// 派生一个命令，并将其 stdout 和 stderr 逐行写入 `sink`。
/// 两个流被并发读取，因此各行按到达顺序出现。
pub async fn spawn_and_capture<W>(mut cmd: Command, sink: &mut W) -> io::Result<ExitStatus>
where
    W: AsyncWrite + Unpin,
{
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other(t!("command.capture_stdout_failed").to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other(t!("command.capture_stderr_failed").to_string()))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let stdout_handle = tokio::spawn(forward_lines(stdout, tx.clone()));
    let stderr_handle = tokio::spawn(forward_lines(stderr, tx));

    // Keep draining after a write error so the child never blocks on a full pipe.
    let mut write_result = Ok(());
    while let Some(line) = rx.recv().await {
        if write_result.is_ok() {
            write_result = sink.write_all(&line).await;
        }
    }

    let status = child.wait().await;

    if let Err(e) = stdout_handle.await {
        eprintln!("{}", t!("command.join_reader_failed", stream = "stdout", error = e));
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("{}", t!("command.join_reader_failed", stream = "stderr", error = e));
    }

    write_result?;
    sink.flush().await?;
    status
}

/// Reads `reader` line by line and forwards each line, newline included.
/// Output that is not valid UTF-8 is forwarded unchanged.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    while let Ok(Some(mut line)) = segments.next_segment().await {
        line.push(b'\n');
        if tx.send(line).is_err() {
            break;
        }
    }
}
