//! # HTML Reporting Module / HTML 报告模块
//!
//! This module generates a standalone HTML report of a matrix run: summary
//! counts, and one table row per combination with its status, exit code,
//! duration and log file.
//!
//! 此模块生成矩阵运行的独立 HTML 报告：汇总计数，
//! 以及每个组合一行，包含其状态、退出码、持续时间和日志文件。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::MatrixReport;
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.25rem; }
.meta { color: #666; margin-bottom: 1.5rem; }
.summary-container { display: flex; gap: 1rem; margin-bottom: 1.5rem; }
.summary-item { border: 1px solid #ddd; border-radius: 6px; padding: 0.75rem 1.25rem; text-align: center; }
.summary-item .count { display: block; font-size: 1.6rem; font-weight: bold; }
.summary-item .label { color: #666; }
.succeeded-text { color: #1a7f37; }
.failed-text { color: #cf222e; }
.skipped-text { color: #8c959f; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #eee; padding: 0.5rem; text-align: left; }
th { background: #f6f8fa; }
.status-cell { display: inline-block; border-radius: 4px; padding: 0.1rem 0.5rem; color: #fff; }
.status-succeeded { background: #1a7f37; }
.status-failed { background: #cf222e; }
.status-skipped { background: #8c959f; }
.num { text-align: right; font-variant-numeric: tabular-nums; }
code { font-size: 0.9em; }
"#;

/// Renders the report as an HTML document.
///
/// 将报告渲染为 HTML 文档。
pub fn render_html_report(report: &MatrixReport) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", tool = &report.tool).to_string()) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", tool = &report.tool).to_string()) }
                p.meta {
                    (t!(
                        "html_report.timing",
                        started = report.started_at.format("%Y-%m-%d %H:%M:%S"),
                        finished = report.finished_at.format("%Y-%m-%d %H:%M:%S")
                    )
                    .to_string())
                }
                div.summary-container {
                    div.summary-item {
                        span.count { (report.total) }
                        span.label { (t!("html_report.summary.total").to_string()) }
                    }
                    div.summary-item {
                        span.count.succeeded-text { (report.succeeded) }
                        span.label { (t!("html_report.summary.succeeded").to_string()) }
                    }
                    div.summary-item {
                        span.count.failed-text { (report.failed) }
                        span.label { (t!("html_report.summary.failed").to_string()) }
                    }
                    div.summary-item {
                        span.count.skipped-text { (report.skipped) }
                        span.label { (t!("html_report.summary.skipped").to_string()) }
                    }
                    @if report.excluded > 0 {
                        div.summary-item {
                            span.count { (report.excluded) }
                            span.label { (t!("html_report.summary.excluded").to_string()) }
                        }
                    }
                }
                table {
                    thead {
                        tr {
                            th { "#" }
                            th { (t!("html_report.table.header.combination").to_string()) }
                            th { (t!("html_report.table.header.status").to_string()) }
                            th.num { (t!("html_report.table.header.exit_code").to_string()) }
                            th.num { (t!("html_report.table.header.duration").to_string()) }
                            th { (t!("html_report.table.header.log").to_string()) }
                        }
                    }
                    tbody {
                        @for (i, result) in report.results.iter().enumerate() {
                            tr {
                                td.num { (i + 1) }
                                td { (result.combination().label()) }
                                td {
                                    span class={ "status-cell " (result.status_class()) } { (result.status_str()) }
                                }
                                td.num {
                                    @if let Some(code) = result.exit_code() { (code) }
                                }
                                td.num {
                                    @if let Some(duration) = result.duration() {
                                        (format!("{:.2}s", duration.as_secs_f64()))
                                    }
                                }
                                td {
                                    @if let Some(log_path) = result.log_path() {
                                        code { (log_path.display().to_string()) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Writes the HTML report to `output_path`.
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 如果无法写入文件，则返回错误。
pub fn generate_html_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    let markup = render_html_report(report);
    fs::write(output_path, markup.into_string())
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())?;
    Ok(())
}
