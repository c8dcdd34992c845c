//! # JSON Reporting Module / JSON 报告模块
//!
//! Writes the matrix report as pretty-printed JSON for CI tooling.
//!
//! 将矩阵报告写为格式化的 JSON，供 CI 工具使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::MatrixReport;
use crate::infra::t;

/// Serializes the report to a JSON string.
pub fn render_json_report(report: &MatrixReport) -> Result<String> {
    serde_json::to_string_pretty(report).with_context(|| t!("report.serialize_failed").to_string())
}

/// Writes the JSON report to `output_path`.
pub fn write_json_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    let json = render_json_report(report)?;
    fs::write(output_path, json)
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())?;
    Ok(())
}
