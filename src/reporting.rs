//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of matrix run reports.
//! It prints plans and colorful summaries to the console, and writes
//! standalone HTML and JSON reports, with internationalization support.
//!
//! 此模块处理矩阵运行报告的显示和导出。
//! 它在控制台打印计划和彩色摘要，并写出独立的 HTML 和 JSON 报告，支持国际化。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_plan, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
