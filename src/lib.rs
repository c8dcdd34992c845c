//! # Build Matrix Library / Build Matrix 库
//!
//! This library provides the core functionality of the `build-matrix` tool,
//! a configuration-driven driver that runs an external build command once for
//! every combination of a set of variant axes.
//!
//! 此库为 `build-matrix` 工具提供核心功能，
//! 这是一个配置驱动的驱动程序，为一组变体轴的每个组合运行一次外部构建命令。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, data models, planning and the build invocation
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、数据模型、计划和构建调用
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;
pub use crate::core::planner;

/// Resolves a requested locale against the bundled translations.
///
/// The full locale (e.g. "zh-CN") is tried first, then its language part
/// (e.g. "en" from "en-US"), and finally the fallback language "en".
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&requested) {
        return requested.to_string();
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

/// Sets the locale of every following message, resolving it with [`resolve_locale`].
pub fn set_language(requested: &str) {
    rust_i18n::set_locale(&resolve_locale(requested));
}

/// Initializes the application's internationalization (i18n) based on the system locale.
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
