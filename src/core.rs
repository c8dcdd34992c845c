//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the build matrix driver,
//! including data models, configuration, planning and build execution.
//!
//! 此模块包含构建矩阵驱动程序的核心功能，
//! 包括数据模型、配置、计划和构建执行。

pub mod config;
pub mod execution;
pub mod models;
pub mod planner;

// Re-exports
pub use config::BuildMatrix;
pub use execution::run_build;
pub use models::{BuildResult, MatrixReport};
