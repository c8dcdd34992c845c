//! # Commands / 命令
//!
//! One module per sub-command of the `build-matrix` CLI.
//!
//! `build-matrix` CLI 的每个子命令对应一个模块。

pub mod clean;
pub mod init;
pub mod run;
