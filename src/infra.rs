//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the pipeline,
//! including command execution, host detection, file system operations,
//! diagnostic logging and i18n support.
//!
//! 此模块为流水线提供基础设施服务，
//! 包括命令执行、宿主机检测、文件系统操作、诊断日志和国际化支持。

pub mod command;
pub mod fs;
pub mod host;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
