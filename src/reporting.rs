//! # Reporting Module / 报告模块
//!
//! This module prints the colored, localized summaries shown at the end of
//! each pipeline command.
//!
//! 此模块打印每个流水线命令结束时显示的彩色本地化摘要。

pub mod console;

// Re-export common reporting functions
pub use console::{print_build_summary, print_manual_packages, print_test_report};
