//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the Cxml pipeline,
//! including data models, configuration, the build state machine,
//! dependency installation and test orchestration.
//!
//! 此模块包含 Cxml 流水线的核心功能，
//! 包括数据模型、配置、构建状态机、依赖安装和测试编排。

pub mod build;
pub mod config;
pub mod deps;
pub mod error;
pub mod models;
pub mod performance;
pub mod phases;
pub mod testing;

// Re-exports
pub use build::BuildOrchestrator;
pub use config::PipelineConfig;
pub use deps::DependencyResolver;
pub use error::{PipelineError, Result};
pub use testing::TestOrchestrator;
