//! # Pipeline Errors / 流水线错误
//!
//! The error taxonomy shared by the build, dependency and test flows.
//! Which of these abort a flow and which are downgraded to warnings is decided
//! by the orchestrators, not here.
//!
//! 构建、依赖安装和测试流程共享的错误分类。

use std::io;
use std::path::PathBuf;

/// Errors raised by the orchestration pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// One or more required toolchain executables could not be probed.
    #[error("missing required tools: {}", .0.join(", "))]
    MissingToolchain(Vec<String>),

    /// The build manifest is absent from the project root.
    #[error("build manifest not found at {}", .0.display())]
    MissingManifest(PathBuf),

    /// A child process exited with a nonzero status while running checked.
    #[error("command `{command}` failed with exit code {}: {stderr}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ExternalCommand {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// No installer is registered for the detected host.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The process could not be launched at all.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("refusing to run an empty command")]
    EmptyCommand,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
