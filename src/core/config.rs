//! # Pipeline Configuration / 流水线配置
//!
//! `Pipeline.toml` describes the project being orchestrated: which tools must be
//! present, where the build puts its outputs, and which external commands
//! configure, compile and test it. Every field has a default, so the file is
//! optional and may be partial.
//!
//! `Pipeline.toml` 描述被编排的项目。所有字段都有默认值，因此该文件是可选的，也可以只写一部分。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// File name looked up in the project root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "Pipeline.toml";

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language for operator messages (e.g. "en", "zh-CN"). `--lang` wins.
    /// 输出消息的语言（例如 "en", "zh-CN"）。`--lang` 优先。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub toolchain: ToolchainConfig,
    pub layout: LayoutConfig,
    pub commands: CommandsConfig,
    pub build: BuildConfig,
}

/// Executables probed before anything is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub required: Vec<String>,
    /// Argument used to probe each tool / 用于探测工具的参数
    pub version_flag: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            required: vec!["cmake".into(), "make".into(), "g++".into()],
            version_flag: "--version".into(),
        }
    }
}

/// Project layout, relative to the project root.
///
/// 项目布局，相对于项目根目录。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub manifest: PathBuf,
    pub build_dir: PathBuf,
    /// Relative to `build_dir` / 相对于 `build_dir`
    pub bin_dir: PathBuf,
    pub app_executable: String,
    pub test_executable: String,
    pub fixtures: Vec<PathBuf>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("CMakeLists.txt"),
            build_dir: PathBuf::from("build"),
            bin_dir: PathBuf::from("bin"),
            app_executable: "Cxml".into(),
            test_executable: "Cxml_tests".into(),
            fixtures: vec![
                PathBuf::from("examples/simple.xml"),
                PathBuf::from("examples/sample.xml"),
            ],
        }
    }
}

/// External commands. They always run inside the build directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub configure: Vec<String>,
    /// `-j<N>` is appended at run time / 运行时追加 `-j<N>`
    pub build: Vec<String>,
    pub test_target: Vec<String>,
    pub unit_verbose_flag: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            configure: vec!["cmake".into(), "..".into()],
            build: vec!["make".into()],
            test_target: vec!["make".into(), "test".into()],
            unit_verbose_flag: "--gtest_verbose".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Run the test target after compiling / 编译后运行测试目标
    pub run_tests: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { run_tests: true }
    }
}

impl PipelineConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
        toml::from_str(&content)
            .with_context(|| t!("config.parse_failed", path = path.display()).to_string())
    }

    /// Finds the configuration for a project.
    ///
    /// An explicit path must exist. Without one, `Pipeline.toml` in the project
    /// root is used when present, otherwise the built-in defaults.
    ///
    /// # Returns
    /// The configuration and the file it came from, if any.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Ok((Self::load(&candidate)?, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context(t!("config.serialize_failed").to_string())
    }
}
