//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures shared by the build, dependency and
//! test flows: the host profile, resolved project paths, per-step outcomes and
//! the phase results that feed the final report.
//!
//! 此模块定义构建、依赖安装和测试流程共享的数据结构：
//! 宿主机信息、解析后的项目路径、每个步骤的结果以及用于最终报告的阶段结果。

use chrono::{DateTime, Local};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::config::LayoutConfig;
use crate::core::error::PipelineError;

/// Package manager family an installer routine drives.
///
/// 安装例程所使用的包管理器类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstallerKey {
    Apt,
    Yum,
    Dnf,
    Pacman,
    Brew,
}

/// Substrings of a normalized distribution identifier, checked in order.
const IDENTIFIER_ALIASES: &[(&str, InstallerKey)] = &[
    ("ubuntu", InstallerKey::Apt),
    ("debian", InstallerKey::Apt),
    ("centos", InstallerKey::Yum),
    ("red hat", InstallerKey::Yum),
    ("redhat", InstallerKey::Yum),
    ("rhel", InstallerKey::Yum),
    ("fedora", InstallerKey::Dnf),
    ("arch", InstallerKey::Pacman),
    ("macos", InstallerKey::Brew),
    ("darwin", InstallerKey::Brew),
];

impl InstallerKey {
    /// Maps a distribution identifier such as `ubuntu` or
    /// `Red Hat Enterprise Linux` to its installer.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let normalized = identifier.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        IDENTIFIER_ALIASES
            .iter()
            .find(|(alias, _)| normalized.contains(alias))
            .map(|(_, key)| *key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallerKey::Apt => "apt",
            InstallerKey::Yum => "yum",
            InstallerKey::Dnf => "dnf",
            InstallerKey::Pacman => "pacman",
            InstallerKey::Brew => "brew",
        }
    }
}

impl fmt::Display for InstallerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline knows about the machine it runs on.
/// Detected once at startup and never mutated afterwards.
///
/// 流水线对当前机器的了解。启动时检测一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfile {
    /// Platform family, e.g. `linux` or `macos` / 平台类别
    pub os_family: String,
    /// Distribution identifier, `unknown` when it could not be read / 发行版标识
    pub distribution: String,
    /// Installer derived from the identifier / 由标识推导出的安装器
    pub installer: Option<InstallerKey>,
}

impl HostProfile {
    pub fn new(os_family: impl Into<String>, distribution: impl Into<String>) -> Self {
        let distribution = distribution.into();
        let installer = InstallerKey::from_identifier(&distribution);
        Self {
            os_family: os_family.into(),
            distribution,
            installer,
        }
    }

    pub fn unknown(os_family: impl Into<String>) -> Self {
        Self::new(os_family, "unknown")
    }
}

/// Absolute locations the pipeline reads and writes, resolved once from the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub build_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub app_executable: PathBuf,
    pub test_executable: PathBuf,
    pub fixtures: Vec<PathBuf>,
}

impl BuildPaths {
    pub fn resolve(root: &Path, layout: &LayoutConfig) -> Self {
        let build_dir = root.join(&layout.build_dir);
        let bin_dir = build_dir.join(&layout.bin_dir);
        Self {
            root: root.to_path_buf(),
            manifest: root.join(&layout.manifest),
            app_executable: bin_dir.join(&layout.app_executable),
            test_executable: bin_dir.join(&layout.test_executable),
            fixtures: layout.fixtures.iter().map(|f| root.join(f)).collect(),
            build_dir,
            bin_dir,
        }
    }

    /// Build outputs expected after a successful compile.
    pub fn artifacts(&self) -> Vec<&Path> {
        vec![self.app_executable.as_path(), self.test_executable.as_path()]
    }
}

/// The outcome of a single pipeline step.
///
/// A `Fatal` outcome stops the build pipeline; a `SoftFail` is recorded and
/// execution continues with the next step.
///
/// 单个流水线步骤的结果。`Fatal` 会终止构建流水线；`SoftFail` 仅被记录，执行继续。
#[derive(Debug)]
pub enum StepOutcome {
    Ok,
    SoftFail(String),
    Fatal(PipelineError),
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StepOutcome::Ok)
    }
}

/// States of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    CheckPrereqs,
    CheckManifest,
    CreateDir,
    Configure,
    Compile,
    RunTests,
    VerifyArtifacts,
}

impl BuildStep {
    pub const ALL: [BuildStep; 7] = [
        BuildStep::CheckPrereqs,
        BuildStep::CheckManifest,
        BuildStep::CreateDir,
        BuildStep::Configure,
        BuildStep::Compile,
        BuildStep::RunTests,
        BuildStep::VerifyArtifacts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStep::CheckPrereqs => "check-prereqs",
            BuildStep::CheckManifest => "check-manifest",
            BuildStep::CreateDir => "create-dir",
            BuildStep::Configure => "configure",
            BuildStep::Compile => "compile",
            BuildStep::RunTests => "run-tests",
            BuildStep::VerifyArtifacts => "verify-artifacts",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of the build pipeline.
#[derive(Debug)]
pub enum BuildOutcome {
    /// Every fatal step succeeded. Warnings come from the soft tail.
    Done {
        bin_dir: PathBuf,
        warnings: Vec<String>,
    },
    /// A fatal step failed and the remaining steps were skipped.
    Aborted { step: BuildStep, error: PipelineError },
}

impl BuildOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, BuildOutcome::Done { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_done() { 0 } else { 1 }
    }
}

/// A selectable test phase.
///
/// 可选择的测试阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum PhaseKind {
    Unit,
    Cmake,
    Integration,
    Performance,
}

impl PhaseKind {
    /// Phases run when none are requested. `Performance` is opt-in only.
    pub const DEFAULTS: [PhaseKind; 3] = [PhaseKind::Unit, PhaseKind::Cmake, PhaseKind::Integration];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Unit => "unit",
            PhaseKind::Cmake => "cmake",
            PhaseKind::Integration => "integration",
            PhaseKind::Performance => "performance",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded outcome of one test phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseResult {
    pub phase: PhaseKind,
    pub passed: bool,
    /// Error text when the phase raised instead of returning a verdict.
    pub diagnostic: Option<String>,
}

impl PhaseResult {
    pub fn name(&self) -> &'static str {
        self.phase.as_str()
    }
}

/// Phase results in execution order plus the time the run finished.
///
/// 按执行顺序排列的阶段结果，以及运行结束的时间。
#[derive(Debug, Clone)]
pub struct TestReport {
    pub results: Vec<PhaseResult>,
    pub finished_at: DateTime<Local>,
}

impl TestReport {
    pub fn new(results: Vec<PhaseResult>) -> Self {
        Self {
            results,
            finished_at: Local::now(),
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn get(&self, phase: PhaseKind) -> Option<&PhaseResult> {
        self.results.iter().find(|r| r.phase == phase)
    }

    pub fn exit_code(&self) -> u8 {
        if self.failed() > 0 { 1 } else { 0 }
    }
}
