//! # Dependency Installation / 依赖安装
//!
//! Maps the detected host to a package-manager installer and runs its
//! commands. Each installer is a registered [`Installer`] keyed by
//! [`InstallerKey`]; hosts without one are reported as unsupported together
//! with a list of packages to install by hand.
//!
//! 将检测到的宿主机映射到包管理器安装器并执行其命令。
//! 没有对应安装器的宿主机会被报告为不支持，并给出需要手动安装的软件包列表。

use colored::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::{PipelineError, Result};
use crate::core::models::{HostProfile, InstallerKey};
use crate::infra::command::{CommandRunner, Invocation};
use crate::infra::t;

/// Packages to install by hand on hosts without a registered installer.
pub const MANUAL_PACKAGES: [&str; 4] = [
    "build-essential (or equivalent)",
    "cmake (3.16+)",
    "qt5-default or qt5-devel",
    "libgtest-dev or gtest-devel",
];

/// A package-manager specific installation routine.
pub trait Installer {
    fn key(&self) -> InstallerKey;

    /// Human-readable platform name, e.g. "Ubuntu/Debian".
    fn label(&self) -> &'static str;

    /// Commands to run in order. Each must succeed.
    fn commands(&self) -> Vec<Vec<String>>;
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

pub struct AptInstaller;

impl Installer for AptInstaller {
    fn key(&self) -> InstallerKey {
        InstallerKey::Apt
    }

    fn label(&self) -> &'static str {
        "Ubuntu/Debian"
    }

    fn commands(&self) -> Vec<Vec<String>> {
        vec![
            owned(&["sudo", "apt", "update"]),
            owned(&[
                "sudo",
                "apt",
                "install",
                "-y",
                "build-essential",
                "cmake",
                "qt5-default",
                "libgtest-dev",
            ]),
        ]
    }
}

pub struct YumInstaller;

impl Installer for YumInstaller {
    fn key(&self) -> InstallerKey {
        InstallerKey::Yum
    }

    fn label(&self) -> &'static str {
        "CentOS/RHEL"
    }

    fn commands(&self) -> Vec<Vec<String>> {
        vec![owned(&[
            "sudo", "yum", "install", "-y", "gcc-c++", "cmake", "qt5-devel", "gtest-devel",
        ])]
    }
}

pub struct DnfInstaller;

impl Installer for DnfInstaller {
    fn key(&self) -> InstallerKey {
        InstallerKey::Dnf
    }

    fn label(&self) -> &'static str {
        "Fedora"
    }

    fn commands(&self) -> Vec<Vec<String>> {
        vec![owned(&[
            "sudo", "dnf", "install", "-y", "gcc-c++", "cmake", "qt5-devel", "gtest-devel",
        ])]
    }
}

pub struct PacmanInstaller;

impl Installer for PacmanInstaller {
    fn key(&self) -> InstallerKey {
        InstallerKey::Pacman
    }

    fn label(&self) -> &'static str {
        "Arch Linux"
    }

    fn commands(&self) -> Vec<Vec<String>> {
        vec![owned(&[
            "sudo", "pacman", "-S", "--needed", "base-devel", "cmake", "qt5-base", "gtest",
        ])]
    }
}

pub struct HomebrewInstaller;

impl Installer for HomebrewInstaller {
    fn key(&self) -> InstallerKey {
        InstallerKey::Brew
    }

    fn label(&self) -> &'static str {
        "macOS"
    }

    fn commands(&self) -> Vec<Vec<String>> {
        vec![owned(&["brew", "install", "cmake", "qt5", "gtest"])]
    }
}

/// Installers by key.
pub struct InstallerRegistry {
    installers: BTreeMap<InstallerKey, Box<dyn Installer>>,
}

impl InstallerRegistry {
    pub fn empty() -> Self {
        Self {
            installers: BTreeMap::new(),
        }
    }

    /// Registers `installer`, replacing any previous one with the same key.
    pub fn register(&mut self, installer: Box<dyn Installer>) {
        self.installers.insert(installer.key(), installer);
    }

    pub fn get(&self, key: InstallerKey) -> Option<&dyn Installer> {
        self.installers.get(&key).map(|b| b.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = InstallerKey> + '_ {
        self.installers.keys().copied()
    }
}

impl Default for InstallerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AptInstaller));
        registry.register(Box::new(YumInstaller));
        registry.register(Box::new(DnfInstaller));
        registry.register(Box::new(PacmanInstaller));
        registry.register(Box::new(HomebrewInstaller));
        registry
    }
}

/// Installs the build dependencies for a host.
pub struct DependencyResolver<'r> {
    runner: &'r dyn CommandRunner,
    registry: InstallerRegistry,
    cwd: PathBuf,
}

impl<'r> DependencyResolver<'r> {
    pub fn new(runner: &'r dyn CommandRunner, cwd: &Path) -> Self {
        Self::with_registry(runner, InstallerRegistry::default(), cwd)
    }

    pub fn with_registry(
        runner: &'r dyn CommandRunner,
        registry: InstallerRegistry,
        cwd: &Path,
    ) -> Self {
        Self {
            runner,
            registry,
            cwd: cwd.to_path_buf(),
        }
    }

    /// Runs the installer registered for `profile`.
    ///
    /// # Errors
    /// [`PipelineError::UnsupportedPlatform`] when no installer matches, or the
    /// first [`PipelineError::ExternalCommand`] raised by an install command.
    pub async fn install_for(&self, profile: &HostProfile) -> Result<InstallerKey> {
        let installer = profile
            .installer
            .and_then(|key| self.registry.get(key))
            .ok_or_else(|| PipelineError::UnsupportedPlatform(profile.distribution.clone()))?;

        debug!(installer = %installer.key(), distribution = %profile.distribution, "dispatching installer");
        println!(
            "{}",
            t!("deps.installing_for", platform = installer.label()).blue()
        );

        for tokens in installer.commands() {
            let invocation = Invocation::new(tokens, &self.cwd).checked();
            self.runner.run(&invocation).await?;
        }

        Ok(installer.key())
    }
}

/// Guards installation when running as superuser.
///
/// Not elevated: proceeds without asking. Elevated: prints a warning and
/// proceeds only if `confirm` answers yes.
pub fn privilege_guard<F>(elevated: bool, confirm: F) -> bool
where
    F: FnOnce() -> bool,
{
    if !elevated {
        return true;
    }
    println!("{}", t!("deps.root_warning").yellow());
    confirm()
}
