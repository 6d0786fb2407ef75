//! # Deps Command / 依赖命令
//!
//! Installs the project's build dependencies with the host's package manager.

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::cli::GlobalArgs;
use crate::cli::commands::resolve_root;
use crate::core::deps::{DependencyResolver, privilege_guard};
use crate::core::error::PipelineError;
use crate::core::models::HostProfile;
use crate::infra::command::{CommandRunner, SystemRunner};
use crate::infra::{host, t};
use crate::reporting;

pub async fn execute(globals: &GlobalArgs) -> Result<ExitCode> {
    let cwd = working_dir(globals)?;

    println!("{}", t!("deps.banner").bold());
    let profile = host::current();
    println!(
        "{}",
        t!(
            "deps.detected_os",
            os = &profile.os_family,
            distribution = &profile.distribution
        )
    );

    let runner = SystemRunner;
    // Without a terminal the prompt cannot be answered, which counts as "no".
    let code = install(profile, &runner, &cwd, host::is_elevated(), || {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("deps.confirm_prompt").to_string())
            .default(false)
            .interact()
            .unwrap_or(false)
    })
    .await;
    Ok(ExitCode::from(code))
}

/// Directory the package-manager commands run in.
///
/// Falls back to the current directory when `--project-dir` does not resolve,
/// since installing packages does not depend on the project tree.
pub fn working_dir(globals: &GlobalArgs) -> Result<PathBuf> {
    match resolve_root(globals) {
        Ok(root) => Ok(root),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "project directory unavailable, installing from the current directory");
            env::current_dir().context("Failed to read the current directory")
        }
    }
}

/// Runs the root guard and the installer for `profile`, returning the process
/// exit code.
///
/// 0 on success or when the operator declines, 1 when the host is unsupported
/// or an install command fails. Both failures print the manual package list.
pub async fn install<F>(
    profile: &HostProfile,
    runner: &dyn CommandRunner,
    cwd: &Path,
    elevated: bool,
    confirm: F,
) -> u8
where
    F: FnOnce() -> bool,
{
    if !privilege_guard(elevated, confirm) {
        println!("{}", t!("deps.cancelled").yellow());
        return 0;
    }

    let resolver = DependencyResolver::new(runner, cwd);
    match resolver.install_for(profile).await {
        Ok(_) => {
            println!("\n{}", t!("deps.success").green().bold());
            println!("{}", t!("deps.next_step"));
            0
        }
        Err(PipelineError::UnsupportedPlatform(distribution)) => {
            println!(
                "{}",
                t!("deps.unsupported", distribution = &distribution).red()
            );
            reporting::print_manual_packages();
            1
        }
        Err(e) => {
            println!("{}", t!("deps.failed", error = &e).red());
            reporting::print_manual_packages();
            1
        }
    }
}
