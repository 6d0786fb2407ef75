//! # Build Command / 构建命令
//!
//! Runs the build pipeline for the project and prints where the binaries went.

use anyhow::Result;
use colored::*;
use std::process::ExitCode;

use crate::cli::GlobalArgs;
use crate::cli::commands::Project;
use crate::core::build::BuildOrchestrator;
use crate::infra::command::SystemRunner;
use crate::infra::t;
use crate::reporting;

pub async fn execute(globals: &GlobalArgs) -> Result<ExitCode> {
    let project = Project::load(globals)?;

    println!("{}", t!("build.banner").bold());
    println!("{}", t!("build.project_root", path = project.root.display()));

    let runner = SystemRunner;
    let orchestrator = BuildOrchestrator::new(&runner, project.paths, project.config);
    let outcome = orchestrator.run().await;

    reporting::print_build_summary(&outcome, orchestrator.paths());
    Ok(ExitCode::from(outcome.exit_code()))
}
