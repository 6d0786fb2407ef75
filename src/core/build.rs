//! # Build Pipeline / 构建流水线
//!
//! A linear state machine that takes a checked-out project to compiled
//! binaries:
//!
//! ```text
//! CheckPrereqs → CheckManifest → CreateDir → Configure → Compile
//!     → RunTests (optional) → VerifyArtifacts → Done
//! ```
//!
//! Every step up to and including `Compile` is fail-fast: its failure aborts
//! the pipeline and the remaining steps never run. `RunTests` and
//! `VerifyArtifacts` are fail-soft: their failures become warnings and the
//! pipeline still finishes as `Done`.
//!
//! 一个线性状态机。`Compile` 及之前的步骤失败会立即终止流水线；
//! `RunTests` 和 `VerifyArtifacts` 的失败只记为警告，流水线仍以 `Done` 结束。

use colored::*;
use tracing::debug;

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use crate::core::models::{BuildOutcome, BuildPaths, BuildStep, StepOutcome};
use crate::infra::command::{CommandRunner, Invocation};
use crate::infra::{fs, t};

/// Drives the build pipeline for one project.
pub struct BuildOrchestrator<'r> {
    runner: &'r dyn CommandRunner,
    paths: BuildPaths,
    config: PipelineConfig,
    jobs: usize,
}

impl<'r> BuildOrchestrator<'r> {
    /// Creates an orchestrator that compiles with one job per logical CPU.
    pub fn new(runner: &'r dyn CommandRunner, paths: BuildPaths, config: PipelineConfig) -> Self {
        Self {
            runner,
            paths,
            config,
            jobs: num_cpus::get(),
        }
    }

    /// Overrides the parallelism passed to the build tool.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    /// Runs every step in order until `Done` or the first fatal failure.
    pub async fn run(&self) -> BuildOutcome {
        let mut warnings = Vec::new();

        for step in BuildStep::ALL {
            if step == BuildStep::RunTests && !self.config.build.run_tests {
                debug!("test target disabled by configuration");
                continue;
            }

            debug!(%step, "entering build step");
            match self.execute(step).await {
                StepOutcome::Ok => {}
                StepOutcome::SoftFail(message) => {
                    debug!(%step, %message, "soft failure");
                    warnings.push(message);
                }
                StepOutcome::Fatal(error) => {
                    println!(
                        "\n{}",
                        t!("build.aborted", step = step, error = &error).red().bold()
                    );
                    return BuildOutcome::Aborted { step, error };
                }
            }
        }

        BuildOutcome::Done {
            bin_dir: self.paths.bin_dir.clone(),
            warnings,
        }
    }

    async fn execute(&self, step: BuildStep) -> StepOutcome {
        match step {
            BuildStep::CheckPrereqs => self.check_prereqs().await,
            BuildStep::CheckManifest => self.check_manifest(),
            BuildStep::CreateDir => self.create_build_dir(),
            BuildStep::Configure => self.configure().await,
            BuildStep::Compile => self.compile().await,
            BuildStep::RunTests => self.run_tests().await,
            BuildStep::VerifyArtifacts => self.verify_artifacts(),
        }
    }

    /// Probes every required tool and reports all missing ones at once.
    async fn check_prereqs(&self) -> StepOutcome {
        println!("{}", t!("build.checking_prereqs").cyan());

        let toolchain = &self.config.toolchain;
        let mut missing = Vec::new();

        for tool in &toolchain.required {
            let probe = Invocation::new(
                [tool.as_str(), toolchain.version_flag.as_str()],
                &self.paths.root,
            )
            .quiet();

            let found = match self.runner.run(&probe).await {
                Ok(result) => result.success,
                Err(e) => {
                    debug!(%tool, error = %e, "toolchain probe failed");
                    false
                }
            };

            if found {
                println!("{}", t!("build.tool_found", tool = tool).green());
            } else {
                println!("{}", t!("build.tool_missing", tool = tool).red());
                missing.push(tool.clone());
            }
        }

        if missing.is_empty() {
            StepOutcome::Ok
        } else {
            println!(
                "\n{}",
                t!("build.missing_tools", tools = missing.join(", ")).red()
            );
            println!("{}", t!("build.install_hint"));
            StepOutcome::Fatal(PipelineError::MissingToolchain(missing))
        }
    }

    fn check_manifest(&self) -> StepOutcome {
        if self.paths.manifest.is_file() {
            println!(
                "{}",
                t!("build.manifest_found", path = self.paths.manifest.display()).green()
            );
            StepOutcome::Ok
        } else {
            println!(
                "{}",
                t!("build.manifest_missing", path = self.paths.manifest.display()).red()
            );
            StepOutcome::Fatal(PipelineError::MissingManifest(self.paths.manifest.clone()))
        }
    }

    fn create_build_dir(&self) -> StepOutcome {
        println!(
            "{}",
            t!("build.creating_dir", path = self.paths.build_dir.display()).cyan()
        );
        match fs::ensure_dir(&self.paths.build_dir) {
            Ok(created) => {
                debug!(created, path = %self.paths.build_dir.display(), "build directory ready");
                StepOutcome::Ok
            }
            Err(e) => StepOutcome::Fatal(PipelineError::Io(e)),
        }
    }

    async fn configure(&self) -> StepOutcome {
        println!("{}", t!("build.configuring").cyan());
        let invocation =
            Invocation::new(self.config.commands.configure.clone(), &self.paths.build_dir)
                .checked();
        match self.runner.run(&invocation).await {
            Ok(_) => StepOutcome::Ok,
            Err(e) => StepOutcome::Fatal(e),
        }
    }

    async fn compile(&self) -> StepOutcome {
        println!("{}", t!("build.compiling").cyan());
        println!("{}", t!("build.using_cores", count = self.jobs));

        let mut tokens = self.config.commands.build.clone();
        tokens.push(format!("-j{}", self.jobs));
        let invocation = Invocation::new(tokens, &self.paths.build_dir).checked();

        match self.runner.run(&invocation).await {
            Ok(_) => StepOutcome::Ok,
            Err(e) => StepOutcome::Fatal(e),
        }
    }

    async fn run_tests(&self) -> StepOutcome {
        println!("{}", t!("build.running_tests").cyan());
        let invocation =
            Invocation::new(self.config.commands.test_target.clone(), &self.paths.build_dir)
                .checked();

        match self.runner.run(&invocation).await {
            Ok(_) => {
                println!("{}", t!("build.tests_passed").green());
                StepOutcome::Ok
            }
            Err(e) => {
                println!("{}", t!("build.tests_failed").yellow());
                StepOutcome::SoftFail(e.to_string())
            }
        }
    }

    fn verify_artifacts(&self) -> StepOutcome {
        println!("{}", t!("build.checking_outputs").cyan());

        let (present, missing) = fs::partition_existing(self.paths.artifacts());
        for path in &present {
            println!("{}", t!("build.artifact_created", name = file_name(path)).green());
        }
        for path in &missing {
            println!("{}", t!("build.artifact_missing", name = file_name(path)).yellow());
        }

        if missing.is_empty() {
            StepOutcome::Ok
        } else {
            let names: Vec<String> = missing.iter().map(|p| file_name(p)).collect();
            StepOutcome::SoftFail(t!("build.artifacts_missing", names = names.join(", ")).to_string())
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
