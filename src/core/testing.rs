//! # Test Orchestration / 测试编排
//!
//! Runs the selected test phases in order and aggregates their verdicts into
//! a [`TestReport`]. Every phase is fail-soft: a failing or erroring phase is
//! recorded and the next phase still runs.
//!
//! 按顺序运行选定的测试阶段并汇总为 [`TestReport`]。每个阶段都是软失败的：
//! 失败或出错的阶段会被记录，下一个阶段仍会运行。

use colored::*;
use tracing::debug;

use crate::core::config::CommandsConfig;
use crate::core::models::{BuildPaths, PhaseKind, PhaseResult, StepOutcome, TestReport};
use crate::core::phases::{PhaseContext, PhaseRegistry};
use crate::infra::command::CommandRunner;
use crate::infra::t;

/// Phases to run for a selection: the defaults when empty, otherwise the
/// requested phases in first-seen order with duplicates removed.
pub fn resolve_selection(selected: &[PhaseKind]) -> Vec<PhaseKind> {
    if selected.is_empty() {
        return PhaseKind::DEFAULTS.to_vec();
    }
    let mut phases = Vec::with_capacity(selected.len());
    for kind in selected {
        if !phases.contains(kind) {
            phases.push(*kind);
        }
    }
    phases
}

pub struct TestOrchestrator<'r> {
    runner: &'r dyn CommandRunner,
    paths: BuildPaths,
    commands: CommandsConfig,
    registry: PhaseRegistry,
}

impl<'r> TestOrchestrator<'r> {
    pub fn new(runner: &'r dyn CommandRunner, paths: BuildPaths, commands: CommandsConfig) -> Self {
        Self::with_registry(runner, paths, commands, PhaseRegistry::default())
    }

    pub fn with_registry(
        runner: &'r dyn CommandRunner,
        paths: BuildPaths,
        commands: CommandsConfig,
        registry: PhaseRegistry,
    ) -> Self {
        Self {
            runner,
            paths,
            commands,
            registry,
        }
    }

    /// Runs `selected` (or the default phases) and returns one result per
    /// distinct phase, in execution order.
    pub async fn run(&self, selected: &[PhaseKind], verbose: bool) -> TestReport {
        let ctx = PhaseContext {
            runner: self.runner,
            paths: &self.paths,
            commands: &self.commands,
            verbose,
        };

        let mut results = Vec::new();
        for phase in resolve_selection(selected) {
            debug!(%phase, "running test phase");
            let outcome = self.run_phase(phase, &ctx).await;
            let diagnostic = match &outcome {
                StepOutcome::SoftFail(message) if !message.is_empty() => Some(message.clone()),
                _ => None,
            };
            results.push(PhaseResult {
                phase,
                passed: outcome.is_ok(),
                diagnostic,
            });
        }

        TestReport::new(results)
    }

    async fn run_phase(&self, phase: PhaseKind, ctx: &PhaseContext<'_>) -> StepOutcome {
        let Some(handler) = self.registry.get(phase) else {
            let message = t!("test.phase_unavailable", phase = phase).to_string();
            println!("{}", message.red());
            return StepOutcome::SoftFail(message);
        };

        match handler.run(ctx).await {
            Ok(true) => StepOutcome::Ok,
            Ok(false) => StepOutcome::SoftFail(String::new()),
            Err(e) => {
                let message = format!("{e:#}");
                println!(
                    "{}",
                    t!("test.phase_error", phase = phase, error = &message).red()
                );
                StepOutcome::SoftFail(message)
            }
        }
    }
}
