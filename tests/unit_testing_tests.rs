//! # Test Orchestration Tests / 测试编排测试
//!
//! Phase selection, fail-soft aggregation and the behaviour of the built-in
//! phases.
//!
//! 阶段选择、软失败汇总以及内置阶段的行为。

mod common;

use anyhow::anyhow;
use common::{ScriptedRunner, create_artifacts, cxml_project, default_config, default_paths};
use cxml_pipeline::core::phases::{PhaseContext, PhaseHandler, PhaseRegistry};
use cxml_pipeline::core::testing::{TestOrchestrator, resolve_selection};
use cxml_pipeline::models::PhaseKind;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

#[derive(Clone, Copy)]
enum Verdict {
    Pass,
    Fail,
    Raise,
}

/// A phase with a fixed verdict that logs when it runs.
struct FixedPhase {
    kind: PhaseKind,
    verdict: Verdict,
    log: Rc<RefCell<Vec<PhaseKind>>>,
}

impl PhaseHandler for FixedPhase {
    fn kind(&self) -> PhaseKind {
        self.kind
    }

    fn run<'a>(&'a self, _ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, anyhow::Result<bool>> {
        async move {
            self.log.borrow_mut().push(self.kind);
            match self.verdict {
                Verdict::Pass => Ok(true),
                Verdict::Fail => Ok(false),
                Verdict::Raise => Err(anyhow!("{} exploded", self.kind)),
            }
        }
        .boxed_local()
    }
}

fn fixed_registry(
    verdicts: &[(PhaseKind, Verdict)],
) -> (PhaseRegistry, Rc<RefCell<Vec<PhaseKind>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = PhaseRegistry::empty();
    for (kind, verdict) in verdicts {
        registry.register(Box::new(FixedPhase {
            kind: *kind,
            verdict: *verdict,
            log: Rc::clone(&log),
        }));
    }
    (registry, log)
}

fn all_passing() -> (PhaseRegistry, Rc<RefCell<Vec<PhaseKind>>>) {
    fixed_registry(&[
        (PhaseKind::Unit, Verdict::Pass),
        (PhaseKind::Cmake, Verdict::Pass),
        (PhaseKind::Integration, Verdict::Pass),
        (PhaseKind::Performance, Verdict::Pass),
    ])
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[test]
    fn test_empty_selection_uses_defaults() {
        assert_eq!(
            resolve_selection(&[]),
            vec![PhaseKind::Unit, PhaseKind::Cmake, PhaseKind::Integration]
        );
    }

    #[test]
    fn test_duplicates_keep_first_seen_order() {
        assert_eq!(
            resolve_selection(&[PhaseKind::Cmake, PhaseKind::Unit, PhaseKind::Cmake]),
            vec![PhaseKind::Cmake, PhaseKind::Unit]
        );
    }

    #[tokio::test]
    async fn test_default_run_never_touches_performance() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();
        let (registry, log) = all_passing();

        let orchestrator = TestOrchestrator::with_registry(
            &runner,
            default_paths(project.path()),
            default_config().commands,
            registry,
        );
        let report = orchestrator.run(&[], false).await;

        assert_eq!(
            *log.borrow(),
            vec![PhaseKind::Unit, PhaseKind::Cmake, PhaseKind::Integration]
        );
        assert_eq!(report.total(), 3);
        assert!(report.get(PhaseKind::Performance).is_none());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_performance_runs_when_requested() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();
        let (registry, log) = all_passing();

        let orchestrator = TestOrchestrator::with_registry(
            &runner,
            default_paths(project.path()),
            default_config().commands,
            registry,
        );
        let report = orchestrator.run(&[PhaseKind::Performance], false).await;

        assert_eq!(*log.borrow(), vec![PhaseKind::Performance]);
        assert_eq!(report.passed(), 1);
    }
}

#[cfg(test)]
mod aggregation_tests {
    use super::*;

    #[tokio::test]
    async fn test_failures_and_errors_do_not_stop_the_run() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();
        let (registry, log) = fixed_registry(&[
            (PhaseKind::Unit, Verdict::Raise),
            (PhaseKind::Cmake, Verdict::Fail),
            (PhaseKind::Integration, Verdict::Pass),
        ]);

        let orchestrator = TestOrchestrator::with_registry(
            &runner,
            default_paths(project.path()),
            default_config().commands,
            registry,
        );
        let report = orchestrator.run(&[], false).await;

        assert_eq!(log.borrow().len(), 3);
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.exit_code(), 1);

        let unit = report.get(PhaseKind::Unit).unwrap();
        assert!(!unit.passed);
        assert!(unit.diagnostic.as_deref().unwrap().contains("unit exploded"));

        let cmake = report.get(PhaseKind::Cmake).unwrap();
        assert!(!cmake.passed);
        assert!(cmake.diagnostic.is_none());
    }

    #[tokio::test]
    async fn test_results_follow_execution_order() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();
        let (registry, _log) = all_passing();

        let orchestrator = TestOrchestrator::with_registry(
            &runner,
            default_paths(project.path()),
            default_config().commands,
            registry,
        );
        let report = orchestrator
            .run(&[PhaseKind::Integration, PhaseKind::Unit], false)
            .await;

        let names: Vec<&str> = report.results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["integration", "unit"]);
    }

    #[tokio::test]
    async fn test_unregistered_phase_is_a_failure() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();
        let (registry, _log) = fixed_registry(&[(PhaseKind::Unit, Verdict::Pass)]);

        let orchestrator = TestOrchestrator::with_registry(
            &runner,
            default_paths(project.path()),
            default_config().commands,
            registry,
        );
        let report = orchestrator
            .run(&[PhaseKind::Cmake, PhaseKind::Unit], false)
            .await;

        assert!(!report.get(PhaseKind::Cmake).unwrap().passed);
        assert!(report.get(PhaseKind::Unit).unwrap().passed);
    }
}

#[cfg(test)]
mod builtin_phase_tests {
    use super::*;

    #[tokio::test]
    async fn test_unit_without_executable_fails_without_running_anything() {
        let project = cxml_project();
        let runner = ScriptedRunner::new();

        let orchestrator = TestOrchestrator::new(
            &runner,
            default_paths(project.path()),
            default_config().commands,
        );
        let report = orchestrator.run(&[PhaseKind::Unit], false).await;

        assert_eq!(report.total(), 1);
        assert_eq!(report.passed(), 0);
        assert_eq!(report.exit_code(), 1);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unit_runs_executable_in_build_dir_with_verbose_flag() {
        let project = cxml_project();
        let root = project.path();
        create_artifacts(root);
        let runner = ScriptedRunner::new();
        let paths = default_paths(root);
        let executable = paths.test_executable.to_string_lossy().into_owned();

        let orchestrator = TestOrchestrator::new(&runner, paths, default_config().commands);
        let report = orchestrator.run(&[PhaseKind::Unit], true).await;

        assert!(report.get(PhaseKind::Unit).unwrap().passed);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tokens, vec![executable, "--gtest_verbose".to_string()]);
        assert_eq!(calls[0].cwd, root.join("build"));
    }

    #[tokio::test]
    async fn test_unit_without_verbose_passes_no_flag() {
        let project = cxml_project();
        create_artifacts(project.path());
        let runner = ScriptedRunner::new();

        let orchestrator = TestOrchestrator::new(
            &runner,
            default_paths(project.path()),
            default_config().commands,
        );
        orchestrator.run(&[PhaseKind::Unit], false).await;

        assert_eq!(runner.calls()[0].tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_unit_nonzero_exit_is_a_plain_failure() {
        let project = cxml_project();
        create_artifacts(project.path());
        let paths = default_paths(project.path());
        let executable = paths.test_executable.to_string_lossy().into_owned();
        let runner = ScriptedRunner::new().failing(&[executable.as_str()], 1);

        let orchestrator = TestOrchestrator::new(&runner, paths, default_config().commands);
        let report = orchestrator.run(&[PhaseKind::Unit], false).await;

        let unit = report.get(PhaseKind::Unit).unwrap();
        assert!(!unit.passed);
        assert!(unit.diagnostic.is_none());
    }

    #[tokio::test]
    async fn test_unit_launch_error_is_recorded_with_diagnostic() {
        let project = cxml_project();
        create_artifacts(project.path());
        let paths = default_paths(project.path());
        let executable = paths.test_executable.to_string_lossy().into_owned();
        let runner = ScriptedRunner::new().missing(&executable);

        let orchestrator = TestOrchestrator::new(&runner, paths, default_config().commands);
        let report = orchestrator
            .run(&[PhaseKind::Unit, PhaseKind::Integration], false)
            .await;

        let unit = report.get(PhaseKind::Unit).unwrap();
        assert!(!unit.passed);
        assert!(unit.diagnostic.as_deref().unwrap().contains("failed to launch"));
        assert!(report.get(PhaseKind::Integration).unwrap().passed);
    }

    #[tokio::test]
    async fn test_cmake_runs_test_target_in_build_dir() {
        let project = cxml_project();
        let root = project.path();
        let runner = ScriptedRunner::new();

        let orchestrator =
            TestOrchestrator::new(&runner, default_paths(root), default_config().commands);
        let report = orchestrator.run(&[PhaseKind::Cmake], false).await;

        assert!(report.get(PhaseKind::Cmake).unwrap().passed);
        assert_eq!(runner.command_lines(), vec!["make test"]);
        assert_eq!(runner.calls()[0].cwd, root.join("build"));
    }

    #[tokio::test]
    async fn test_cmake_failure_is_recorded() {
        let project = cxml_project();
        let runner = ScriptedRunner::new().failing(&["make", "test"], 2);

        let orchestrator = TestOrchestrator::new(
            &runner,
            default_paths(project.path()),
            default_config().commands,
        );
        let report = orchestrator.run(&[PhaseKind::Cmake], false).await;

        assert!(!report.get(PhaseKind::Cmake).unwrap().passed);
    }

    #[tokio::test]
    async fn test_integration_passes_even_without_fixtures() {
        let project = cxml_project();
        fs::remove_dir_all(project.path().join("examples")).unwrap();
        let runner = ScriptedRunner::new();

        let orchestrator = TestOrchestrator::new(
            &runner,
            default_paths(project.path()),
            default_config().commands,
        );
        let report = orchestrator.run(&[PhaseKind::Integration], false).await;

        assert!(report.get(PhaseKind::Integration).unwrap().passed);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_performance_phase_passes_and_cleans_its_scratch_file() {
        let project = cxml_project();
        let root = project.path();
        create_artifacts(root);
        let runner = ScriptedRunner::new();

        let orchestrator =
            TestOrchestrator::new(&runner, default_paths(root), default_config().commands);
        let report = orchestrator.run(&[PhaseKind::Performance], false).await;

        let performance = report.get(PhaseKind::Performance).unwrap();
        assert!(performance.passed, "{:?}", performance.diagnostic);
        assert_eq!(report.exit_code(), 0);
        assert!(runner.calls().is_empty());

        let leftovers: Vec<_> = fs::read_dir(root.join("build"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("cxml_large_sample_"))
            .collect();
        assert!(leftovers.is_empty(), "left behind: {leftovers:?}");
    }
}
