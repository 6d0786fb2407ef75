//! # Test Phases / 测试阶段
//!
//! One [`PhaseHandler`] per [`PhaseKind`], looked up through a
//! [`PhaseRegistry`]. A handler answers with `Ok(true)` or `Ok(false)`; an
//! `Err` means the phase itself broke and is recorded as a failure by the
//! orchestrator.
//!
//! 每个 [`PhaseKind`] 对应一个 [`PhaseHandler`]，通过 [`PhaseRegistry`] 查找。

use anyhow::Result;
use colored::*;
use futures::future::{FutureExt, LocalBoxFuture};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use crate::core::config::CommandsConfig;
use crate::core::error::PipelineError;
use crate::core::models::{BuildPaths, PhaseKind};
use crate::core::performance::{self, OPERATION_BUDGET, SYNTHETIC_FUNCTION_COUNT, TIMED_OPERATIONS};
use crate::infra::command::{CommandRunner, Invocation};
use crate::infra::t;

/// Everything a phase may use while it runs.
pub struct PhaseContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub paths: &'a BuildPaths,
    pub commands: &'a CommandsConfig,
    pub verbose: bool,
}

/// A runnable test phase.
pub trait PhaseHandler {
    fn kind(&self) -> PhaseKind;

    fn run<'a>(&'a self, ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, Result<bool>>;
}

/// Phase handlers by kind.
pub struct PhaseRegistry {
    handlers: BTreeMap<PhaseKind, Box<dyn PhaseHandler>>,
}

impl PhaseRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers `handler`, replacing any previous one for the same kind.
    pub fn register(&mut self, handler: Box<dyn PhaseHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn get(&self, kind: PhaseKind) -> Option<&dyn PhaseHandler> {
        self.handlers.get(&kind).map(|b| b.as_ref())
    }
}

impl Default for PhaseRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(UnitPhase));
        registry.register(Box::new(CmakePhase));
        registry.register(Box::new(IntegrationPhase));
        registry.register(Box::new(PerformancePhase));
        registry
    }
}

/// Runs the prebuilt test executable.
pub struct UnitPhase;

impl PhaseHandler for UnitPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Unit
    }

    fn run<'a>(&'a self, ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            println!("{}", t!("test.unit.running").cyan());

            let executable = &ctx.paths.test_executable;
            if !executable.is_file() {
                println!(
                    "{}",
                    t!("test.unit.executable_missing", path = executable.display()).red()
                );
                println!("{}", t!("test.unit.build_hint"));
                return Ok(false);
            }

            let mut tokens = vec![executable.to_string_lossy().into_owned()];
            if ctx.verbose {
                tokens.push(ctx.commands.unit_verbose_flag.clone());
            }

            let invocation = Invocation::new(tokens, &ctx.paths.build_dir).checked();
            passed_unless_command_failed(
                ctx.runner.run(&invocation).await,
                &t!("test.unit.passed"),
                &t!("test.unit.failed"),
            )
        }
        .boxed_local()
    }
}

/// Runs the build tool's test target.
pub struct CmakePhase;

impl PhaseHandler for CmakePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Cmake
    }

    fn run<'a>(&'a self, ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            println!("{}", t!("test.cmake.running").cyan());
            let invocation =
                Invocation::new(ctx.commands.test_target.clone(), &ctx.paths.build_dir).checked();
            passed_unless_command_failed(
                ctx.runner.run(&invocation).await,
                &t!("test.cmake.passed"),
                &t!("test.cmake.failed"),
            )
        }
        .boxed_local()
    }
}

/// A nonzero exit is a failed phase; anything else that went wrong is an error.
fn passed_unless_command_failed<T>(
    result: std::result::Result<T, PipelineError>,
    passed: &str,
    failed: &str,
) -> Result<bool> {
    match result {
        Ok(_) => {
            println!("{}", passed.green());
            Ok(true)
        }
        Err(PipelineError::ExternalCommand { .. }) => {
            println!("{}", failed.red());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks that the XML fixtures are present.
///
/// Fixture contents are not parsed yet; a missing fixture is only a warning.
pub struct IntegrationPhase;

impl PhaseHandler for IntegrationPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Integration
    }

    fn run<'a>(&'a self, ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            println!("{}", t!("test.integration.running").cyan());

            for fixture in &ctx.paths.fixtures {
                let name = display_name(fixture);
                if fixture.is_file() {
                    println!("{}", t!("test.integration.testing_with", name = &name));
                    println!("{}", t!("test.integration.fixture_ok", name = &name).green());
                } else {
                    println!(
                        "{}",
                        t!("test.integration.fixture_missing", name = &name).yellow()
                    );
                }
            }

            Ok(true)
        }
        .boxed_local()
    }
}

/// Runs the three synthetic performance probes. Each probe is independent:
/// one failing does not stop the others.
pub struct PerformancePhase;

impl PhaseHandler for PerformancePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Performance
    }

    fn run<'a>(&'a self, ctx: &'a PhaseContext<'a>) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            println!("{}", t!("test.performance.running").cyan());

            let scratch = if ctx.paths.build_dir.is_dir() {
                ctx.paths.build_dir.clone()
            } else {
                env::temp_dir()
            };

            let large_file = match performance::large_file_probe(
                &scratch,
                SYNTHETIC_FUNCTION_COUNT,
                performance::stand_in_parse,
            ) {
                Ok(report) => {
                    println!(
                        "{}",
                        t!(
                            "test.performance.large_file",
                            bytes = report.bytes,
                            elapsed = format!("{:.2?}", report.elapsed),
                            throughput = format!("{:.1}", report.throughput_kib_per_sec)
                        )
                    );
                    report.passed
                }
                Err(e) => {
                    println!(
                        "{}",
                        t!(
                            "test.performance.probe_error",
                            probe = "large-file",
                            error = format!("{e:#}")
                        )
                        .red()
                    );
                    false
                }
            };

            let memory = performance::memory_probe(performance::CORPUS_SIZE);
            match memory.delta() {
                Some(delta) => println!(
                    "{}",
                    t!(
                        "test.performance.memory",
                        count = memory.corpus_len,
                        delta = delta / 1024
                    )
                ),
                None => println!("{}", t!("test.performance.memory_unavailable").yellow()),
            }

            let timing = performance::timing_probe(&TIMED_OPERATIONS, OPERATION_BUDGET).await;
            for (name, elapsed) in &timing.samples {
                println!("  - {:<24} {:>10}", name, format!("{:.2?}", elapsed));
            }
            println!(
                "{}",
                t!(
                    "test.performance.timing",
                    total = format!("{:.2?}", timing.total),
                    limit = format!("{:.2?}", timing.limit)
                )
            );

            let passed = large_file && memory.passed && timing.passed;
            if passed {
                println!("{}", t!("test.performance.passed").green());
            } else {
                println!("{}", t!("test.performance.failed").red());
            }
            Ok(passed)
        }
        .boxed_local()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
