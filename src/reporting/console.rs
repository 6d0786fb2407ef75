//! # Console Reporting Module / 控制台报告模块
//!
//! Colored end-of-run summaries for the `build`, `deps` and `test` commands.
//!
//! `build`、`deps` 和 `test` 命令结束时的彩色摘要。

use colored::*;

use crate::core::deps::MANUAL_PACKAGES;
use crate::core::models::{BuildOutcome, BuildPaths, TestReport};
use crate::infra::t;

/// Prints the aggregated test report.
///
/// 打印汇总的测试报告。
///
/// # Output Format / 输出格式
/// ```text
/// ==================================================
/// 📊 TEST REPORT (2024-05-01 12:00:00)
/// ==================================================
/// unit: ❌ FAIL
/// cmake: ✅ PASS
/// integration: ✅ PASS
///
/// Summary: 2/3 tests passed
/// ❌ 1 test(s) failed
/// ```
pub fn print_test_report(report: &TestReport) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!(
        "{}",
        t!(
            "report.banner",
            timestamp = report.finished_at.format("%Y-%m-%d %H:%M:%S")
        )
        .bold()
    );
    println!("{}", rule);

    for result in &report.results {
        let status = if result.passed {
            t!("report.pass").green()
        } else {
            t!("report.fail").red()
        };
        println!("{}: {}", result.name(), status);
        if let Some(diagnostic) = &result.diagnostic {
            println!("    {}", diagnostic.dimmed());
        }
    }

    println!(
        "\n{}",
        t!(
            "report.summary",
            passed = report.passed(),
            total = report.total()
        )
        .bold()
    );

    if report.failed() > 0 {
        println!("{}", t!("report.some_failed", count = report.failed()).red());
    } else {
        println!("{}", t!("report.all_passed").green());
    }
}

/// Prints where the binaries landed and how to use them, or why the build
/// stopped.
pub fn print_build_summary(outcome: &BuildOutcome, paths: &BuildPaths) {
    match outcome {
        BuildOutcome::Done { bin_dir, warnings } => {
            println!("\n{}", t!("build.completed").green().bold());
            println!("{}", t!("build.bin_location", path = bin_dir.display()));
            for warning in warnings {
                println!("  {} {}", "⚠".yellow(), warning.yellow());
            }

            println!("\n{}", t!("build.next_steps").bold());
            println!(
                "  {}",
                t!("build.next_run_app", command = paths.app_executable.display())
            );
            println!(
                "  {}",
                t!("build.next_run_tests", command = paths.test_executable.display())
            );
            println!(
                "  {}",
                t!("build.next_make_test", dir = paths.build_dir.display())
            );
        }
        BuildOutcome::Aborted { step, .. } => {
            println!("\n{}", t!("build.failed_at", step = step).red().bold());
        }
    }
}

/// Prints the packages to install by hand on an unsupported host.
pub fn print_manual_packages() {
    println!("{}", t!("deps.manual_header").yellow());
    for package in MANUAL_PACKAGES {
        println!("  - {}", package);
    }
}
