//! # Synthetic Performance Probes / 合成性能探测
//!
//! Three placeholder probes used by the `performance` test phase. They measure
//! synthetic workloads rather than the compiled application, and their limits
//! sit well above what those workloads cost, so they pass on any sane machine.
//!
//! `performance` 测试阶段使用的三个占位探测。它们测量的是合成负载而不是被编译的应用程序，
//! 阈值远高于负载的实际开销。

use anyhow::{Context, Result};
use std::fs;
use std::hint::black_box;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::{ProcessesToUpdate, System};

/// Function definitions emitted into the synthetic source file.
pub const SYNTHETIC_FUNCTION_COUNT: usize = 10_000;

/// Upper bound for the stand-in parse of the synthetic file.
pub const PARSE_TIME_LIMIT: Duration = Duration::from_secs(5);

/// Strings allocated by the memory probe.
pub const CORPUS_SIZE: usize = 100_000;

/// Upper bound for the resident memory growth caused by the corpus.
pub const MEMORY_GROWTH_LIMIT: u64 = 512 * 1024 * 1024;

/// Per-operation allowance for the timing table.
pub const OPERATION_BUDGET: Duration = Duration::from_millis(250);

/// Named operations and the delay each one simulates.
pub const TIMED_OPERATIONS: [(&str, Duration); 4] = [
    ("parse_small_document", Duration::from_millis(10)),
    ("serialize_tree", Duration::from_millis(5)),
    ("search_nodes", Duration::from_millis(8)),
    ("fold_regions", Duration::from_millis(3)),
];

/// Builds C++-like source text with one function per iteration.
/// The output depends only on `function_count`.
pub fn generate_synthetic_source(function_count: usize) -> String {
    let mut source = String::with_capacity(function_count * 64);
    source.push_str("// synthetic workload\n");
    for i in 0..function_count {
        source.push_str(&format!(
            "int function_{i}(int value) {{\n    return value * {i} + 1;\n}}\n\n"
        ));
    }
    source
}

/// Stand-in for parsing the generated file. Only confirms it is readable.
pub fn stand_in_parse(path: &Path) -> Result<()> {
    fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LargeFileReport {
    pub bytes: usize,
    pub elapsed: Duration,
    pub throughput_kib_per_sec: f64,
    pub passed: bool,
}

/// Writes a synthetic source file into `dir`, times `parse` on it and removes
/// the file again.
///
/// The file is removed before the result of `parse` is inspected, so it never
/// outlives this call, whether `parse` succeeds, fails or panics.
pub fn large_file_probe<F>(dir: &Path, function_count: usize, parse: F) -> Result<LargeFileReport>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let source = generate_synthetic_source(function_count);

    let mut file = tempfile::Builder::new()
        .prefix("cxml_large_sample_")
        .suffix(".cpp")
        .tempfile_in(dir)
        .with_context(|| format!("cannot create synthetic file in {}", dir.display()))?;
    file.write_all(source.as_bytes())?;
    file.flush()?;

    let started = Instant::now();
    let parsed = parse(file.path());
    let elapsed = started.elapsed();

    file.close().context("cannot remove synthetic file")?;
    parsed?;

    let throughput_kib_per_sec =
        source.len() as f64 / 1024.0 / elapsed.as_secs_f64().max(f64::EPSILON);

    Ok(LargeFileReport {
        bytes: source.len(),
        elapsed,
        throughput_kib_per_sec,
        passed: elapsed < PARSE_TIME_LIMIT,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReport {
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub corpus_len: usize,
    pub passed: bool,
}

impl MemoryReport {
    /// Growth in bytes, `None` when resident memory could not be sampled.
    pub fn delta(&self) -> Option<i64> {
        match (self.before, self.after) {
            (Some(before), Some(after)) => Some(after as i64 - before as i64),
            _ => None,
        }
    }
}

/// Samples resident memory around the allocation of a string corpus.
/// A host where sampling is unavailable passes with no figures.
pub fn memory_probe(corpus_size: usize) -> MemoryReport {
    let before = resident_memory();
    let corpus: Vec<String> = (0..corpus_size)
        .map(|i| format!("<node id=\"{i}\">synthetic payload {i}</node>"))
        .collect();
    let corpus = black_box(corpus);
    let after = resident_memory();
    let corpus_len = corpus.len();
    drop(corpus);

    let passed = match (before, after) {
        (Some(before), Some(after)) => after.saturating_sub(before) < MEMORY_GROWTH_LIMIT,
        _ => true,
    };

    MemoryReport {
        before,
        after,
        corpus_len,
        passed,
    }
}

/// Resident set size of this process in bytes.
pub fn resident_memory() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map(|process| process.memory())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    pub samples: Vec<(String, Duration)>,
    pub total: Duration,
    pub limit: Duration,
    pub passed: bool,
}

/// Runs each simulated operation, then checks the summed time against
/// `budget` per operation.
pub async fn timing_probe(operations: &[(&str, Duration)], budget: Duration) -> TimingReport {
    let mut samples = Vec::with_capacity(operations.len());
    for (name, delay) in operations {
        let started = Instant::now();
        tokio::time::sleep(*delay).await;
        samples.push((name.to_string(), started.elapsed()));
    }

    let total: Duration = samples.iter().map(|(_, d)| *d).sum();
    let limit = budget * operations.len() as u32;

    TimingReport {
        samples,
        total,
        limit,
        passed: total < limit,
    }
}
