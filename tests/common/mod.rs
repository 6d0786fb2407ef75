// Shared test helpers for integration tests
#![allow(dead_code)]

use cxml_pipeline::config::{LayoutConfig, PipelineConfig};
use cxml_pipeline::core::error::{PipelineError, Result};
use cxml_pipeline::infra::command::{CommandResult, CommandRunner, Invocation};
use cxml_pipeline::models::BuildPaths;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// How the scripted runner answers a command.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Exit(i32),
    /// The program cannot be launched at all.
    Missing,
}

/// A `CommandRunner` that never spawns anything. Commands are answered by the
/// rule with the longest matching token prefix; unmatched commands exit 0.
/// Every invocation is recorded.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(Vec<String>, Scripted)>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &[&str], answer: Scripted) -> Self {
        self.rules
            .push((prefix.iter().map(|s| s.to_string()).collect(), answer));
        self
    }

    pub fn missing(self, program: &str) -> Self {
        self.on(&[program], Scripted::Missing)
    }

    pub fn failing(self, prefix: &[&str], code: i32) -> Self {
        self.on(prefix, Scripted::Exit(code))
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Recorded command lines, tokens joined by spaces.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|i| i.tokens.join(" "))
            .collect()
    }

    pub fn ran(&self, prefix: &[&str]) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|i| i.tokens.len() >= prefix.len() && i.tokens.iter().zip(prefix).all(|(a, b)| a == b))
    }

    fn answer(&self, tokens: &[String]) -> Scripted {
        self.rules
            .iter()
            .filter(|(prefix, _)| {
                tokens.len() >= prefix.len() && tokens.iter().zip(prefix).all(|(a, b)| a == b)
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, answer)| *answer)
            .unwrap_or(Scripted::Exit(0))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> LocalBoxFuture<'a, Result<CommandResult>> {
        async move {
            self.calls.borrow_mut().push(invocation.clone());
            if invocation.tokens.is_empty() {
                return Err(PipelineError::EmptyCommand);
            }

            match self.answer(&invocation.tokens) {
                Scripted::Missing => Err(PipelineError::Spawn {
                    command: invocation.display(),
                    source: io::Error::new(io::ErrorKind::NotFound, "scripted: not installed"),
                }),
                Scripted::Exit(code) => {
                    let result = CommandResult {
                        code: Some(code),
                        stdout: String::new(),
                        stderr: if code == 0 {
                            String::new()
                        } else {
                            "scripted failure\n".to_string()
                        },
                        success: code == 0,
                    };
                    if invocation.fail_on_error && !result.success {
                        return Err(PipelineError::ExternalCommand {
                            command: invocation.display(),
                            code: result.code,
                            stderr: result.stderr,
                        });
                    }
                    Ok(result)
                }
            }
        }
        .boxed_local()
    }
}

/// A scratch project with a build manifest and both XML fixtures.
pub fn cxml_project() -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let root = temp_dir.path();
    fs::write(
        root.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.16)\nproject(Cxml)\n",
    )
    .expect("Failed to write CMakeLists.txt");

    fs::create_dir_all(root.join("examples")).expect("Failed to create examples directory");
    fs::write(root.join("examples/simple.xml"), "<root><item/></root>\n")
        .expect("Failed to write simple.xml");
    fs::write(root.join("examples/sample.xml"), "<root><a><b/></a></root>\n")
        .expect("Failed to write sample.xml");

    temp_dir
}

/// Places empty build outputs where the build would leave them.
pub fn create_artifacts(root: &Path) {
    let bin = root.join("build/bin");
    fs::create_dir_all(&bin).expect("Failed to create bin directory");
    fs::write(bin.join("Cxml"), "").expect("Failed to write Cxml");
    fs::write(bin.join("Cxml_tests"), "").expect("Failed to write Cxml_tests");
}

pub fn default_paths(root: &Path) -> BuildPaths {
    BuildPaths::resolve(root, &LayoutConfig::default())
}

pub fn default_config() -> PipelineConfig {
    PipelineConfig::default()
}
