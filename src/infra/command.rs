//! # Command Execution Module / 命令执行模块
//!
//! Runs external tools (`cmake`, `make`, package managers, the test binary)
//! with an explicit working directory and captures what they print.
//! The orchestrators only talk to the [`CommandRunner`] trait so tests can
//! script tool behaviour without touching the host.
//!
//! 以显式工作目录运行外部工具并捕获其输出。
//! 编排器只依赖 [`CommandRunner`] trait，测试可以模拟工具行为而无需触碰宿主机。

use colored::*;
use futures::future::{FutureExt, LocalBoxFuture};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::core::error::{PipelineError, Result};
use crate::infra::t;

/// A single external command together with the directory it runs in.
///
/// 单个外部命令及其运行目录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program followed by its arguments / 程序及其参数
    pub tokens: Vec<String>,
    /// Working directory of the child process / 子进程的工作目录
    pub cwd: PathBuf,
    /// Turn a nonzero exit into [`PipelineError::ExternalCommand`].
    pub fail_on_error: bool,
    /// Print the command line and captured stdout for the operator.
    pub echo: bool,
}

impl Invocation {
    pub fn new<I, S>(tokens: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            fail_on_error: false,
            echo: true,
        }
    }

    /// Fails the invocation when the child exits nonzero.
    pub fn checked(mut self) -> Self {
        self.fail_on_error = true;
        self
    }

    /// Suppresses operator output. Used by toolchain probes.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Shell-quoted rendering of the command line.
    pub fn display(&self) -> String {
        render_command(&self.tokens)
    }
}

/// Joins tokens into a copy-pasteable shell command line.
pub fn render_command(tokens: &[String]) -> String {
    shlex::try_join(tokens.iter().map(String::as_str)).unwrap_or_else(|_| tokens.join(" "))
}

/// Outcome of one external process.
///
/// 单个外部进程的执行结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandResult {
    pub fn new(status: ExitStatus, stdout: String, stderr: String) -> Self {
        Self {
            code: status.code(),
            stdout,
            stderr,
            success: status.success(),
        }
    }
}

/// Executes external commands on behalf of the orchestrators.
///
/// Implementations must honour [`Invocation::fail_on_error`]: a nonzero exit
/// becomes [`PipelineError::ExternalCommand`] carrying the captured stderr,
/// otherwise the result is returned with `success == false`.
///
/// 为编排器执行外部命令。实现必须遵循 `fail_on_error` 语义。
pub trait CommandRunner {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> LocalBoxFuture<'a, Result<CommandResult>>;
}

/// Runs commands as real child processes of this one.
/// The environment is inherited and no timeout is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> LocalBoxFuture<'a, Result<CommandResult>> {
        execute(invocation).boxed_local()
    }
}

async fn execute(invocation: &Invocation) -> Result<CommandResult> {
    let (program, args) = invocation
        .tokens
        .split_first()
        .ok_or(PipelineError::EmptyCommand)?;
    let command_line = invocation.display();

    if invocation.echo {
        println!("{}", t!("command.running", command = &command_line).blue());
        println!(
            "{}",
            t!("command.working_dir", path = invocation.cwd.display()).dimmed()
        );
    }
    debug!(command = %command_line, cwd = %invocation.cwd.display(), "spawning child process");

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).current_dir(&invocation.cwd).kill_on_drop(true);

    let (status, stdout, stderr) = spawn_and_capture(cmd).await;
    let status = status.map_err(|source| PipelineError::Spawn {
        command: command_line.clone(),
        source,
    })?;
    let result = CommandResult::new(status, stdout, stderr);
    debug!(command = %command_line, code = ?result.code, "child process exited");

    if invocation.echo && !result.stdout.trim().is_empty() {
        println!("{}", result.stdout.trim_end());
    }

    if invocation.fail_on_error && !result.success {
        println!("{}", t!("command.failed", command = &command_line).red());
        if !result.stderr.trim().is_empty() {
            println!(
                "{}",
                t!("command.error_output", output = result.stderr.trim_end())
            );
        }
        return Err(PipelineError::ExternalCommand {
            command: command_line,
            code: result.code,
            stderr: result.stderr,
        });
    }

    Ok(result)
}

/// Spawns a command and captures stdout and stderr separately.
/// Both pipes are drained on the current task while the child runs so a child
/// that fills one pipe cannot stall on it.
///
/// # Returns
/// A tuple of the exit status (or the spawn/wait error), captured stdout and
/// captured stderr.
///
/// 派生一个命令，分别捕获 stdout 和 stderr。
/// 两个管道在当前任务中并发读取，避免子进程因管道写满而阻塞。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (io::Result<ExitStatus>, String, String) {
    let mut child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new(), String::new()),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr, status) = tokio::join!(drain(stdout), drain(stderr), child.wait());

    (status, stdout, stderr)
}

/// Reads a pipe to EOF. Bytes that are not UTF-8 are replaced rather than
/// ending the read, so the child never writes into a closed pipe.
async fn drain<R>(reader: Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return String::new();
    };

    let mut buffer = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buffer).await {
        debug!(error = %e, "pipe closed before EOF");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
