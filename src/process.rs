//! External process execution
//!
//! The orchestrator only needs one primitive: run a program with arguments in
//! a working directory and get back its captured output and exit status. The
//! [`ProcessRunner`] trait is that seam; [`TokioProcessRunner`] is the real
//! implementation and tests substitute scripted runners.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command;

/// A single program invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Program to run
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<OsString>,
    /// Working directory of the child
    pub current_dir: PathBuf,
    /// Extra environment variables on top of the inherited environment
    pub envs: Vec<(OsString, OsString)>,
}

impl ProcessRequest {
    /// Start a request for `program` running in `current_dir`
    pub fn new(program: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.into(),
            envs: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Captured result of a finished program
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
    /// Exit code (None when terminated by a signal)
    pub code: Option<i32>,
    /// Whether the program exited successfully
    pub success: bool,
}

impl ProcessOutput {
    /// Standard error as lossy UTF-8, trimmed
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Trait for running external programs asynchronously
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the program to completion and capture its output
    ///
    /// # Errors
    ///
    /// Returns an error only when the program could not be started or waited
    /// on. A program that runs and exits non-zero is an `Ok` with
    /// `success == false`.
    async fn run(&self, request: ProcessRequest) -> crate::Result<ProcessOutput>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Process runner backed by `tokio::process`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: ProcessRequest) -> crate::Result<ProcessOutput> {
        let output = Command::new(&request.program)
            .args(&request.args)
            .envs(request.envs.iter().map(|(k, v)| (k, v)))
            .current_dir(&request.current_dir)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!(
                    "Failed to execute {}: {}",
                    request.program.display(),
                    e
                ))
            })?;

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
            success: output.status.success(),
        })
    }

    fn name(&self) -> &'static str {
        "tokio-process"
    }
}
