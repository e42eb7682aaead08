//! Access to the host: external commands and virtual files
//!
//! Every reader and action goes through `SystemProbe`, so the whole scan can
//! run against canned outputs (`ScriptedProbe`) in tests and nothing else
//! touches the real system.

use crate::error::ReadError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Full command line that was executed
    pub command: String,
    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into `ExternalFailure`
    pub fn require_success(self) -> Result<Self, ReadError> {
        if self.success() {
            Ok(self)
        } else {
            Err(self.into_failure())
        }
    }

    pub fn into_failure(self) -> ReadError {
        ReadError::ExternalFailure {
            command: self.command,
            code: self.exit_code,
            stderr: self.stderr.trim().to_string(),
        }
    }
}

/// Join program and arguments the way they appear in logs
pub fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Where the stdout of a terminal-attached command goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOutput {
    /// Shares our stdout
    #[default]
    Inherit,
    /// Redirected to our stderr; stdout stays reserved for the report
    Stderr,
}

/// Host access used by readers and actions
pub trait SystemProbe {
    /// Run a command and capture its output
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ReadError>;

    /// Run a command attached to the terminal (for upgrades that prompt),
    /// returning its exit code
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        output: ChildOutput,
    ) -> Result<i32, ReadError>;

    /// Read a small text file such as a /proc or /sys entry
    fn read_file(&self, path: &Path) -> Result<String, ReadError>;

    fn path_exists(&self, path: &Path) -> bool;

    /// Whether the effective user is root
    fn is_root(&self) -> bool;
}

/// The real system
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl HostProbe {
    fn spawn_error(program: &str, err: std::io::Error) -> ReadError {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                ReadError::Unavailable(program.to_string())
            }
            _ => ReadError::ExternalFailure {
                command: program.to_string(),
                code: -1,
                stderr: err.to_string(),
            },
        }
    }
}

impl SystemProbe for HostProbe {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ReadError> {
        let line = command_line(program, args);
        debug!("Running {}", line);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(program, e))?;

        Ok(CommandOutput {
            command: line,
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn execute(
        &self,
        program: &str,
        args: &[&str],
        output: ChildOutput,
    ) -> Result<i32, ReadError> {
        debug!("Executing {} ({:?})", command_line(program, args), output);

        let mut command = Command::new(program);
        command.args(args);
        if output == ChildOutput::Stderr {
            command.stdout(Stdio::from(std::io::stderr()));
        }
        let status = command
            .status()
            .map_err(|e| Self::spawn_error(program, e))?;

        Ok(status.code().unwrap_or(-1))
    }

    fn read_file(&self, path: &Path) -> Result<String, ReadError> {
        std::fs::read_to_string(path).map_err(|e| {
            debug!("Cannot read {}: {}", path.display(), e);
            ReadError::Unavailable(path.display().to_string())
        })
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_root(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }
}

/// Canned command outputs and files.
///
/// Commands are keyed by their full command line. Anything not scripted is
/// reported as unavailable, like a tool that is not installed.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    outputs: HashMap<String, CommandOutput>,
    exit_codes: HashMap<String, i32>,
    files: HashMap<PathBuf, String>,
    root: bool,
    executed: RefCell<Vec<String>>,
    redirected: RefCell<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful command
    pub fn command(self, line: &str, stdout: &str) -> Self {
        self.command_with_status(line, 0, stdout)
    }

    pub fn command_with_status(mut self, line: &str, exit_code: i32, stdout: &str) -> Self {
        self.outputs.insert(
            line.to_string(),
            CommandOutput {
                command: line.to_string(),
                exit_code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    /// Script the exit code of a terminal-attached command
    pub fn executable(mut self, line: &str, exit_code: i32) -> Self {
        self.exit_codes.insert(line.to_string(), exit_code);
        self
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }

    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    /// Command lines passed to `run` or `execute`, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Command lines passed to `execute` with their stdout sent to stderr
    pub fn redirected(&self) -> Vec<String> {
        self.redirected.borrow().clone()
    }
}

impl SystemProbe for ScriptedProbe {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ReadError> {
        let line = command_line(program, args);
        self.executed.borrow_mut().push(line.clone());
        self.outputs
            .get(&line)
            .cloned()
            .ok_or_else(|| ReadError::Unavailable(program.to_string()))
    }

    fn execute(
        &self,
        program: &str,
        args: &[&str],
        output: ChildOutput,
    ) -> Result<i32, ReadError> {
        let line = command_line(program, args);
        self.executed.borrow_mut().push(line.clone());
        if output == ChildOutput::Stderr {
            self.redirected.borrow_mut().push(line.clone());
        }
        self.exit_codes
            .get(&line)
            .copied()
            .ok_or_else(|| ReadError::Unavailable(program.to_string()))
    }

    fn read_file(&self, path: &Path) -> Result<String, ReadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::Unavailable(path.display().to_string()))
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_root(&self) -> bool {
        self.root
    }
}
