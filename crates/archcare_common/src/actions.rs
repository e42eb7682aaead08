//! Maintenance actions - state-changing commands
//!
//! Flow: dry-run check → confirm → execute → report.
//! Reads never change the system; everything that does goes through here.

use crate::confirm::Confirmer;
use crate::error::ReadError;
use crate::probe::{command_line, ChildOutput, SystemProbe};
use crate::reporter::{Marker, Reporter};
use crate::session::CheckRecord;
use crate::verdict::{LogLevel, Verdict};
use std::cell::RefCell;
use tracing::{debug, warn};

/// One external command that changes the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceAction {
    pub title: String,
    pub program: String,
    pub args: Vec<String>,
    pub requires_root: bool,
}

impl MaintenanceAction {
    pub fn new(title: &str, program: &str, args: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            requires_root: false,
        }
    }

    pub fn as_root(mut self) -> Self {
        self.requires_root = true;
        self
    }

    /// Full system upgrade. `noconfirm` when nobody will answer pacman's own prompt.
    pub fn system_upgrade(noconfirm: bool) -> Self {
        let mut args = vec!["-Syu"];
        if noconfirm {
            args.push("--noconfirm");
        }
        Self::new("System upgrade", "pacman", &args).as_root()
    }

    /// Keep the newest `keep` versions of each cached package
    pub fn cache_cleanup(keep: u32) -> Self {
        let flag = format!("-rk{}", keep);
        Self::new("Clean package cache", "paccache", &[&flag]).as_root()
    }

    pub fn remove_orphans(orphans: &[String], noconfirm: bool) -> Self {
        let mut action = Self::new("Remove orphan packages", "pacman", &["-Rns"]).as_root();
        if noconfirm {
            action.args.push("--noconfirm".to_string());
        }
        action.args.extend(orphans.iter().cloned());
        action
    }

    pub fn journal_vacuum(days: u32) -> Self {
        let flag = format!("--vacuum-time={}d", days);
        Self::new("Vacuum systemd journal", "journalctl", &[&flag]).as_root()
    }

    pub fn enable_fstrim() -> Self {
        Self::new(
            "Enable periodic TRIM",
            "systemctl",
            &["enable", "--now", "fstrim.timer"],
        )
        .as_root()
    }

    pub fn set_swappiness(value: u32) -> Self {
        let assignment = format!("vm.swappiness={}", value);
        Self::new("Lower swappiness", "sysctl", &["-w", &assignment]).as_root()
    }

    pub fn reboot() -> Self {
        Self::new("Reboot into the new kernel", "systemctl", &["reboot"]).as_root()
    }

    /// Program and arguments as executed, with `sudo` in front when the
    /// action needs root and we are not root
    pub fn argv(&self, is_root: bool) -> (String, Vec<String>) {
        if self.requires_root && !is_root {
            let mut args = Vec::with_capacity(self.args.len() + 1);
            args.push(self.program.clone());
            args.extend(self.args.iter().cloned());
            ("sudo".to_string(), args)
        } else {
            (self.program.clone(), self.args.clone())
        }
    }

    pub fn command_line(&self, is_root: bool) -> String {
        let (program, args) = self.argv(is_root);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        command_line(&program, &args)
    }
}

/// What happened to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Dry run: reported, never spawned
    DryRun,
    Declined,
    /// Ran and exited non-zero
    Failed(ReadError),
    /// Tool missing
    Skipped(ReadError),
}

impl ActionOutcome {
    /// Verdict used when the outcome is recorded in a session
    pub fn verdict(&self) -> Verdict {
        match self {
            ActionOutcome::Completed | ActionOutcome::DryRun => Verdict::Normal,
            ActionOutcome::Declined => Verdict::Warning,
            ActionOutcome::Failed(_) => Verdict::Critical,
            ActionOutcome::Skipped(_) => Verdict::Unknown,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ActionOutcome::Completed => "completed".to_string(),
            ActionOutcome::DryRun => "dry run, not executed".to_string(),
            ActionOutcome::Declined => "declined".to_string(),
            ActionOutcome::Failed(e) => format!("failed: {}", e),
            ActionOutcome::Skipped(e) => format!("skipped: {}", e),
        }
    }

    /// Informational session record for this outcome
    pub fn record(&self, action: &MaintenanceAction) -> CheckRecord {
        CheckRecord::new(action.title.clone(), self.verdict(), self.describe()).informational()
    }
}

/// Executes actions under one dry-run flag and one confirmation policy for
/// the whole invocation
pub struct ActionRunner {
    dry_run: bool,
    confirmer: RefCell<Confirmer>,
    child_output: ChildOutput,
}

impl ActionRunner {
    pub fn new(dry_run: bool, confirmer: Confirmer) -> Self {
        Self {
            dry_run,
            confirmer: RefCell::new(confirmer),
            child_output: ChildOutput::Inherit,
        }
    }

    /// Route the stdout of executed actions, e.g. to stderr for JSON output
    pub fn with_child_output(mut self, output: ChildOutput) -> Self {
        self.child_output = output;
        self
    }

    /// Whether tools should get their own `--noconfirm`
    pub fn noconfirm(&self) -> bool {
        self.confirmer.borrow().suppress_tool_prompts()
    }

    pub fn run(
        &self,
        probe: &dyn SystemProbe,
        reporter: &Reporter,
        action: &MaintenanceAction,
    ) -> ActionOutcome {
        let is_root = probe.is_root();
        let line = action.command_line(is_root);

        if self.dry_run {
            reporter.event(
                Marker::Info,
                LogLevel::Info,
                &format!("{}: would run: {}", action.title, line),
            );
            return ActionOutcome::DryRun;
        }

        let question = format!("{}? ({})", action.title, line);
        if !self.confirmer.borrow_mut().confirm(&question) {
            debug!("Declined: {}", line);
            reporter.info(&format!("{}: declined, nothing changed", action.title));
            return ActionOutcome::Declined;
        }

        reporter.detail(&format!("$ {}", line));
        let (program, args) = action.argv(is_root);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match probe.execute(&program, &args, self.child_output) {
            Ok(0) => {
                reporter.event(
                    Marker::Ok,
                    LogLevel::Success,
                    &format!("{}: completed ({})", action.title, line),
                );
                ActionOutcome::Completed
            }
            Ok(code) => {
                let error = ReadError::ExternalFailure {
                    command: line,
                    code,
                    stderr: String::new(),
                };
                warn!("{}", error);
                reporter.event(
                    Marker::Crit,
                    LogLevel::Error,
                    &format!("{}: {}", action.title, error),
                );
                ActionOutcome::Failed(error)
            }
            Err(error @ ReadError::Unavailable(_)) => {
                reporter.event(
                    Marker::Unknown,
                    LogLevel::Warning,
                    &format!("{}: skipped, {}", action.title, error),
                );
                ActionOutcome::Skipped(error)
            }
            Err(error) => {
                warn!("{}", error);
                reporter.event(
                    Marker::Crit,
                    LogLevel::Error,
                    &format!("{}: {}", action.title, error),
                );
                ActionOutcome::Failed(error)
            }
        }
    }
}
