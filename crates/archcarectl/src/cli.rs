//! Command-line surface of archcarectl

use archcare_common::{ConfirmationPolicy, LogCategory, Verbosity};
use clap::Parser;
use std::path::PathBuf;

/// Order used by `--all` and when several modes are given
pub const MODE_ORDER: [LogCategory; 5] = [
    LogCategory::Update,
    LogCategory::Clean,
    LogCategory::Health,
    LogCategory::Security,
    LogCategory::Performance,
];

#[derive(Parser, Debug)]
#[command(name = "archcarectl")]
#[command(about = "Arch Linux maintenance - updates, cleanup, health, security and performance checks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Check for updates and upgrade the system
    #[arg(long)]
    pub update: bool,

    /// Clean package cache, orphans and old journal entries
    #[arg(long)]
    pub clean: bool,

    /// Temperatures, SMART, memory, disk usage, battery, failed units (default)
    #[arg(long)]
    pub health: bool,

    /// sshd policy, firewall, kernel hardening, pending updates
    #[arg(long)]
    pub security: bool,

    /// CPU governor, swappiness, periodic TRIM
    #[arg(long)]
    pub performance: bool,

    /// Run every mode: update, clean, health, security, performance
    #[arg(long)]
    pub all: bool,

    /// Show what would be changed without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Approve every action without asking
    #[arg(short = 'y', long = "yes", conflicts_with = "prompt_once")]
    pub yes: bool,

    /// Ask once and apply the answer to every action in this run
    #[arg(long)]
    pub prompt_once: bool,

    /// Only print lines that need attention
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also print commands and check details
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not write the maintenance log
    #[arg(long)]
    pub no_log: bool,

    /// Configuration file (default /etc/archcare/archcare.conf)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the per-category log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print session summaries as JSON instead of the report
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Selected scan kinds in execution order. No mode means health.
    pub fn categories(&self) -> Vec<LogCategory> {
        if self.all {
            return MODE_ORDER.to_vec();
        }

        let selected: Vec<LogCategory> = MODE_ORDER
            .into_iter()
            .filter(|category| match category {
                LogCategory::Update => self.update,
                LogCategory::Clean => self.clean,
                LogCategory::Health => self.health,
                LogCategory::Security => self.security,
                LogCategory::Performance => self.performance,
            })
            .collect();

        if selected.is_empty() {
            vec![LogCategory::Health]
        } else {
            selected
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        if self.yes {
            ConfirmationPolicy::AlwaysConfirm
        } else if self.prompt_once {
            ConfirmationPolicy::PromptOncePerInvocation
        } else {
            ConfirmationPolicy::PromptEach
        }
    }
}
