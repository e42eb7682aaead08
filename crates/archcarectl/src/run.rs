//! Wiring: config, log directory, confirmation policy, then one scan per mode

use crate::cli::Cli;
use crate::errors::exit_code_for;
use crate::output;
use anyhow::{Context, Result};
use archcare_common::checks::run_scan;
use archcare_common::{
    stdout_colors, ActionRunner, CheckContext, ChildOutput, Config, Confirmer, HostProbe, LogSink,
    Prompter, Reporter, SessionSummary, SystemProbe, TerminalPrompter,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Run against the real host; returns the process exit code
pub fn run(cli: &Cli) -> Result<i32> {
    let summaries = execute(cli, &HostProbe, Box::new(TerminalPrompter))?;
    Ok(exit_code_for(&summaries))
}

/// Run every selected scan in order against `probe`
pub fn execute(
    cli: &Cli,
    probe: &dyn SystemProbe,
    prompter: Box<dyn Prompter>,
) -> Result<Vec<SessionSummary>> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!("Configuration: {:?}", config);

    let log_dir = resolve_log_dir(cli, &config);
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let mut actions = ActionRunner::new(
        cli.dry_run,
        Confirmer::new(cli.confirmation_policy(), prompter),
    );
    if cli.json {
        actions = actions.with_child_output(ChildOutput::Stderr);
    }
    if cli.dry_run {
        info!("Dry run: no action will be executed");
    }

    let color = stdout_colors();
    let mut summaries = Vec::new();
    for category in cli.categories() {
        let sink = log_dir
            .as_deref()
            .map(|dir| LogSink::for_category(dir, category));

        // JSON mode keeps stdout for the document; report lines are dropped
        let reporter = if cli.json {
            Reporter::captured(cli.verbosity(), sink)
        } else {
            output::section_header(category, color);
            Reporter::new(cli.verbosity(), sink)
        };

        let ctx = CheckContext {
            probe,
            reporter: &reporter,
            config: &config,
            actions: &actions,
        };
        let summary = run_scan(category, &ctx)
            .with_context(|| format!("{} scan aborted", category.as_str()))?;
        summaries.push(summary);
    }

    if cli.json {
        output::print_json(&summaries)?;
    } else {
        output::print_summary(&summaries, color);
    }

    Ok(summaries)
}

/// None when logging is off by flag or config
fn resolve_log_dir(cli: &Cli, config: &Config) -> Option<PathBuf> {
    if cli.no_log || !config.enable_logging {
        return None;
    }
    Some(cli.log_dir.clone().unwrap_or_else(|| config.log_dir.clone()))
}
