//! Reporter - console lines with severity markers plus log lines
//!
//! Console output honours verbosity; the log does not. The two are built
//! independently so a quiet run still leaves a complete log.

use crate::log_file::{LogLine, LogSink};
use crate::metric::{with_unit, MetricValue};
use crate::verdict::{LogLevel, Verdict};
use owo_colors::OwoColorize;
use std::cell::RefCell;
use tracing::warn;

/// How much goes to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Only lines that need attention
    Quiet,
    #[default]
    Normal,
    /// Also commands and detail lines
    Verbose,
}

/// ASCII severity tag at the start of every console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ok,
    Warn,
    Crit,
    Unknown,
    Info,
}

impl Marker {
    pub fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Normal => Marker::Ok,
            Verdict::Warning => Marker::Warn,
            Verdict::Critical => Marker::Crit,
            Verdict::Unknown => Marker::Unknown,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Marker::Ok => "[OK]",
            Marker::Warn => "[WARN]",
            Marker::Crit => "[CRIT]",
            Marker::Unknown => "[??]",
            Marker::Info => "[INFO]",
        }
    }

    fn colored(&self) -> String {
        let tag = self.tag();
        match self {
            Marker::Ok => tag.bright_green().to_string(),
            Marker::Warn => tag.yellow().to_string(),
            Marker::Crit => tag.bright_red().bold().to_string(),
            Marker::Unknown => tag.magenta().to_string(),
            Marker::Info => tag.cyan().to_string(),
        }
    }

    /// Shown even in quiet mode
    fn needs_attention(&self) -> bool {
        matches!(self, Marker::Warn | Marker::Crit | Marker::Unknown)
    }
}

/// What one report call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// None when suppressed by verbosity
    pub console_line: Option<String>,
    /// None when logging is disabled
    pub log_line: Option<LogLine>,
}

enum Console {
    Stdout,
    Captured(RefCell<Vec<String>>),
}

/// Whether stdout is a terminal that takes ANSI colours
pub fn stdout_colors() -> bool {
    console::Term::stdout().features().colors_supported()
}

pub struct Reporter {
    verbosity: Verbosity,
    color: bool,
    sink: Option<LogSink>,
    console: Console,
}

impl Reporter {
    /// Reporter printing to stdout, colouring only when stdout is a terminal
    pub fn new(verbosity: Verbosity, sink: Option<LogSink>) -> Self {
        Self {
            verbosity,
            color: stdout_colors(),
            sink,
            console: Console::Stdout,
        }
    }

    /// Reporter that keeps console lines in memory, uncoloured
    pub fn captured(verbosity: Verbosity, sink: Option<LogSink>) -> Self {
        Self {
            verbosity,
            color: false,
            sink,
            console: Console::Captured(RefCell::new(Vec::new())),
        }
    }

    /// Console lines kept by a captured reporter
    pub fn captured_lines(&self) -> Vec<String> {
        match &self.console {
            Console::Captured(lines) => lines.borrow().clone(),
            Console::Stdout => Vec::new(),
        }
    }

    /// Report one classified metric
    pub fn report(
        &self,
        metric_name: &str,
        value: Option<&MetricValue>,
        unit: Option<&str>,
        verdict: Verdict,
        message: &str,
    ) -> Report {
        let shown = value
            .map(|v| with_unit(v, unit))
            .unwrap_or_else(|| "n/a".to_string());

        let marker = Marker::for_verdict(verdict);
        let console_text = if message.is_empty() {
            format!("{}: {}", metric_name, shown)
        } else {
            format!("{}: {} - {}", metric_name, shown, message)
        };
        let log_text = format!("{}={} verdict={} {}", metric_name, shown, verdict, message);

        self.emit(marker, &console_text, verdict.log_level(), log_text.trim_end())
    }

    /// Informational line (session start, action results)
    pub fn info(&self, message: &str) -> Report {
        self.emit(Marker::Info, message, LogLevel::Info, message)
    }

    /// Line at an explicit level that is not tied to a metric
    pub fn event(&self, marker: Marker, level: LogLevel, message: &str) -> Report {
        self.emit(marker, message, level, message)
    }

    /// Log-only line, no console output
    pub fn log(&self, level: LogLevel, message: &str) -> Option<LogLine> {
        let sink = self.sink.as_ref()?;
        let line = LogLine::now(level, message);
        if let Err(e) = sink.append(&line) {
            warn!("Failed to append to {}: {}", sink.path().display(), e);
        }
        Some(line)
    }

    /// Verbose-only console detail; never logged
    pub fn detail(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            self.print(&format!("       {}", message));
        }
    }

    fn emit(&self, marker: Marker, console_text: &str, level: LogLevel, log_text: &str) -> Report {
        let visible = match self.verbosity {
            Verbosity::Quiet => marker.needs_attention(),
            Verbosity::Normal | Verbosity::Verbose => true,
        };

        let console_line = visible.then(|| {
            let tag = if self.color {
                marker.colored()
            } else {
                marker.tag().to_string()
            };
            format!("{} {}", tag, console_text)
        });

        if let Some(line) = &console_line {
            self.print(line);
        }

        Report {
            console_line,
            log_line: self.log(level, log_text),
        }
    }

    fn print(&self, line: &str) {
        match &self.console {
            Console::Stdout => println!("{}", line),
            Console::Captured(lines) => lines.borrow_mut().push(line.to_string()),
        }
    }
}
