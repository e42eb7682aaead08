//! Archcare Common - metric reading, classification, reporting and sessions
//!
//! Every check runs the same pipeline: read a metric through a
//! `SystemProbe`, classify it against a threshold rule or verdict table,
//! report it to the console and the append-only log, and record it into an
//! explicit `ScanSession`.

pub mod actions;
pub mod checks;
pub mod config;
pub mod confirm;
pub mod error;
pub mod log_file;
pub mod metric;
pub mod parsers;
pub mod probe;
pub mod reader;
pub mod reporter;
pub mod session;
pub mod states;
pub mod threshold;
pub mod verdict;

pub use actions::{ActionOutcome, ActionRunner, MaintenanceAction};
pub use checks::{run_scan, Check, CheckContext};
pub use config::{Config, RuleKey};
pub use confirm::{ConfirmationPolicy, Confirmer, Prompter, TerminalPrompter};
pub use error::{ConfigError, ReadError, SessionError, ThresholdError};
pub use log_file::{LogCategory, LogLine, LogSink};
pub use metric::{Metric, MetricId, MetricValue};
pub use probe::{ChildOutput, CommandOutput, HostProbe, ScriptedProbe, SystemProbe};
pub use reader::MetricReader;
pub use reporter::{stdout_colors, Reporter, Verbosity};
pub use session::{Band, CheckRecord, ScanSession, SessionSummary};
pub use threshold::{classify, Direction, ThresholdRule, VerdictTable};
pub use verdict::{LogLevel, Verdict};
