//! Exit codes for archcarectl
//!
//! Citation: [archwiki:System_maintenance]

use archcare_common::SessionSummary;

/// Every scan finished without a critical finding
pub const EXIT_SUCCESS: i32 = 0;

/// Fatal error before or between scans (unreadable config, log directory)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Invalid command line; clap exits with this itself
pub const EXIT_USAGE: i32 = 2;

/// At least one scan recorded a critical verdict
pub const EXIT_CRITICAL_FINDINGS: i32 = 3;

pub fn exit_code_for(summaries: &[SessionSummary]) -> i32 {
    if summaries.iter().any(SessionSummary::has_critical) {
        EXIT_CRITICAL_FINDINGS
    } else {
        EXIT_SUCCESS
    }
}
