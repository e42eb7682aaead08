//! Closed categorical values read from external tools
//!
//! Each type keeps the raw text of anything it does not know in
//! `Unrecognized`, so it can be reported verbatim and classified as unknown.

use serde::{Deserialize, Serialize};

/// `smartctl -H` overall assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmartHealth {
    Passed,
    Failed,
    Unrecognized(String),
}

impl SmartHealth {
    /// ATA drives print PASSED/FAILED!, NVMe drives print OK
    pub fn parse(raw: &str) -> Self {
        match raw.trim().trim_end_matches('!').to_ascii_uppercase().as_str() {
            "PASSED" | "OK" => SmartHealth::Passed,
            "FAILED" => SmartHealth::Failed,
            _ => SmartHealth::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SmartHealth::Passed => "passed",
            SmartHealth::Failed => "failed",
            SmartHealth::Unrecognized(raw) => raw,
        }
    }
}

/// sshd `PermitRootLogin`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootLoginPolicy {
    No,
    ProhibitPassword,
    ForcedCommandsOnly,
    Yes,
    Unrecognized(String),
}

impl RootLoginPolicy {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "no" => RootLoginPolicy::No,
            // "without-password" is the deprecated spelling
            "prohibit-password" | "without-password" => RootLoginPolicy::ProhibitPassword,
            "forced-commands-only" => RootLoginPolicy::ForcedCommandsOnly,
            "yes" => RootLoginPolicy::Yes,
            _ => RootLoginPolicy::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RootLoginPolicy::No => "no",
            RootLoginPolicy::ProhibitPassword => "prohibit-password",
            RootLoginPolicy::ForcedCommandsOnly => "forced-commands-only",
            RootLoginPolicy::Yes => "yes",
            RootLoginPolicy::Unrecognized(raw) => raw,
        }
    }
}

/// yes/no switch as printed by `sshd -T`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Yes,
    No,
    Unrecognized(String),
}

impl Toggle {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Toggle::Yes,
            "no" => Toggle::No,
            _ => Toggle::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Toggle::Yes => "yes",
            Toggle::No => "no",
            Toggle::Unrecognized(raw) => raw,
        }
    }
}

/// `systemctl is-active` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    Active,
    Inactive,
    Failed,
    Activating,
    Unrecognized(String),
}

impl ServiceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "active" => ServiceState::Active,
            "inactive" => ServiceState::Inactive,
            "failed" => ServiceState::Failed,
            "activating" | "reloading" => ServiceState::Activating,
            other => ServiceState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceState::Active => "active",
            ServiceState::Inactive => "inactive",
            ServiceState::Failed => "failed",
            ServiceState::Activating => "activating",
            ServiceState::Unrecognized(raw) => raw,
        }
    }
}

/// `systemctl is-enabled` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitFileState {
    Enabled,
    Disabled,
    Static,
    Masked,
    Unrecognized(String),
}

impl UnitFileState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "enabled" | "enabled-runtime" => UnitFileState::Enabled,
            "disabled" => UnitFileState::Disabled,
            "static" => UnitFileState::Static,
            "masked" | "masked-runtime" => UnitFileState::Masked,
            other => UnitFileState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UnitFileState::Enabled => "enabled",
            UnitFileState::Disabled => "disabled",
            UnitFileState::Static => "static",
            UnitFileState::Masked => "masked",
            UnitFileState::Unrecognized(raw) => raw,
        }
    }
}

/// cpufreq scaling governor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuGovernor {
    Performance,
    Powersave,
    Schedutil,
    Ondemand,
    Conservative,
    Userspace,
    Unrecognized(String),
}

impl CpuGovernor {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "performance" => CpuGovernor::Performance,
            "powersave" => CpuGovernor::Powersave,
            "schedutil" => CpuGovernor::Schedutil,
            "ondemand" => CpuGovernor::Ondemand,
            "conservative" => CpuGovernor::Conservative,
            "userspace" => CpuGovernor::Userspace,
            other => CpuGovernor::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CpuGovernor::Performance => "performance",
            CpuGovernor::Powersave => "powersave",
            CpuGovernor::Schedutil => "schedutil",
            CpuGovernor::Ondemand => "ondemand",
            CpuGovernor::Conservative => "conservative",
            CpuGovernor::Userspace => "userspace",
            CpuGovernor::Unrecognized(raw) => raw,
        }
    }
}
