//! Health suite: temperatures, SMART, memory, disk space, battery, units
//!
//! Citation: [archwiki:System_maintenance#Check_for_errors]

use super::{record_categorical, record_numeric, record_unknown, record_value, Check, CheckContext};
use crate::config::RuleKey;
use crate::error::SessionError;
use crate::metric::{Metric, MetricId};
use crate::session::ScanSession;
use crate::states::SmartHealth;
use crate::threshold::VerdictTable;
use crate::verdict::Verdict;
use std::path::Path;

/// Present only on machines with a battery
pub const BATTERY_DIR: &str = "/sys/class/power_supply/BAT0";

pub fn suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(CpuTemperatureCheck),
        Box::new(GpuTemperatureCheck),
        Box::new(DiskCheck),
        Box::new(MemoryCheck),
        Box::new(SwapCheck),
        Box::new(DiskUsageCheck),
        Box::new(BatteryCheck),
        Box::new(FailedUnitsCheck),
    ]
}

pub struct CpuTemperatureCheck;

impl Check for CpuTemperatureCheck {
    fn name(&self) -> &str {
        "cpu-temperature"
    }

    fn description(&self) -> &str {
        "Hottest CPU package or core sensor"
    }

    fn citation(&self) -> &str {
        "[archwiki:Lm_sensors]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::CpuTemp);
        record_numeric(ctx, session, &MetricId::CpuTemperature, rule)?;
        Ok(())
    }
}

pub struct GpuTemperatureCheck;

impl Check for GpuTemperatureCheck {
    fn name(&self) -> &str {
        "gpu-temperature"
    }

    fn description(&self) -> &str {
        "GPU core temperature from nvidia-smi or sensors"
    }

    fn citation(&self) -> &str {
        "[archwiki:NVIDIA/Tips_and_tricks#Monitoring]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::GpuTemp);
        record_numeric(ctx, session, &MetricId::GpuTemperature, rule)?;
        Ok(())
    }
}

/// Temperature and SMART health of every whole disk
pub struct DiskCheck;

impl Check for DiskCheck {
    fn name(&self) -> &str {
        "disks"
    }

    fn description(&self) -> &str {
        "SMART overall health and drive temperature"
    }

    fn citation(&self) -> &str {
        "[archwiki:S.M.A.R.T.]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let reader = ctx.reader();
        let disks = match reader.disks() {
            Ok(disks) => disks,
            Err(e) => {
                record_unknown(ctx, session, self.name(), &e)?;
                return Ok(());
            }
        };

        let table = VerdictTable::new("smart-health")
            .with(SmartHealth::Passed, Verdict::Normal)
            .with(SmartHealth::Failed, Verdict::Critical);

        for disk in &disks {
            let health = MetricId::DiskHealth(disk.clone());
            record_categorical(
                ctx,
                session,
                &health.name(),
                reader.disk_health(disk),
                &table,
                SmartHealth::as_str,
                "drive reports imminent failure, back up now",
            )?;

            let rule = ctx.config.rule(RuleKey::DiskTemp);
            record_numeric(ctx, session, &MetricId::DiskTemperature(disk.clone()), rule)?;
        }

        if disks.is_empty() {
            ctx.reporter.detail("No whole disks reported by lsblk");
        }
        Ok(())
    }
}

pub struct MemoryCheck;

impl Check for MemoryCheck {
    fn name(&self) -> &str {
        "memory-usage"
    }

    fn description(&self) -> &str {
        "RAM in use (MemTotal - MemAvailable)"
    }

    fn citation(&self) -> &str {
        "[archwiki:Improving_performance#RAM,_swap_and_OOM_handling]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::Memory);
        record_numeric(ctx, session, &MetricId::MemoryUsage, rule)?;
        Ok(())
    }
}

pub struct SwapCheck;

impl Check for SwapCheck {
    fn name(&self) -> &str {
        "swap-usage"
    }

    fn description(&self) -> &str {
        "Swap in use"
    }

    fn citation(&self) -> &str {
        "[archwiki:Swap]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::Swap);
        record_numeric(ctx, session, &MetricId::SwapUsage, rule)?;
        Ok(())
    }
}

/// Usage of each configured mount point
pub struct DiskUsageCheck;

impl Check for DiskUsageCheck {
    fn name(&self) -> &str {
        "disk-usage"
    }

    fn description(&self) -> &str {
        "Filesystem usage of configured mount points"
    }

    fn citation(&self) -> &str {
        "[archwiki:System_maintenance#Clean_the_filesystem]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        for mount in &ctx.config.mounts {
            let rule = ctx.config.rule(RuleKey::DiskUsage);
            record_numeric(ctx, session, &MetricId::DiskUsage(mount.clone()), rule)?;
        }
        Ok(())
    }
}

/// Skipped entirely on machines without a battery
pub struct BatteryCheck;

impl Check for BatteryCheck {
    fn name(&self) -> &str {
        "battery-capacity"
    }

    fn description(&self) -> &str {
        "Remaining battery charge"
    }

    fn citation(&self) -> &str {
        "[archwiki:Laptop#Battery_state]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        if !ctx.probe.path_exists(Path::new(BATTERY_DIR)) {
            ctx.reporter.detail("No battery present");
            return Ok(());
        }

        let rule = ctx.config.rule(RuleKey::Battery);
        record_numeric(ctx, session, &MetricId::BatteryCapacity, rule)?;
        Ok(())
    }
}

pub struct FailedUnitsCheck;

impl Check for FailedUnitsCheck {
    fn name(&self) -> &str {
        "failed-units"
    }

    fn description(&self) -> &str {
        "systemd units in failed state"
    }

    fn citation(&self) -> &str {
        "[archwiki:Systemd#Basic_systemctl_usage]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let id = MetricId::FailedUnits;
        let units = match ctx.reader().failed_units() {
            Ok(units) => units,
            Err(e) => {
                record_unknown(ctx, session, &id.name(), &e)?;
                return Ok(());
            }
        };

        for unit in &units {
            ctx.reporter.detail(&format!("failed: {}", unit));
        }

        let metric = Metric::numeric(id.name(), units.len() as f64, None);
        record_value(ctx, session, metric, ctx.config.rule(RuleKey::FailedUnits))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{running, Harness};
    use crate::confirm::ConfirmationPolicy;
    use crate::log_file::LogCategory;
    use crate::probe::ScriptedProbe;
    use crate::reader::{BATTERY_CAPACITY_PATH, MEMINFO_PATH};

    const MEMINFO: &str = "MemTotal:       16000000 kB\n\
                           MemFree:         2000000 kB\n\
                           MemAvailable:    1000000 kB\n\
                           SwapTotal:       8000000 kB\n\
                           SwapFree:        8000000 kB\n";

    fn verdicts(session: &ScanSession) -> Vec<(String, Verdict)> {
        session
            .records()
            .iter()
            .map(|r| (r.check.clone(), r.verdict))
            .collect()
    }

    #[test]
    fn test_disk_check_per_device() {
        let probe = ScriptedProbe::new()
            .command("lsblk -dn -o NAME,TYPE", "sda   disk\nsr0   rom\nzram0 disk\n")
            .command(
                "smartctl -H /dev/sda",
                "SMART overall-health self-assessment test result: PASSED\n",
            )
            .command(
                "smartctl -A /dev/sda",
                "194 Temperature_Celsius     0x0022   052   045   000    Old_age   Always       -       48\n",
            );
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Health);

        DiskCheck.run(&harness.ctx(&probe), &mut session).unwrap();

        assert_eq!(
            verdicts(&session),
            vec![
                ("disk-health:sda".to_string(), Verdict::Normal),
                ("disk-temperature:sda".to_string(), Verdict::Warning),
            ]
        );
    }

    #[test]
    fn test_memory_and_swap() {
        let probe = ScriptedProbe::new().file(MEMINFO_PATH, MEMINFO);
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let ctx = harness.ctx(&probe);
        let mut session = running(LogCategory::Health);

        MemoryCheck.run(&ctx, &mut session).unwrap();
        SwapCheck.run(&ctx, &mut session).unwrap();

        assert_eq!(
            verdicts(&session),
            vec![
                ("memory-usage".to_string(), Verdict::Critical),
                ("swap-usage".to_string(), Verdict::Normal),
            ]
        );
    }

    #[test]
    fn test_battery_absent_records_nothing() {
        let probe = ScriptedProbe::new();
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Health);

        BatteryCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_battery_low_is_critical() {
        let probe = ScriptedProbe::new()
            .file(BATTERY_DIR, "")
            .file(BATTERY_CAPACITY_PATH, "10\n");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Health);

        BatteryCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records()[0].verdict, Verdict::Critical);
    }

    #[test]
    fn test_failed_units_count() {
        let probe = ScriptedProbe::new().command(
            "systemctl --failed --no-legend --plain",
            "foo.service loaded failed failed Foo\n",
        );
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Health);

        FailedUnitsCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        let record = &session.records()[0];
        assert_eq!(record.verdict, Verdict::Warning);
        assert_eq!(record.metric.as_ref().and_then(|m| m.value.as_f64()), Some(1.0));
    }

    #[test]
    fn test_each_mount_is_checked() {
        let probe = ScriptedProbe::new()
            .command("df --output=pcent /", "Use%\n 42%\n")
            .command("df --output=pcent /home", "Use%\n 91%\n");
        let mut harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        harness.config.mounts = vec!["/".to_string(), "/home".to_string()];
        let mut session = running(LogCategory::Health);

        DiskUsageCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(
            verdicts(&session),
            vec![
                ("disk-usage:/".to_string(), Verdict::Normal),
                ("disk-usage:/home".to_string(), Verdict::Critical),
            ]
        );
    }
}
