//! Performance suite: CPU governor, swappiness, periodic TRIM
//!
//! Citation: [archwiki:Improving_performance]

use super::{record_categorical, record_unknown, record_value, Check, CheckContext};
use crate::actions::MaintenanceAction;
use crate::config::RuleKey;
use crate::error::SessionError;
use crate::metric::{Metric, MetricId};
use crate::reader::SWAPPINESS_PATH;
use crate::session::ScanSession;
use crate::states::{CpuGovernor, UnitFileState};
use crate::threshold::VerdictTable;
use crate::verdict::Verdict;

pub fn suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(CpuGovernorCheck),
        Box::new(SwappinessCheck),
        Box::new(FstrimTimerCheck),
    ]
}

pub struct CpuGovernorCheck;

impl Check for CpuGovernorCheck {
    fn name(&self) -> &str {
        "cpu-governor"
    }

    fn description(&self) -> &str {
        "cpufreq scaling governor of cpu0"
    }

    fn citation(&self) -> &str {
        "[archwiki:CPU_frequency_scaling#Scaling_governors]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let table = VerdictTable::new("scaling_governor")
            .with(CpuGovernor::Performance, Verdict::Normal)
            .with(CpuGovernor::Schedutil, Verdict::Normal)
            .with(CpuGovernor::Powersave, Verdict::Warning)
            .with(CpuGovernor::Ondemand, Verdict::Warning)
            .with(CpuGovernor::Conservative, Verdict::Warning)
            .with(CpuGovernor::Userspace, Verdict::Warning);

        record_categorical(
            ctx,
            session,
            &MetricId::CpuGovernor.name(),
            ctx.reader().cpu_governor(),
            &table,
            CpuGovernor::as_str,
            "schedutil or performance gives better latency",
        )?;
        Ok(())
    }
}

/// Classifies vm.swappiness and offers to lower it to the configured target
pub struct SwappinessCheck;

impl Check for SwappinessCheck {
    fn name(&self) -> &str {
        "swappiness"
    }

    fn description(&self) -> &str {
        "How eagerly the kernel swaps out anonymous memory"
    }

    fn citation(&self) -> &str {
        "[archwiki:Swap#Swappiness]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let id = MetricId::Swappiness;
        let value = match ctx.reader().sysfs_number(SWAPPINESS_PATH) {
            Ok(value) => value,
            Err(e) => {
                record_unknown(ctx, session, &id.name(), &e)?;
                return Ok(());
            }
        };

        let metric = Metric::numeric(id.name(), value, None);
        record_value(ctx, session, metric, ctx.config.rule(RuleKey::Swappiness))?;

        let target = ctx.config.target_swappiness;
        if value > f64::from(target) {
            ctx.act(session, &MaintenanceAction::set_swappiness(target))?;
        }
        Ok(())
    }
}

/// Weekly TRIM; enabled on request when the timer is off
pub struct FstrimTimerCheck;

impl Check for FstrimTimerCheck {
    fn name(&self) -> &str {
        "fstrim-timer"
    }

    fn description(&self) -> &str {
        "Periodic TRIM for SSDs via fstrim.timer"
    }

    fn citation(&self) -> &str {
        "[archwiki:Solid_state_drive#Periodic_TRIM]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let table = VerdictTable::new("fstrim.timer")
            .with(UnitFileState::Enabled, Verdict::Normal)
            .with(UnitFileState::Static, Verdict::Normal)
            .with(UnitFileState::Disabled, Verdict::Warning)
            .with(UnitFileState::Masked, Verdict::Warning);

        let state = ctx.reader().fstrim_timer();
        let disabled = matches!(state, Ok(UnitFileState::Disabled));

        record_categorical(
            ctx,
            session,
            &MetricId::FstrimTimer.name(),
            state,
            &table,
            UnitFileState::as_str,
            "SSDs benefit from weekly TRIM",
        )?;

        if disabled {
            ctx.act(session, &MaintenanceAction::enable_fstrim())?;
        }
        Ok(())
    }
}
