//! Update and clean suites
//!
//! Update: pending updates, full upgrade, reboot check.
//! Clean: package cache, orphans, journal; each followed by its cleanup.
//! Citation: [archwiki:System_maintenance]

use super::security::PendingUpdatesCheck;
use super::{record_numeric, record_unknown, record_value, Check, CheckContext};
use crate::actions::{ActionOutcome, MaintenanceAction};
use crate::config::RuleKey;
use crate::error::SessionError;
use crate::metric::{Metric, MetricId, MetricValue};
use crate::session::{CheckRecord, ScanSession};
use crate::verdict::Verdict;

pub fn update_suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(PendingUpdatesCheck),
        Box::new(SystemUpgradeCheck),
        Box::new(RebootCheck),
    ]
}

pub fn clean_suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(PackageCacheCheck),
        Box::new(OrphanPackagesCheck),
        Box::new(JournalCheck),
    ]
}

/// `pacman -Syu`. The outcome is scored: a declined or failed upgrade
/// leaves the system behind.
pub struct SystemUpgradeCheck;

impl Check for SystemUpgradeCheck {
    fn name(&self) -> &str {
        "system-upgrade"
    }

    fn description(&self) -> &str {
        "Full system upgrade"
    }

    fn citation(&self) -> &str {
        "[archwiki:System_maintenance#Upgrading_the_system]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let pending_name = MetricId::PendingUpdates.name();
        let up_to_date = session.records().iter().any(|r| {
            r.check == pending_name
                && r.metric.as_ref().and_then(|m| m.value.as_f64()) == Some(0.0)
        });

        if up_to_date {
            let message = "system is up to date";
            let none = MetricValue::Categorical("nothing pending".to_string());
            ctx.reporter
                .report(self.name(), Some(&none), None, Verdict::Normal, message);
            session.record(CheckRecord::new(self.name(), Verdict::Normal, message))?;
            return Ok(());
        }

        let action = MaintenanceAction::system_upgrade(ctx.actions.noconfirm());
        let outcome = ctx.actions.run(ctx.probe, ctx.reporter, &action);
        session.record(CheckRecord::new(self.name(), outcome.verdict(), outcome.describe()))?;
        Ok(())
    }
}

/// pacman removes the running kernel's modules when it upgrades the kernel
pub struct RebootCheck;

impl Check for RebootCheck {
    fn name(&self) -> &str {
        "reboot-required"
    }

    fn description(&self) -> &str {
        "Running kernel still installed"
    }

    fn citation(&self) -> &str {
        "[archwiki:System_maintenance#Restart_or_reboot_after_upgrades]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let required = match ctx.reader().reboot_required() {
            Ok(required) => required,
            Err(e) => {
                record_unknown(ctx, session, self.name(), &e)?;
                return Ok(());
            }
        };

        let (verdict, message) = if required {
            (Verdict::Warning, "running kernel was replaced, reboot to load it")
        } else {
            (Verdict::Normal, "")
        };
        ctx.reporter.report(
            self.name(),
            Some(&MetricValue::Categorical(
                if required { "yes" } else { "no" }.to_string(),
            )),
            None,
            verdict,
            message,
        );
        session.record(CheckRecord::new(self.name(), verdict, message))?;

        if required && ctx.config.auto_reboot {
            ctx.act(session, &MaintenanceAction::reboot())?;
        } else if required {
            ctx.reporter.detail("AUTO_REBOOT is off; reboot when convenient");
        }
        Ok(())
    }
}

/// Cache size, then `paccache -rk<N>`
pub struct PackageCacheCheck;

impl Check for PackageCacheCheck {
    fn name(&self) -> &str {
        "package-cache-size"
    }

    fn description(&self) -> &str {
        "Size of /var/cache/pacman/pkg"
    }

    fn citation(&self) -> &str {
        "[archwiki:Pacman#Cleaning_the_package_cache]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::CacheSize);
        let verdict = record_numeric(ctx, session, &MetricId::PackageCacheSize, rule)?;
        if verdict != Verdict::Unknown {
            let keep = ctx.config.cache_keep_versions;
            ctx.act(session, &MaintenanceAction::cache_cleanup(keep))?;
        }
        Ok(())
    }
}

/// Orphan count, then `pacman -Rns` of exactly those packages
pub struct OrphanPackagesCheck;

impl Check for OrphanPackagesCheck {
    fn name(&self) -> &str {
        "orphan-packages"
    }

    fn description(&self) -> &str {
        "Dependencies no longer required by any package"
    }

    fn citation(&self) -> &str {
        "[archwiki:Pacman/Tips_and_tricks#Removing_unused_packages_(orphans)]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let id = MetricId::OrphanPackages;
        let orphans = match ctx.reader().orphan_packages() {
            Ok(orphans) => orphans,
            Err(e) => {
                record_unknown(ctx, session, &id.name(), &e)?;
                return Ok(());
            }
        };

        let metric = Metric::numeric(id.name(), orphans.len() as f64, None);
        record_value(ctx, session, metric, ctx.config.rule(RuleKey::Orphans))?;

        if !orphans.is_empty() {
            ctx.reporter.detail(&format!("orphans: {}", orphans.join(" ")));
            let action = MaintenanceAction::remove_orphans(&orphans, ctx.actions.noconfirm());
            ctx.act(session, &action)?;
        }
        Ok(())
    }
}

/// Journal size, then `journalctl --vacuum-time=<N>d`
pub struct JournalCheck;

impl Check for JournalCheck {
    fn name(&self) -> &str {
        "journal-disk-usage"
    }

    fn description(&self) -> &str {
        "Disk space used by archived and active journals"
    }

    fn citation(&self) -> &str {
        "[archwiki:Systemd/Journal#Clean_journal_files_manually]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::JournalSize);
        let verdict = record_numeric(ctx, session, &MetricId::JournalDiskUsage, rule)?;
        if verdict != Verdict::Unknown {
            let days = ctx.config.log_retention_days;
            let outcome = ctx.act(session, &MaintenanceAction::journal_vacuum(days))?;
            if outcome == ActionOutcome::Completed {
                ctx.reporter
                    .detail(&format!("kept journal entries from the last {} days", days));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{running, Harness};
    use crate::checks::run_scan;
    use crate::confirm::ConfirmationPolicy;
    use crate::log_file::LogCategory;
    use crate::probe::ScriptedProbe;
    use crate::session::Scoring;

    #[test]
    fn test_up_to_date_skips_upgrade() {
        let probe = ScriptedProbe::new()
            .command_with_status("checkupdates", 2, "")
            .command("uname -r", "6.9.1-arch1-1\n")
            .file("/usr/lib/modules/6.9.1-arch1-1", "");
        let harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        let summary = run_scan(LogCategory::Update, &harness.ctx(&probe)).unwrap();

        assert_eq!((summary.score, summary.total), (3, 3));
        assert!(!probe.executed().iter().any(|c| c.contains("-Syu")));
    }

    #[test]
    fn test_upgrade_outcome_is_scored() {
        let probe = ScriptedProbe::new()
            .command("checkupdates", "linux 6.9.1.arch1-1 -> 6.9.2.arch1-1\n")
            .executable("sudo pacman -Syu", 1)
            .command("uname -r", "6.9.1-arch1-1\n")
            .file("/usr/lib/modules/6.9.1-arch1-1", "");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let ctx = harness.ctx(&probe);
        let mut session = running(LogCategory::Update);

        PendingUpdatesCheck.run(&ctx, &mut session).unwrap();
        SystemUpgradeCheck.run(&ctx, &mut session).unwrap();

        let upgrade = &session.records()[1];
        assert_eq!(upgrade.check, "system-upgrade");
        assert_eq!(upgrade.verdict, Verdict::Warning);
        assert_eq!(upgrade.scoring, Scoring::Scored);
        assert!(probe.executed().iter().all(|c| !c.contains("-Syu")));
    }

    #[test]
    fn test_failed_upgrade_is_critical() {
        let probe = ScriptedProbe::new()
            .command("checkupdates", "linux 6.9.1.arch1-1 -> 6.9.2.arch1-1\n")
            .executable("sudo pacman -Syu --noconfirm", 1);
        let harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        let ctx = harness.ctx(&probe);
        let mut session = running(LogCategory::Update);

        PendingUpdatesCheck.run(&ctx, &mut session).unwrap();
        SystemUpgradeCheck.run(&ctx, &mut session).unwrap();
        assert_eq!(session.records()[1].verdict, Verdict::Critical);
    }

    #[test]
    fn test_reboot_only_with_auto_reboot() {
        let probe = ScriptedProbe::new()
            .command("uname -r", "6.9.1-arch1-1\n")
            .executable("systemctl reboot", 0)
            .as_root();

        let harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        let mut session = running(LogCategory::Update);
        RebootCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records()[0].verdict, Verdict::Warning);

        let mut harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        harness.config.auto_reboot = true;
        let mut session = running(LogCategory::Update);
        RebootCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records().len(), 2);
        assert_eq!(probe.executed().last().map(String::as_str), Some("systemctl reboot"));
    }

    #[test]
    fn test_clean_scan_runs_every_cleanup() {
        let probe = ScriptedProbe::new()
            .command("du -sb /var/cache/pacman/pkg", "2147483648\t/var/cache/pacman/pkg\n")
            .executable("paccache -rk3", 0)
            .command("pacman -Qdtq", "libfoo\nlibbar\n")
            .executable("pacman -Rns --noconfirm libfoo libbar", 0)
            .command(
                "journalctl --disk-usage",
                "Archived and active journals take up 120.0M in the file system.\n",
            )
            .executable("journalctl --vacuum-time=30d", 0)
            .as_root();
        let harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        let summary = run_scan(LogCategory::Clean, &harness.ctx(&probe)).unwrap();

        // cache 2048 MiB warns, two orphans warn, journal is fine
        assert_eq!((summary.score, summary.total), (1, 3));
        assert_eq!(summary.counts.normal, 4);
        let informational = summary
            .records
            .iter()
            .filter(|r| r.scoring == Scoring::Informational)
            .count();
        assert_eq!(informational, 3);
    }

    #[test]
    fn test_unreadable_cache_skips_cleanup() {
        let probe = ScriptedProbe::new();
        let harness = Harness::new(ConfirmationPolicy::AlwaysConfirm);
        let mut session = running(LogCategory::Clean);
        PackageCacheCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(probe.executed(), vec!["du -sb /var/cache/pacman/pkg"]);
    }
}
