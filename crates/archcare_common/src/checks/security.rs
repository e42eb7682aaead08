//! Security suite: sshd policy, firewall, kernel hardening, pending updates
//!
//! Citation: [archwiki:Security]

use super::{record_categorical, record_mode, record_numeric, Check, CheckContext};
use crate::config::RuleKey;
use crate::error::SessionError;
use crate::metric::MetricId;
use crate::session::ScanSession;
use crate::states::{RootLoginPolicy, ServiceState, Toggle};
use crate::threshold::VerdictTable;
use crate::verdict::Verdict;

pub fn suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(SshRootLoginCheck),
        Box::new(SshPasswordAuthCheck),
        Box::new(FirewallCheck),
        Box::new(KernelHardeningCheck),
        Box::new(PendingUpdatesCheck),
    ]
}

pub struct SshRootLoginCheck;

impl Check for SshRootLoginCheck {
    fn name(&self) -> &str {
        "ssh-root-login"
    }

    fn description(&self) -> &str {
        "Effective PermitRootLogin of sshd"
    }

    fn citation(&self) -> &str {
        "[archwiki:OpenSSH#Deny]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let table = VerdictTable::new("PermitRootLogin")
            .with(RootLoginPolicy::No, Verdict::Normal)
            .with(RootLoginPolicy::ProhibitPassword, Verdict::Normal)
            .with(RootLoginPolicy::ForcedCommandsOnly, Verdict::Normal)
            .with(RootLoginPolicy::Yes, Verdict::Critical);

        record_categorical(
            ctx,
            session,
            &MetricId::SshRootLogin.name(),
            ctx.reader().ssh_root_login(),
            &table,
            RootLoginPolicy::as_str,
            "set PermitRootLogin no in /etc/ssh/sshd_config",
        )?;
        Ok(())
    }
}

pub struct SshPasswordAuthCheck;

impl Check for SshPasswordAuthCheck {
    fn name(&self) -> &str {
        "ssh-password-auth"
    }

    fn description(&self) -> &str {
        "Effective PasswordAuthentication of sshd"
    }

    fn citation(&self) -> &str {
        "[archwiki:OpenSSH#Force_public_key_authentication]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let table = VerdictTable::new("PasswordAuthentication")
            .with(Toggle::No, Verdict::Normal)
            .with(Toggle::Yes, Verdict::Warning);

        record_categorical(
            ctx,
            session,
            &MetricId::SshPasswordAuth.name(),
            ctx.reader().ssh_password_auth(),
            &table,
            Toggle::as_str,
            "prefer key-based authentication",
        )?;
        Ok(())
    }
}

pub struct FirewallCheck;

impl Check for FirewallCheck {
    fn name(&self) -> &str {
        "firewall"
    }

    fn description(&self) -> &str {
        "An active nftables, ufw, firewalld or iptables service"
    }

    fn citation(&self) -> &str {
        "[archwiki:Security#Firewalls]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let table = VerdictTable::new("firewall")
            .with(ServiceState::Active, Verdict::Normal)
            .with(ServiceState::Activating, Verdict::Warning)
            .with(ServiceState::Inactive, Verdict::Critical)
            .with(ServiceState::Failed, Verdict::Critical);

        let read = ctx.reader().firewall().map(|(unit, state)| {
            ctx.reporter.detail(&format!("firewall unit: {}", unit));
            state
        });

        record_categorical(
            ctx,
            session,
            &MetricId::Firewall.name(),
            read,
            &table,
            ServiceState::as_str,
            "no firewall service is running",
        )?;
        Ok(())
    }
}

/// sysctl key and its hardened modes; the first one is recommended.
/// Mode 0 (protection off) warns; modes the kernel does not document are
/// unknown.
pub const HARDENING_SYSCTLS: &[(&str, &[u32])] = &[
    ("kernel.kptr_restrict", &[1, 2]),
    ("kernel.dmesg_restrict", &[1]),
    ("net.ipv4.tcp_syncookies", &[1, 2]),
    ("kernel.yama.ptrace_scope", &[1, 2, 3]),
    ("net.ipv4.conf.all.rp_filter", &[1, 2]),
];

fn hardening_table(key: &str, hardened: &[u32]) -> VerdictTable<u32> {
    hardened
        .iter()
        .fold(VerdictTable::new(key).with(0, Verdict::Warning), |table, mode| {
            table.with(*mode, Verdict::Normal)
        })
}

/// One scored record per hardening sysctl
pub struct KernelHardeningCheck;

impl Check for KernelHardeningCheck {
    fn name(&self) -> &str {
        "kernel-hardening"
    }

    fn description(&self) -> &str {
        "Kernel parameters that limit information leaks and spoofing"
    }

    fn citation(&self) -> &str {
        "[archwiki:Security#Kernel_hardening]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let reader = ctx.reader();

        for (key, hardened) in HARDENING_SYSCTLS {
            let name = MetricId::KernelParam(key.to_string()).name();
            let advice = match hardened.first() {
                Some(mode) => format!("set {} = {}", key, mode),
                None => String::new(),
            };
            record_mode(
                ctx,
                session,
                &name,
                reader.sysctl(key),
                &hardening_table(key, hardened),
                &advice,
            )?;
        }
        Ok(())
    }
}

/// Shared by the security and update suites
pub struct PendingUpdatesCheck;

impl Check for PendingUpdatesCheck {
    fn name(&self) -> &str {
        "pending-updates"
    }

    fn description(&self) -> &str {
        "Packages with a newer version in the sync repositories"
    }

    fn citation(&self) -> &str {
        "[archwiki:System_maintenance#Upgrading_the_system]"
    }

    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError> {
        let rule = ctx.config.rule(RuleKey::PendingUpdates);
        record_numeric(ctx, session, &MetricId::PendingUpdates, rule)?;
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

    fn sshd(root_login: &str, password: &str) -> ScriptedProbe {
        ScriptedProbe::new().command(
            "sshd -T",
            &format!(
                "port 22\npermitrootlogin {}\npasswordauthentication {}\n",
                root_login, password
            ),
        )
    }

    #[test]
    fn test_ssh_root_login_table() {
        for (value, expected) in [
            ("no", Verdict::Normal),
            ("prohibit-password", Verdict::Normal),
            ("without-password", Verdict::Normal),
            ("forced-commands-only", Verdict::Normal),
            ("yes", Verdict::Critical),
            ("sometimes", Verdict::Unknown),
        ] {
            let probe = sshd(value, "no");
            let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
            let mut session = running(LogCategory::Security);
            SshRootLoginCheck.run(&harness.ctx(&probe), &mut session).unwrap();
            assert_eq!(session.records()[0].verdict, expected, "PermitRootLogin {}", value);
        }
    }

    #[test]
    fn test_ssh_password_auth() {
        let probe = sshd("no", "yes");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Security);
        SshPasswordAuthCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records()[0].verdict, Verdict::Warning);
        assert_eq!(
            harness.reporter.captured_lines(),
            vec!["[WARN] ssh-password-auth: yes - prefer key-based authentication"]
        );
    }

    #[test]
    fn test_no_firewall_is_critical() {
        let mut probe = ScriptedProbe::new();
        for unit in crate::reader::FIREWALL_UNITS {
            probe = probe.command_with_status(&format!("systemctl is-active {}", unit), 3, "inactive\n");
        }
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Security);
        FirewallCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records()[0].verdict, Verdict::Critical);
    }

    #[test]
    fn test_kernel_hardening_per_key() {
        let probe = ScriptedProbe::new()
            .command("sysctl -n kernel.kptr_restrict", "2\n")
            .command("sysctl -n kernel.dmesg_restrict", "0\n")
            .command("sysctl -n net.ipv4.tcp_syncookies", "1\n")
            .command("sysctl -n kernel.yama.ptrace_scope", "1\n");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Security);
        KernelHardeningCheck.run(&harness.ctx(&probe), &mut session).unwrap();

        let verdicts: Vec<Verdict> = session.records().iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Normal,
                Verdict::Warning,
                Verdict::Normal,
                Verdict::Normal,
                Verdict::Unknown,
            ]
        );
        assert_eq!(session.records()[1].message, "set kernel.dmesg_restrict = 1");
        assert_eq!((session.score(), session.total()), (3, 5));
    }

    #[test]
    fn test_kernel_hardening_undocumented_mode_is_unknown() {
        let probe = ScriptedProbe::new()
            .command("sysctl -n kernel.kptr_restrict", "7\n")
            .command("sysctl -n kernel.dmesg_restrict", "0.5\n")
            .command("sysctl -n net.ipv4.tcp_syncookies", "2\n")
            .command("sysctl -n kernel.yama.ptrace_scope", "3\n")
            .command("sysctl -n net.ipv4.conf.all.rp_filter", "0\n");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Security);
        KernelHardeningCheck.run(&harness.ctx(&probe), &mut session).unwrap();

        let verdicts: Vec<Verdict> = session.records().iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Unknown,
                Verdict::Unknown,
                Verdict::Normal,
                Verdict::Normal,
                Verdict::Warning,
            ]
        );
        assert_eq!(session.records()[0].message, "unrecognized value for kernel.kptr_restrict");
        assert_eq!(session.records()[4].message, "set net.ipv4.conf.all.rp_filter = 1");
        assert!(session.records()[4].metric.is_some());
    }

    #[test]
    fn test_pending_updates_threshold() {
        let probe = ScriptedProbe::new().command("checkupdates", "linux 6.9.1.arch1-1 -> 6.9.2.arch1-1\n");
        let harness = Harness::new(ConfirmationPolicy::NeverConfirm);
        let mut session = running(LogCategory::Security);
        PendingUpdatesCheck.run(&harness.ctx(&probe), &mut session).unwrap();
        assert_eq!(session.records()[0].verdict, Verdict::Warning);
    }
}
