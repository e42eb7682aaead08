//! Metric reader
//!
//! Turns a `MetricId` into a point-in-time `Metric` by running one tool or
//! reading one file through a `SystemProbe`. No retries: reading again is
//! the only way to get a fresh value.

use crate::error::ReadError;
use crate::metric::{Metric, MetricId};
use crate::parsers::{self, pacman::PendingUpdate};
use crate::probe::{CommandOutput, SystemProbe};
use crate::states::{CpuGovernor, RootLoginPolicy, ServiceState, SmartHealth, Toggle, UnitFileState};
use std::path::Path;
use tracing::debug;

pub const MEMINFO_PATH: &str = "/proc/meminfo";
pub const BATTERY_CAPACITY_PATH: &str = "/sys/class/power_supply/BAT0/capacity";
pub const GOVERNOR_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor";
pub const SWAPPINESS_PATH: &str = "/proc/sys/vm/swappiness";
pub const PACKAGE_CACHE_DIR: &str = "/var/cache/pacman/pkg";

/// Firewall front-ends checked in order; the first active one wins
pub const FIREWALL_UNITS: &[&str] = &["nftables", "ufw", "firewalld", "iptables"];

/// Reads metrics from the host
pub struct MetricReader<'a> {
    probe: &'a dyn SystemProbe,
}

impl<'a> MetricReader<'a> {
    pub fn new(probe: &'a dyn SystemProbe) -> Self {
        Self { probe }
    }

    /// Read any metric. Categorical metrics come back as their string form;
    /// checks that need the typed value call the typed readers below.
    pub fn read(&self, id: &MetricId) -> Result<Metric, ReadError> {
        let name = id.name();
        let metric = match id {
            MetricId::CpuTemperature => Metric::numeric(name, self.cpu_temperature()?, Some("°C")),
            MetricId::GpuTemperature => Metric::numeric(name, self.gpu_temperature()?, Some("°C")),
            MetricId::DiskTemperature(dev) => {
                Metric::numeric(name, self.disk_temperature(dev)?, Some("°C"))
            }
            MetricId::DiskHealth(dev) => Metric::categorical(name, self.disk_health(dev)?.as_str()),
            MetricId::MemoryUsage => {
                Metric::numeric(name, self.meminfo()?.mem_percent(), Some("%"))
            }
            MetricId::SwapUsage => Metric::numeric(name, self.meminfo()?.swap_percent(), Some("%")),
            MetricId::DiskUsage(mount) => Metric::numeric(name, self.disk_usage(mount)?, Some("%")),
            MetricId::BatteryCapacity => {
                Metric::numeric(name, self.sysfs_number(BATTERY_CAPACITY_PATH)?, Some("%"))
            }
            MetricId::PendingUpdates => {
                Metric::numeric(name, self.pending_updates()?.len() as f64, None)
            }
            MetricId::OrphanPackages => {
                Metric::numeric(name, self.orphan_packages()?.len() as f64, None)
            }
            MetricId::PackageCacheSize => {
                Metric::numeric(name, self.package_cache_mib()?, Some("MiB"))
            }
            MetricId::JournalDiskUsage => {
                Metric::numeric(name, self.journal_disk_usage_mib()?, Some("MiB"))
            }
            MetricId::FailedUnits => Metric::numeric(name, self.failed_units()?.len() as f64, None),
            MetricId::SshRootLogin => Metric::categorical(name, self.ssh_root_login()?.as_str()),
            MetricId::SshPasswordAuth => {
                Metric::categorical(name, self.ssh_password_auth()?.as_str())
            }
            MetricId::Firewall => {
                let (_, state) = self.firewall()?;
                Metric::categorical(name, state.as_str())
            }
            MetricId::KernelParam(key) => Metric::numeric(name, self.sysctl(key)?, None),
            MetricId::CpuGovernor => Metric::categorical(name, self.cpu_governor()?.as_str()),
            MetricId::Swappiness => Metric::numeric(name, self.sysfs_number(SWAPPINESS_PATH)?, None),
            MetricId::FstrimTimer => Metric::categorical(name, self.fstrim_timer()?.as_str()),
        };

        debug!("Read {} = {}", metric.name, metric.display_value());
        Ok(metric)
    }

    pub fn cpu_temperature(&self) -> Result<f64, ReadError> {
        let out = self.probe.run("sensors", &[])?.require_success()?;
        parsers::sensors::cpu_temperature(&out.stdout)
    }

    /// nvidia-smi first; AMD/nouveau cards report through sensors
    pub fn gpu_temperature(&self) -> Result<f64, ReadError> {
        let nvidia = self
            .probe
            .run(
                "nvidia-smi",
                &["--query-gpu=temperature.gpu", "--format=csv,noheader,nounits"],
            )
            .and_then(CommandOutput::require_success)
            .and_then(|out| parsers::gpu::nvidia_temperature(&out.stdout));

        match nvidia {
            Ok(t) => Ok(t),
            Err(e) => {
                debug!("nvidia-smi unusable ({}), trying sensors", e);
                let out = self.probe.run("sensors", &[])?.require_success()?;
                parsers::sensors::gpu_temperature(&out.stdout)
            }
        }
    }

    pub fn disk_temperature(&self, device: &str) -> Result<f64, ReadError> {
        let out = self.smartctl("-A", device)?;
        parsers::smartctl::temperature(&out)
    }

    pub fn disk_health(&self, device: &str) -> Result<SmartHealth, ReadError> {
        let out = self.smartctl("-H", device)?;
        parsers::smartctl::health(&out)
    }

    fn smartctl(&self, flag: &str, device: &str) -> Result<String, ReadError> {
        let path = format!("/dev/{}", device);
        let out = self.probe.run("smartctl", &[flag, &path])?;
        if parsers::smartctl::is_command_failure(out.exit_code) {
            return Err(out.into_failure());
        }
        Ok(out.stdout)
    }

    pub fn meminfo(&self) -> Result<parsers::meminfo::MemInfo, ReadError> {
        let raw = self.probe.read_file(Path::new(MEMINFO_PATH))?;
        parsers::meminfo::parse(&raw)
    }

    pub fn disk_usage(&self, mount: &str) -> Result<f64, ReadError> {
        let out = self
            .probe
            .run("df", &["--output=pcent", mount])?
            .require_success()?;
        parsers::df::used_percent(&out.stdout)
    }

    /// checkupdates exits 2 when nothing is pending
    pub fn pending_updates(&self) -> Result<Vec<PendingUpdate>, ReadError> {
        let out = self.probe.run("checkupdates", &[])?;
        match out.exit_code {
            0 => parsers::pacman::pending_updates(&out.stdout),
            2 => Ok(Vec::new()),
            _ => Err(out.into_failure()),
        }
    }

    /// pacman -Qdtq exits 1 with no output when there are no orphans
    pub fn orphan_packages(&self) -> Result<Vec<String>, ReadError> {
        let out = self.probe.run("pacman", &["-Qdtq"])?;
        match out.exit_code {
            0 => Ok(parsers::pacman::package_names(&out.stdout)),
            1 if out.stdout.trim().is_empty() => Ok(Vec::new()),
            _ => Err(out.into_failure()),
        }
    }

    /// du reports a total even when some entries are unreadable, so the
    /// exit code only matters if nothing parseable came back
    pub fn package_cache_mib(&self) -> Result<f64, ReadError> {
        let out = self.probe.run("du", &["-sb", PACKAGE_CACHE_DIR])?;
        match parsers::pacman::du_mib(&out.stdout) {
            Ok(mib) => Ok(mib),
            Err(_) if !out.success() => Err(out.into_failure()),
            Err(e) => Err(e),
        }
    }

    pub fn journal_disk_usage_mib(&self) -> Result<f64, ReadError> {
        let out = self
            .probe
            .run("journalctl", &["--disk-usage"])?
            .require_success()?;
        parsers::journal::disk_usage_mib(&out.stdout)
    }

    pub fn failed_units(&self) -> Result<Vec<String>, ReadError> {
        let out = self
            .probe
            .run("systemctl", &["--failed", "--no-legend", "--plain"])?
            .require_success()?;
        Ok(parsers::systemctl::failed_units(&out.stdout))
    }

    fn sshd_setting(&self, key: &str) -> Result<String, ReadError> {
        let out = self.probe.run("sshd", &["-T"])?.require_success()?;
        parsers::sshd::setting(&out.stdout, key)
    }

    pub fn ssh_root_login(&self) -> Result<RootLoginPolicy, ReadError> {
        Ok(RootLoginPolicy::parse(&self.sshd_setting("permitrootlogin")?))
    }

    pub fn ssh_password_auth(&self) -> Result<Toggle, ReadError> {
        Ok(Toggle::parse(&self.sshd_setting("passwordauthentication")?))
    }

    /// `systemctl is-active` exits non-zero for inactive units but still
    /// prints the state, so only the text is used
    pub fn service_state(&self, unit: &str) -> Result<ServiceState, ReadError> {
        let out = self.probe.run("systemctl", &["is-active", unit])?;
        let text = out.stdout.trim();
        if text.is_empty() {
            return Err(out.into_failure());
        }
        Ok(ServiceState::parse(text))
    }

    /// First active firewall front-end, or the state of the first readable
    /// one. Units that cannot be queried are skipped; the read fails only
    /// when none of them answer.
    pub fn firewall(&self) -> Result<(String, ServiceState), ReadError> {
        let mut first = None;
        let mut last_error = None;
        for unit in FIREWALL_UNITS {
            let state = match self.service_state(unit) {
                Ok(state) => state,
                Err(e) => {
                    debug!("Firewall unit {} unreadable: {}", unit, e);
                    last_error = Some(e);
                    continue;
                }
            };
            if state == ServiceState::Active {
                return Ok((unit.to_string(), state));
            }
            first.get_or_insert_with(|| (unit.to_string(), state));
        }
        match (first, last_error) {
            (Some(found), _) => Ok(found),
            (None, Some(e)) => Err(e),
            (None, None) => Err(ReadError::Unavailable("firewall".to_string())),
        }
    }

    pub fn unit_file_state(&self, unit: &str) -> Result<UnitFileState, ReadError> {
        let out = self.probe.run("systemctl", &["is-enabled", unit])?;
        let text = out.stdout.trim();
        if text.is_empty() {
            return Err(out.into_failure());
        }
        Ok(UnitFileState::parse(text))
    }

    pub fn fstrim_timer(&self) -> Result<UnitFileState, ReadError> {
        self.unit_file_state("fstrim.timer")
    }

    pub fn sysctl(&self, key: &str) -> Result<f64, ReadError> {
        let out = self.probe.run("sysctl", &["-n", key])?.require_success()?;
        parsers::parse_number(key, &out.stdout)
    }

    pub fn cpu_governor(&self) -> Result<CpuGovernor, ReadError> {
        let raw = self.probe.read_file(Path::new(GOVERNOR_PATH))?;
        if raw.trim().is_empty() {
            return Err(ReadError::parse(GOVERNOR_PATH, "empty"));
        }
        Ok(CpuGovernor::parse(&raw))
    }

    pub fn sysfs_number(&self, path: &str) -> Result<f64, ReadError> {
        let raw = self.probe.read_file(Path::new(path))?;
        parsers::parse_number(path, &raw)
    }

    /// Whole disks for SMART checks
    pub fn disks(&self) -> Result<Vec<String>, ReadError> {
        let out = self
            .probe
            .run("lsblk", &["-dn", "-o", "NAME,TYPE"])?
            .require_success()?;
        Ok(parsers::lsblk::disks(&out.stdout))
    }

    pub fn running_kernel(&self) -> Result<String, ReadError> {
        let out = self.probe.run("uname", &["-r"])?.require_success()?;
        let release = out.stdout.trim();
        if release.is_empty() {
            return Err(ReadError::parse("uname -r", "empty"));
        }
        Ok(release.to_string())
    }

    /// After a kernel upgrade pacman removes the running kernel's modules
    pub fn reboot_required(&self) -> Result<bool, ReadError> {
        let release = self.running_kernel()?;
        let modules = format!("/usr/lib/modules/{}", release);
        Ok(!self.probe.path_exists(Path::new(&modules)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricValue;
    use crate::probe::ScriptedProbe;

    #[test]
    fn test_missing_tool_is_unavailable() {
        let probe = ScriptedProbe::new();
        let reader = MetricReader::new(&probe);
        assert_eq!(
            reader.read(&MetricId::CpuTemperature),
            Err(ReadError::Unavailable("sensors".to_string()))
        );
    }

    #[test]
    fn test_cpu_temperature_metric() {
        let probe = ScriptedProbe::new().command("sensors", "coretemp-isa-0000\nAdapter: ISA adapter\nPackage id 0:  +72.0°C  (high = +80.0°C)\n");
        let reader = MetricReader::new(&probe);
        let metric = reader.read(&MetricId::CpuTemperature).unwrap();
        assert_eq!(metric.value, MetricValue::Numeric(72.0));
        assert_eq!(metric.unit.as_deref(), Some("°C"));
    }

    #[test]
    fn test_gpu_falls_back_to_sensors() {
        let probe = ScriptedProbe::new().command(
            "sensors",
            "amdgpu-pci-0300\nAdapter: PCI adapter\nedge:         +66.0°C\n",
        );
        let reader = MetricReader::new(&probe);
        assert_eq!(reader.gpu_temperature().unwrap(), 66.0);
        assert_eq!(
            probe.executed(),
            vec![
                "nvidia-smi --query-gpu=temperature.gpu --format=csv,noheader,nounits",
                "sensors"
            ]
        );
    }

    #[test]
    fn test_checkupdates_exit_2_means_none() {
        let probe = ScriptedProbe::new().command_with_status("checkupdates", 2, "");
        let reader = MetricReader::new(&probe);
        assert!(reader.pending_updates().unwrap().is_empty());

        let probe = ScriptedProbe::new().command_with_status("checkupdates", 1, "");
        let reader = MetricReader::new(&probe);
        assert!(matches!(
            reader.pending_updates(),
            Err(ReadError::ExternalFailure { code: 1, .. })
        ));
    }

    #[test]
    fn test_no_orphans() {
        let probe = ScriptedProbe::new().command_with_status("pacman -Qdtq", 1, "");
        let reader = MetricReader::new(&probe);
        assert!(reader.orphan_packages().unwrap().is_empty());
    }

    #[test]
    fn test_firewall_first_active_wins() {
        let probe = ScriptedProbe::new()
            .command_with_status("systemctl is-active nftables", 3, "inactive\n")
            .command("systemctl is-active ufw", "active\n");
        let reader = MetricReader::new(&probe);
        assert_eq!(
            reader.firewall().unwrap(),
            ("ufw".to_string(), ServiceState::Active)
        );
    }

    #[test]
    fn test_firewall_skips_unreadable_units() {
        let probe = ScriptedProbe::new()
            .command_with_status("systemctl is-active nftables", 1, "")
            .command("systemctl is-active ufw", "active\n");
        let reader = MetricReader::new(&probe);
        assert_eq!(
            reader.firewall().unwrap(),
            ("ufw".to_string(), ServiceState::Active)
        );

        let probe = ScriptedProbe::new()
            .command_with_status("systemctl is-active nftables", 1, "")
            .command_with_status("systemctl is-active firewalld", 3, "inactive\n");
        let reader = MetricReader::new(&probe);
        assert_eq!(
            reader.firewall().unwrap(),
            ("firewalld".to_string(), ServiceState::Inactive)
        );
    }

    #[test]
    fn test_firewall_fails_only_when_no_unit_answers() {
        let probe = ScriptedProbe::new().command_with_status("systemctl is-active nftables", 1, "");
        let reader = MetricReader::new(&probe);
        assert!(matches!(reader.firewall(), Err(ReadError::Unavailable(_))));

        let probe = ScriptedProbe::new();
        let reader = MetricReader::new(&probe);
        assert_eq!(
            reader.firewall(),
            Err(ReadError::Unavailable("systemctl".to_string()))
        );
    }

    #[test]
    fn test_smartctl_open_failure_is_external_failure() {
        let probe = ScriptedProbe::new().command_with_status("smartctl -H /dev/sda", 2, "");
        let reader = MetricReader::new(&probe);
        assert!(matches!(
            reader.disk_health("sda"),
            Err(ReadError::ExternalFailure { code: 2, .. })
        ));
    }

    #[test]
    fn test_battery_reads_sysfs() {
        let probe = ScriptedProbe::new().file(BATTERY_CAPACITY_PATH, "10\n");
        let reader = MetricReader::new(&probe);
        let metric = reader.read(&MetricId::BatteryCapacity).unwrap();
        assert_eq!(metric.value.as_f64(), Some(10.0));
    }

    #[test]
    fn test_reboot_required_when_modules_gone() {
        let probe = ScriptedProbe::new().command("uname -r", "6.9.1-arch1-1\n");
        let reader = MetricReader::new(&probe);
        assert!(reader.reboot_required().unwrap());

        let probe = ScriptedProbe::new()
            .command("uname -r", "6.9.1-arch1-1\n")
            .file("/usr/lib/modules/6.9.1-arch1-1", "");
        let reader = MetricReader::new(&probe);
        assert!(!reader.reboot_required().unwrap());
    }

    #[test]
    fn test_garbage_is_parse_failure() {
        let probe = ScriptedProbe::new().command("df --output=pcent /", "Filesystem\n");
        let reader = MetricReader::new(&probe);
        assert!(matches!(
            reader.read(&MetricId::DiskUsage("/".into())),
            Err(ReadError::ParseFailure { .. })
        ));
    }
}
