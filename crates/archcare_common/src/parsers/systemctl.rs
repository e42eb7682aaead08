//! Parser for `systemctl --failed --no-legend --plain`

/// Names of failed units
pub fn failed_units(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            // Without --plain systemd prefixes a bullet
            let line = line.trim().trim_start_matches('●').trim();
            line.split_whitespace().next().map(str::to_string)
        })
        .collect()
}
