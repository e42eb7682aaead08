//! Parser for `lsblk -dn -o NAME,TYPE`

/// Names of whole disks, skipping roms, loops and zram
pub fn disks(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(name), Some("disk")) if !name.starts_with("zram") => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}
