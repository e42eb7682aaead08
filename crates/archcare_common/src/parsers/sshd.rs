//! Parser for `sshd -T` (effective configuration, one `key value` per line)

use crate::error::ReadError;

/// Value of a lowercase key, e.g. `permitrootlogin`
pub fn setting(raw: &str, key: &str) -> Result<String, ReadError> {
    raw.lines()
        .find_map(|line| {
            let (k, v) = line.trim().split_once(char::is_whitespace)?;
            k.eq_ignore_ascii_case(key).then(|| v.trim().to_string())
        })
        .ok_or_else(|| ReadError::parse("sshd -T", format!("{} not present", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "port 22
addressfamily any
permitrootlogin prohibit-password
passwordauthentication yes
";

    #[test]
    fn test_setting_lookup() {
        assert_eq!(setting(SAMPLE, "permitrootlogin").unwrap(), "prohibit-password");
        assert_eq!(setting(SAMPLE, "PasswordAuthentication").unwrap(), "yes");
    }

    #[test]
    fn test_missing_setting() {
        assert!(setting(SAMPLE, "pubkeyauthentication").is_err());
    }
}
