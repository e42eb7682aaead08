//! Terminal output - section headers and the closing summary
//!
//! ASCII only. Per-check lines come from the `Reporter`; this module only
//! frames them.

use archcare_common::{Band, LogCategory, SessionSummary};
use owo_colors::OwoColorize;
use std::io::Write;

const SEPARATOR: &str = "------------------------------------------------------------";

fn bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn section_header(category: LogCategory, color: bool) {
    println!();
    println!("{}", bold(&format!("[{}]", category.as_str().to_uppercase()), color));
}

fn band_tag(band: Band, color: bool) -> String {
    let tag = format!("[{}]", band.as_str().to_uppercase());
    if !color {
        return tag;
    }
    match band {
        Band::Excellent => tag.bright_green().to_string(),
        Band::Good => tag.green().to_string(),
        Band::Moderate => tag.yellow().to_string(),
        Band::Poor => tag.bright_red().to_string(),
    }
}

/// One line per finished scan
pub fn summary_line(summary: &SessionSummary) -> String {
    let mut line = format!(
        "{:<12} {:>3}/{:<3} {:>3}%",
        summary.category.as_str(),
        summary.score,
        summary.total,
        summary.percentage
    );
    let counts = &summary.counts;
    if counts.warning + counts.critical + counts.unknown > 0 {
        line.push_str(&format!(
            "  ({} warning, {} critical, {} unknown)",
            counts.warning, counts.critical, counts.unknown
        ));
    }
    line
}

pub fn print_summary(summaries: &[SessionSummary], color: bool) {
    println!();
    println!("{}", SEPARATOR);
    println!("{}", bold("SUMMARY", color));
    println!("{}", SEPARATOR);
    for summary in summaries {
        println!("{} {}", band_tag(summary.band, color), summary_line(summary));
    }
    println!();
}

pub fn print_json(summaries: &[SessionSummary]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        for band in [Band::Excellent, Band::Good, Band::Moderate, Band::Poor] {
            let tag = band_tag(band, false);
            assert!(!tag.contains('\x1b'), "{:?}", tag);
        }
        assert_eq!(band_tag(Band::Poor, false), "[POOR]");
        assert_eq!(bold("SUMMARY", false), "SUMMARY");
    }

    #[test]
    fn test_colored_output_wraps_tag() {
        let tag = band_tag(Band::Excellent, true);
        assert!(tag.contains('\x1b'));
        assert!(tag.contains("[EXCELLENT]"));
    }
}
