//! Colored console output for scan results.

use crate::types::{Result, Vulnerability};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Console output handler with colors and formatting.
pub struct ConsoleOutput {
    silent: bool,
    json_mode: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(silent: bool, json_mode: bool) -> Self {
        Self { silent, json_mode }
    }

    /// Print the banner unless silenced or emitting JSON.
    pub fn print_banner(&self) {
        if self.silent || self.json_mode {
            return;
        }

        println!();
        println!("{}", "╔══════════════════════════════════════════════════════════════╗".red());
        println!("{}", "║                     DEPHUNT v0.1.0                           ║".red());
        println!("{}", "║        Dependency Confusion Scanner for Manifests            ║".red());
        println!("{}", "╚══════════════════════════════════════════════════════════════╝".red());
        println!();
    }

    /// Print all findings in the selected format.
    pub fn print_vulnerabilities(&self, vulnerabilities: &[Vulnerability]) -> Result<()> {
        if self.json_mode {
            println!("{}", serde_json::to_string_pretty(vulnerabilities)?);
            return Ok(());
        }

        for vuln in vulnerabilities {
            println!("{}", format_vulnerability(vuln));
        }
        Ok(())
    }

    /// Write findings as pretty JSON to `path`.
    pub fn write_json(&self, vulnerabilities: &[Vulnerability], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(vulnerabilities)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Create a progress bar over target URLs, drawn on stderr.
    pub fn create_progress_bar(&self, total: u64) -> Option<ProgressBar> {
        if self.silent || self.json_mode {
            return None;
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Scanning targets");
        Some(pb)
    }
}

/// `[package|status|language] url`, with the tag in red.
pub fn format_vulnerability(vuln: &Vulnerability) -> String {
    let tag = format!("[{}|{}|{}]", vuln.package, vuln.status, vuln.language);
    format!("{} {}", tag.red(), vuln.url)
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false, false)
    }
}
