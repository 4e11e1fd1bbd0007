//! dephunt - Dependency confusion scanner for manifest and source file URLs.
//!
//! CLI entry point.

use clap::Parser;
use dephunt::notify::ConsoleOutput;
use dephunt::{Config, Scanner};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging; stdout is reserved for findings
    let filter = if config.verbose {
        EnvFilter::new("dephunt=debug,warn")
    } else {
        EnvFilter::new("dephunt=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn run(config: Config) -> Result<(), ExitCode> {
    let scan_config = match config.scan_config() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let console = ConsoleOutput::new(config.silent, config.json);
    console.print_banner();

    let lines = read_lines(&config).await;
    if lines.is_empty() {
        return Ok(());
    }

    let mut scanner = match Scanner::new(scan_config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create scanner: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };
    if let Some(pb) = console.create_progress_bar(0) {
        scanner = scanner.with_progress(pb);
    }

    let findings = scanner.scan_lines(&lines).await;

    if let Err(e) = console.print_vulnerabilities(&findings) {
        error!("Failed to print results: {}", e);
        return Err(ExitCode::FAILURE);
    }

    if let Some(ref output_path) = config.output {
        if let Err(e) = console.write_json(&findings, output_path) {
            error!("Failed to write output file: {}", e);
            return Err(ExitCode::FAILURE);
        }
    }

    Ok(())
}

/// Read candidate URLs from `--file` or stdin. Read errors end input quietly.
async fn read_lines(config: &Config) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(ref path) = config.file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => lines.extend(content.lines().map(str::to_string)),
            Err(e) => debug!("Failed to read {}: {}", path.display(), e),
        }
    } else {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match stdin.next_line().await {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading stdin: {}", e);
                    break;
                }
            }
        }
    }

    lines.retain(|line| !line.trim().is_empty());
    lines
}
