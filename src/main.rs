//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `spf_flatten` library that handles:
//! - Command-line and environment argument parsing
//! - Logger and resolver initialization
//! - Writing the validated records to stdout
//!
//! Records are printed rather than pushed to a live zone; feed the output to
//! whichever tool manages the zone.

use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use spf_flatten::initialization::{init_logger_with, init_resolver};
use spf_flatten::publish::{publish_records, ZoneFileWriter};
use spf_flatten::{run_flatten, Config, FlattenReport, OutputFormat};

fn main() {
    let config = Config::parse();

    if let Err(e) = run(config) {
        eprintln!("spf_flatten error: {:#}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let resolver = init_resolver().context("Failed to initialize DNS resolver")?;
    let report = run_flatten(&config, &resolver)?;

    log::info!(
        "Generated {} valid record(s) from {} mechanism(s) in {:.2}s",
        report.records.len(),
        report.mechanism_count,
        report.elapsed_seconds
    );

    write_report(&report, config.output)
}

fn write_report(report: &FlattenReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Zone => {
            let mut writer = ZoneFileWriter::new(io::stdout().lock());
            publish_records(&mut writer, &report.records)
                .context("Failed to write zone records")?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .context("Failed to serialize report")?;
            println!("{json}");
        }
    }
    Ok(())
}
