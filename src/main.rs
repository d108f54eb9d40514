//! CLI Entry Point for polscan
//!
//! Builds the simulated bench, then serves the operator protocol until the input
//! closes.
//!
//! # Usage
//!
//! Interactive, over stdin/stdout:
//! ```bash
//! polscan
//! polscan --config config/polscan.toml --log-level debug
//! polscan --log-format pretty --log-spans --log-file-line
//! ```
//!
//! Over a serial line (requires `--features serial`):
//! ```bash
//! polscan --serial /dev/ttyACM0 --baud 115200
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use polscan::config::{PolscanConfig, DEFAULT_CONFIG_PATH};
use polscan::engine::MeasurementEngine;
use polscan::hardware::mock::MockBench;
use polscan::logging::{self, TracingConfig};
use polscan::transport::{StreamLineSink, StreamLineSource};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "polscan")]
#[command(about = "Polarizer sweep instrument with a line-oriented command protocol", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Override the configured log format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Include source file and line number in log records
    #[arg(long)]
    log_file_line: bool,

    /// Log span open and close events (one per handled line and per scan)
    #[arg(long)]
    log_spans: bool,

    /// Disable ANSI colors in pretty logs
    #[arg(long)]
    no_color: bool,

    /// Serve the protocol on this serial port instead of stdin/stdout
    #[cfg(feature = "serial")]
    #[arg(long)]
    serial: Option<String>,

    /// Serial baud rate
    #[cfg(feature = "serial")]
    #[arg(long, default_value = "115200")]
    baud: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PolscanConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.application.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.application.log_format = format;
    }
    config.validate()?;

    let tracing_config = TracingConfig::from_config(&config)
        .map_err(anyhow::Error::msg)?
        .with_file_and_line(cli.log_file_line)
        .with_span_events(cli.log_spans)
        .with_ansi(!cli.no_color);
    logging::init(tracing_config).map_err(anyhow::Error::msg)?;
    info!(
        name = %config.application.name,
        step_settle_ms = config.timing.step_settle_ms,
        extended_settle_ms = config.timing.extended_settle_ms,
        "starting"
    );

    let bench = MockBench::new(&config.simulation);
    let mut engine = MeasurementEngine::new(bench.instruments(), &config);

    #[cfg(feature = "serial")]
    {
        if let Some(path) = cli.serial.as_deref() {
            info!(port = path, baud = cli.baud, "serving on serial port");
            let (mut input, mut output) = polscan::transport::open_serial(path, cli.baud)?;
            engine.serve(&mut input, &mut output).await?;
            return Ok(());
        }
    }

    let mut input = StreamLineSource::new(tokio::io::BufReader::new(tokio::io::stdin()));
    let mut output = StreamLineSink::new(tokio::io::stdout());
    let stats = engine.serve(&mut input, &mut output).await?;
    info!(
        scans = stats.scans_completed,
        rejected = stats.scans_rejected + stats.commands_rejected,
        "shutting down"
    );
    Ok(())
}
