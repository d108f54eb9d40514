//! Measurement orchestration engine.
//!
//! The engine owns the bench drivers and the settings that shape a scan. The host
//! feeds it one line at a time through [`MeasurementEngine::handle_line`], or hands
//! it a whole channel with [`MeasurementEngine::serve`].
//!
//! Each line is processed to completion before the next is read. A scan or a homing
//! move therefore blocks the channel until it finishes, and `&mut self` makes that
//! exclusivity part of the API.
//!
//! # Example
//!
//! ```no_run
//! use polscan::config::PolscanConfig;
//! use polscan::engine::MeasurementEngine;
//! use polscan::hardware::mock::MockBench;
//! use polscan::transport::MemoryLineSink;
//!
//! # async fn demo() -> polscan::error::AppResult<()> {
//! let config = PolscanConfig::default();
//! let bench = MockBench::new(&config.simulation);
//! let mut engine = MeasurementEngine::new(bench.instruments(), &config);
//!
//! let mut out = MemoryLineSink::new();
//! engine.handle_line("run 0 90 10", &mut out).await?;
//! # Ok(())
//! # }
//! ```

use crate::command::Command;
use crate::config::{PolscanConfig, TimingConfig};
use crate::error::AppResult;
use crate::hardware::Instruments;
use crate::help::help_lines;
use crate::protocol;
use crate::scan::{parse_scan_args, ArgPolicy, ScanDefaults, ScanExecutor, ScanOutcome};
use crate::transport::{LineSink, LineSource};
use tracing::{debug, error, info, instrument, warn};

/// Counters kept across the lifetime of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Lines received, including blank ones
    pub lines: u64,
    /// Scans that streamed every sample
    pub scans_completed: u64,
    /// Scans stopped by a driver failure
    pub scans_aborted: u64,
    /// `run` requests refused by validation
    pub scans_rejected: u64,
    /// Unknown commands and malformed `led` arguments
    pub commands_rejected: u64,
}

/// Interprets operator commands against one bench.
pub struct MeasurementEngine {
    instruments: Instruments,
    timing: TimingConfig,
    defaults: ScanDefaults,
    policy: ArgPolicy,
    stats: EngineStats,
}

impl MeasurementEngine {
    /// Take ownership of the bench drivers and copy the relevant settings.
    pub fn new(instruments: Instruments, config: &PolscanConfig) -> Self {
        let policy = if config.scan.strict_numeric_args {
            ArgPolicy::Strict
        } else {
            ArgPolicy::Lenient
        };

        Self {
            instruments,
            timing: config.timing.clone(),
            defaults: ScanDefaults::from(&config.scan),
            policy,
            stats: EngineStats::default(),
        }
    }

    /// Counters so far
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Read and handle lines until the source closes.
    pub async fn serve(
        &mut self,
        input: &mut dyn LineSource,
        out: &mut dyn LineSink,
    ) -> AppResult<EngineStats> {
        info!("ready for commands");
        while let Some(line) = input.read_line().await? {
            self.handle_line(&line, out).await?;
        }
        info!(stats = ?self.stats, "input closed");
        Ok(self.stats)
    }

    /// Echo, classify and execute one received line.
    ///
    /// Operator mistakes and driver failures are answered on `out` and return `Ok`.
    /// `Err` means `out` itself could not be written.
    #[instrument(skip(self, out))]
    pub async fn handle_line(&mut self, line: &str, out: &mut dyn LineSink) -> AppResult<()> {
        self.stats.lines += 1;

        let command = Command::parse(line);
        if command == Command::Empty {
            return Ok(());
        }
        out.write_line(&protocol::echo(line.trim())).await?;
        debug!(?command, "dispatching");

        match command {
            Command::Empty => {}
            Command::Help => {
                for text in help_lines(&self.defaults) {
                    out.write_line(&text).await?;
                }
            }
            Command::Home => self.home(out).await?,
            Command::LedOn => self.switch_light(true, out).await?,
            Command::LedOff => self.switch_light(false, out).await?,
            Command::InvalidLed(arg) => {
                warn!(arg = %arg, "invalid LED state");
                self.stats.commands_rejected += 1;
                out.write_line(&protocol::invalid_led_state(&arg)).await?;
            }
            Command::Run(args) => self.run(&args, out).await?,
            Command::Unknown(raw) => {
                warn!(command = %raw, "invalid command");
                self.stats.commands_rejected += 1;
                out.write_line(&protocol::invalid_command(&raw)).await?;
            }
        }

        Ok(())
    }

    async fn home(&mut self, out: &mut dyn LineSink) -> AppResult<()> {
        out.write_line(protocol::HOMING).await?;
        match self
            .instruments
            .actuator
            .home(self.timing.extended_settle())
            .await
        {
            Ok(()) => {
                info!("homed");
                out.write_line(protocol::HOME_COMPLETE).await
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "homing failed");
                out.write_line(&protocol::instrument_error(&e)).await
            }
        }
    }

    async fn switch_light(&mut self, on: bool, out: &mut dyn LineSink) -> AppResult<()> {
        let light = &self.instruments.light;
        let result = if on {
            light.turn_on().await
        } else {
            light.turn_off().await
        };

        match result {
            Ok(()) => {
                info!(on, "light source switched");
                out.write_line(if on { protocol::LED_ON } else { protocol::LED_OFF })
                    .await
            }
            Err(e) => {
                error!(on, error = %format!("{e:#}"), "light source switch failed");
                out.write_line(&protocol::instrument_error(&e)).await
            }
        }
    }

    async fn run(&mut self, args: &str, out: &mut dyn LineSink) -> AppResult<()> {
        let request = match parse_scan_args(args, self.defaults, self.policy) {
            Ok(request) => request,
            Err(rejection) => {
                warn!(args, %rejection, "scan rejected");
                self.stats.scans_rejected += 1;
                return out.write_line(&rejection.to_string()).await;
            }
        };

        info!(%request, samples = request.sample_count(), "scan accepted");
        let outcome = ScanExecutor::new(&self.instruments, &self.timing)
            .execute(request, out)
            .await?;

        match outcome {
            ScanOutcome::Completed { .. } => self.stats.scans_completed += 1,
            ScanOutcome::Aborted { .. } => self.stats.scans_aborted += 1,
        }
        Ok(())
    }
}
