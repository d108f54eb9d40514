//! Scan execution.
//!
//! Runs one validated [`ScanRequest`] to completion on the calling task:
//!
//! 1. Force the light source on if it is off, then wait for it to stabilize
//! 2. Print the effective parameters, `---DATA_START---` and the column header
//! 3. Move to the start angle with the extended settle delay
//! 4. For each angle: move (short settle), read the detector, emit `<angle>,<intensity>`
//! 5. Print `---DATA_END---` and a completion line
//!
//! Samples are written as they are taken; nothing is buffered. Readings are passed
//! through exactly as the detector returns them.
//!
//! If a driver fails part-way, the data block is still closed with `---DATA_END---`,
//! followed by one `Error:` line, so the framing seen by the operator stays intact.
//! Only a failing line sink is returned as `Err`.

use crate::config::TimingConfig;
use crate::error::{AppResult, PolscanError};
use crate::hardware::Instruments;
use crate::protocol;
use crate::scan::{ScanRequest, ScanSample};
use crate::transport::LineSink;
use anyhow::Context;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument, warn};

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every angle was sampled
    Completed {
        /// Samples streamed
        samples: usize,
    },
    /// A driver failed; the stream was closed early
    Aborted {
        /// Samples streamed before the failure
        samples: usize,
        /// Driver error, as reported to the operator
        error: String,
    },
}

impl ScanOutcome {
    /// Samples streamed, whether or not the scan finished
    pub fn samples(&self) -> usize {
        match self {
            ScanOutcome::Completed { samples } | ScanOutcome::Aborted { samples, .. } => *samples,
        }
    }
}

enum Fault {
    Transport(PolscanError),
    Instrument(anyhow::Error),
}

impl From<PolscanError> for Fault {
    fn from(value: PolscanError) -> Self {
        Fault::Transport(value)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(value: anyhow::Error) -> Self {
        Fault::Instrument(value)
    }
}

/// Executes sweeps against one bench.
pub struct ScanExecutor<'a> {
    instruments: &'a Instruments,
    timing: &'a TimingConfig,
}

impl<'a> ScanExecutor<'a> {
    /// Borrow the bench and its timing for the duration of a scan
    pub fn new(instruments: &'a Instruments, timing: &'a TimingConfig) -> Self {
        Self {
            instruments,
            timing,
        }
    }

    /// Run `request` to completion, streaming to `out`.
    #[instrument(
        name = "scan",
        skip_all,
        fields(start = request.start(), end = request.end(), step = request.step())
    )]
    pub async fn execute(
        &self,
        request: ScanRequest,
        out: &mut dyn LineSink,
    ) -> AppResult<ScanOutcome> {
        let started = Instant::now();

        match self.ensure_light(out).await {
            Ok(()) => {}
            Err(Fault::Transport(e)) => return Err(e),
            Err(Fault::Instrument(e)) => {
                // Nothing has been framed yet
                error!(error = %format!("{e:#}"), "scan not started");
                out.write_line(&protocol::instrument_error(&e)).await?;
                return Ok(ScanOutcome::Aborted {
                    samples: 0,
                    error: format!("{e:#}"),
                });
            }
        }

        for line in protocol::scan_header(&request) {
            out.write_line(&line).await?;
        }
        out.write_line(protocol::DATA_START).await?;
        out.write_line(protocol::COLUMN_HEADER).await?;

        let mut samples = 0;
        match self.sweep(request, out, &mut samples).await {
            Ok(()) => {
                out.write_line(protocol::DATA_END).await?;
                out.write_line(protocol::SCAN_COMPLETE).await?;
                info!(
                    samples,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scan complete"
                );
                Ok(ScanOutcome::Completed { samples })
            }
            Err(Fault::Instrument(e)) => {
                out.write_line(protocol::DATA_END).await?;
                error!(samples, error = %format!("{e:#}"), "scan aborted");
                out.write_line(&protocol::instrument_error(&e)).await?;
                Ok(ScanOutcome::Aborted {
                    samples,
                    error: format!("{e:#}"),
                })
            }
            Err(Fault::Transport(e)) => Err(e),
        }
    }

    async fn ensure_light(&self, out: &mut dyn LineSink) -> Result<(), Fault> {
        let light = &self.instruments.light;
        if light.is_on().await.context("querying light source")? {
            return Ok(());
        }

        warn!("light source off at scan start, turning it on");
        out.write_line(protocol::LED_OFF_WARNING).await?;
        light.turn_on().await.context("turning light source on")?;
        sleep(self.timing.light_stabilize()).await;
        Ok(())
    }

    async fn sweep(
        &self,
        request: ScanRequest,
        out: &mut dyn LineSink,
        samples: &mut usize,
    ) -> Result<(), Fault> {
        let actuator = &self.instruments.actuator;
        let detector = &self.instruments.detector;

        // Worst-case travel to the start angle
        actuator
            .set_position(request.start(), self.timing.extended_settle())
            .await
            .with_context(|| format!("moving to start angle {}", request.start()))?;

        for angle in request.angles() {
            actuator
                .set_position(angle, self.timing.step_settle())
                .await
                .with_context(|| format!("moving to {angle} degrees"))?;
            let intensity = detector
                .read_intensity()
                .await
                .with_context(|| format!("reading detector at {angle} degrees"))?;

            let sample = ScanSample { angle, intensity };
            debug!(angle, intensity, "sample");
            out.write_line(&protocol::sample(&sample)).await?;
            *samples += 1;
        }

        Ok(())
    }
}
