//! # polscan
//!
//! Control software for a single-axis polarization scanner. A servo turns a polarizing
//! filter through an angular range, a photodetector is sampled at every step, and the
//! readings are streamed to the operator over a line-oriented text channel.
//!
//! ## Crate Structure
//!
//! - **`engine`**: `MeasurementEngine`, the command loop. It echoes and classifies each
//!   line and then homes, switches the light, prints help or runs a scan.
//! - **`command`**: parsing of one operator line into a `Command`.
//! - **`scan`**: `ScanRequest` validation from `run` arguments, and the `ScanExecutor` that
//!   sweeps the actuator and streams framed samples.
//! - **`help`**: the `help` text.
//! - **`protocol`**: every string that goes on the wire, including the data framing markers.
//! - **`transport`**: `LineSource` / `LineSink` traits and their stdio, serial and in-memory
//!   implementations.
//! - **`hardware`**: capability traits for the actuator, detector and light source, plus a
//!   simulated bench.
//! - **`config`**: Figment-based configuration (TOML file + `POLSCAN_` environment).
//! - **`logging`**: `tracing-subscriber` setup (always to stderr).
//! - **`error`**: the application error type.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod hardware;
pub mod help;
pub mod logging;
pub mod protocol;
pub mod scan;
pub mod transport;
