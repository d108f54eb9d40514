//! Polarizer sweeps.
//!
//! - [`request`]: the validated [`ScanRequest`] and the `run` argument parser
//! - [`executor`]: drives actuator and detector in lock-step and streams samples

pub mod executor;
pub mod request;

pub use executor::{ScanExecutor, ScanOutcome};
pub use request::{
    parse_scan_args, ArgPolicy, ScanArg, ScanDefaults, ScanParamError, ScanRequest,
    MAX_STEP_DEG, MIN_STEP_DEG,
};

/// One point of a sweep: commanded angle and the raw detector reading taken there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSample {
    /// Commanded actuator angle, degrees
    pub angle: u16,
    /// Raw detector counts, passed through unfiltered
    pub intensity: u16,
}
