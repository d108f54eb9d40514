//! Wire text of the operator protocol.
//!
//! Everything the instrument says on the line channel is spelled here, so the
//! framing that downstream parsers depend on lives in one place.
//!
//! A scan stream looks like:
//!
//! ```text
//! ---DATA_START---
//! Angle,Intensity
//! 0,12
//! 1,13
//! ---DATA_END---
//! ```

use crate::scan::{ScanRequest, ScanSample};

/// Opens a scan's sample block.
pub const DATA_START: &str = "---DATA_START---";

/// Closes a scan's sample block.
pub const DATA_END: &str = "---DATA_END---";

/// Column header, the first line inside the block.
pub const COLUMN_HEADER: &str = "Angle,Intensity";

/// Prefix for echoed operator input.
pub const ECHO_PREFIX: &str = "> ";

/// Echo of a received command.
pub fn echo(line: &str) -> String {
    format!("{ECHO_PREFIX}{line}")
}

/// One `<angle>,<intensity>` record.
pub fn sample(sample: &ScanSample) -> String {
    format!("{},{}", sample.angle, sample.intensity)
}

/// Informational lines printed before the data block.
pub fn scan_header(request: &ScanRequest) -> [String; 3] {
    [
        format!("Start angle: {}", request.start()),
        format!("End angle: {}", request.end()),
        format!("Step: {}", request.step()),
    ]
}

/// Printed when a scan finds the light source off.
pub const LED_OFF_WARNING: &str = "Warning: LED is off, turning it on";

/// Printed after the closing marker of a finished scan.
pub const SCAN_COMPLETE: &str = "Scan complete";

/// Printed before homing starts.
pub const HOMING: &str = "Homing...";

/// Printed after homing.
pub const HOME_COMPLETE: &str = "Home complete (0 degrees)";

/// Reply to `led on`.
pub const LED_ON: &str = "LED on";

/// Reply to `led off`.
pub const LED_OFF: &str = "LED off";

/// Reply to a `led` command with anything but `on` / `off`.
pub fn invalid_led_state(arg: &str) -> String {
    format!("Error: Invalid LED state '{arg}'. Use 'led on' or 'led off'")
}

/// Reply to an unrecognized command.
pub fn invalid_command(raw: &str) -> String {
    format!("Error: Invalid command '{raw}'. Type 'help' for a list of commands")
}

/// Reply when a driver call fails.
pub fn instrument_error(error: &anyhow::Error) -> String {
    format!("Error: {error:#}")
}
