//! `help` text.

use crate::protocol::{COLUMN_HEADER, DATA_END, DATA_START};
use crate::scan::ScanDefaults;

/// The block printed in response to `help`.
///
/// Only the defaults vary; everything else is fixed text.
pub fn help_lines(defaults: &ScanDefaults) -> Vec<String> {
    vec![
        "Available commands:".to_string(),
        "  help                      Show this message".to_string(),
        "  home                      Move the polarizer to 0 degrees".to_string(),
        "  led on | led off          Switch the light source".to_string(),
        "  run [start] [end] [step]  Sweep the polarizer and stream readings".to_string(),
        "Arguments:".to_string(),
        "  start, end  0-180 degrees, must differ".to_string(),
        "  step        1-180 degrees".to_string(),
        format!(
            "  defaults    start={} end={} step={}",
            defaults.start, defaults.end, defaults.step
        ),
        "Data stream:".to_string(),
        format!("  {DATA_START}"),
        format!("  {COLUMN_HEADER}"),
        "  <angle>,<intensity>".to_string(),
        format!("  {DATA_END}"),
    ]
}
