//! Scan parameters: the validated request and the `run` argument parser.
//!
//! `run` takes up to three positional integers, `start end step`. Omitted trailing
//! arguments come from [`ScanDefaults`]. Extra tokens are ignored.
//!
//! Under [`ArgPolicy::Lenient`] a token is read the way C's `atol` reads it: optional
//! sign, then as many digits as are present. `12abc` is 12 and `abc` is 0, so a typo
//! becomes a zero angle rather than an error. [`ArgPolicy::Strict`] rejects anything
//! that is not a plain integer.

use crate::config::ScanConfig;
use crate::hardware::capabilities::{MAX_ANGLE_DEG, MIN_ANGLE_DEG};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Smallest accepted step, in degrees.
pub const MIN_STEP_DEG: u16 = 1;

/// Largest accepted step, in degrees.
pub const MAX_STEP_DEG: u16 = MAX_ANGLE_DEG;

const ANGLE_RANGE: RangeInclusive<i64> = MIN_ANGLE_DEG as i64..=MAX_ANGLE_DEG as i64;
const STEP_RANGE: RangeInclusive<i64> = MIN_STEP_DEG as i64..=MAX_STEP_DEG as i64;

/// Which positional `run` argument a problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanArg {
    /// First argument
    Start,
    /// Second argument
    End,
    /// Third argument
    Step,
}

impl fmt::Display for ScanArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanArg::Start => write!(f, "start angle"),
            ScanArg::End => write!(f, "end angle"),
            ScanArg::Step => write!(f, "step"),
        }
    }
}

/// Why a `run` request was refused.
///
/// `Display` is the exact line sent to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanParamError {
    /// Start angle outside 0-180
    #[error("Error: Start angle must be between 0 and 180 (got {0})")]
    StartOutOfRange(i64),

    /// End angle outside 0-180
    #[error("Error: End angle must be between 0 and 180 (got {0})")]
    EndOutOfRange(i64),

    /// Step outside 1-180
    #[error("Error: Step must be between 1 and 180 (got {0})")]
    StepOutOfRange(i64),

    /// Start and end are the same angle
    #[error("Error: Start and end angles must be different")]
    SameAngles,

    /// Non-integer argument under [`ArgPolicy::Strict`]
    #[error("Error: '{token}' is not a valid {arg}")]
    NotANumber {
        /// Argument position
        arg: ScanArg,
        /// Offending text
        token: String,
    },
}

/// How non-numeric `run` arguments are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArgPolicy {
    /// Read like `atol`: numeric prefix, or 0 when there is none
    #[default]
    Lenient,
    /// Reject anything that is not a plain integer
    Strict,
}

/// Values substituted for omitted `run` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDefaults {
    /// Start angle
    pub start: u16,
    /// End angle
    pub end: u16,
    /// Step
    pub step: u16,
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self {
            start: MIN_ANGLE_DEG,
            end: MAX_ANGLE_DEG,
            step: MIN_STEP_DEG,
        }
    }
}

impl From<&ScanConfig> for ScanDefaults {
    fn from(config: &ScanConfig) -> Self {
        Self {
            start: config.default_start,
            end: config.default_end,
            step: config.default_step,
        }
    }
}

/// A sweep that satisfies every range invariant.
///
/// Only constructible through [`ScanRequest::new`] (or [`parse_scan_args`]), so holding
/// one means `start` and `end` are in 0-180, `step` is in 1-180, and `start != end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    start: u16,
    end: u16,
    step: u16,
}

impl ScanRequest {
    /// Check the invariants in order: start range, end range, step range, then equality.
    pub fn new(start: i64, end: i64, step: i64) -> Result<Self, ScanParamError> {
        let start = to_degrees(start, &ANGLE_RANGE).ok_or(ScanParamError::StartOutOfRange(start))?;
        let end = to_degrees(end, &ANGLE_RANGE).ok_or(ScanParamError::EndOutOfRange(end))?;
        let step = to_degrees(step, &STEP_RANGE).ok_or(ScanParamError::StepOutOfRange(step))?;
        if start == end {
            return Err(ScanParamError::SameAngles);
        }
        Ok(Self { start, end, step })
    }

    /// First angle of the sweep
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Bound of the sweep; sampled only if it lies on the step grid
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Step size in degrees
    pub fn step(&self) -> u16 {
        self.step
    }

    /// `+1` when sweeping upwards, `-1` when sweeping downwards
    pub fn direction(&self) -> i32 {
        if self.end > self.start {
            1
        } else {
            -1
        }
    }

    /// Number of samples the sweep produces: `floor(|end - start| / step) + 1`
    pub fn sample_count(&self) -> usize {
        usize::from(self.start.abs_diff(self.end) / self.step) + 1
    }

    /// Angles visited, in traversal order
    ///
    /// Starts at `start` and advances by `step` until the next angle would pass `end`.
    /// When `step` does not divide the range, `end` itself is not visited.
    pub fn angles(&self) -> impl Iterator<Item = u16> {
        let direction = self.direction();
        let stride = i32::from(self.step) * direction;
        let end = i32::from(self.end);
        std::iter::successors(Some(i32::from(self.start)), move |angle| Some(angle + stride))
            .take_while(move |angle| {
                if direction > 0 {
                    *angle <= end
                } else {
                    *angle >= end
                }
            })
            .map_while(|angle| u16::try_from(angle).ok())
    }
}

impl fmt::Display for ScanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} step {}", self.start, self.end, self.step)
    }
}

fn to_degrees(value: i64, range: &RangeInclusive<i64>) -> Option<u16> {
    if range.contains(&value) {
        u16::try_from(value).ok()
    } else {
        None
    }
}

/// Build a [`ScanRequest`] from the text following `run`.
///
/// Either all three values are accepted together or the whole request is refused.
pub fn parse_scan_args(
    args: &str,
    defaults: ScanDefaults,
    policy: ArgPolicy,
) -> Result<ScanRequest, ScanParamError> {
    let mut values = [
        i64::from(defaults.start),
        i64::from(defaults.end),
        i64::from(defaults.step),
    ];
    let positions = [ScanArg::Start, ScanArg::End, ScanArg::Step];

    let mut tokens = args.split_whitespace();
    for (slot, arg) in values.iter_mut().zip(positions) {
        let Some(token) = tokens.next() else { break };
        *slot = parse_token(token, arg, policy)?;
    }

    let ignored = tokens.count();
    if ignored > 0 {
        tracing::debug!(ignored, "run: ignoring extra arguments");
    }

    ScanRequest::new(values[0], values[1], values[2])
}

fn parse_token(token: &str, arg: ScanArg, policy: ArgPolicy) -> Result<i64, ScanParamError> {
    match policy {
        ArgPolicy::Strict => token.parse::<i64>().map_err(|_| ScanParamError::NotANumber {
            arg,
            token: token.to_string(),
        }),
        ArgPolicy::Lenient => Ok(leading_integer(token)),
    }
}

/// `atol`-style read: optional sign then decimal digits, 0 when no digits lead.
///
/// Saturates instead of overflowing; the range check rejects such values anyway.
fn leading_integer(token: &str) -> i64 {
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(args: &str) -> Result<ScanRequest, ScanParamError> {
        parse_scan_args(args, ScanDefaults::default(), ArgPolicy::Lenient)
    }

    #[test]
    fn no_arguments_uses_defaults() {
        let request = lenient("").unwrap();
        assert_eq!((request.start(), request.end(), request.step()), (0, 180, 1));
        assert_eq!(request.sample_count(), 181);
    }

    #[test]
    fn trailing_arguments_fall_back_to_defaults() {
        let request = lenient("  30 ").unwrap();
        assert_eq!((request.start(), request.end(), request.step()), (30, 180, 1));

        let request = lenient("30 60").unwrap();
        assert_eq!((request.start(), request.end(), request.step()), (30, 60, 1));
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let request = lenient("10 20 5 99 banana").unwrap();
        assert_eq!((request.start(), request.end(), request.step()), (10, 20, 5));
    }

    #[test]
    fn non_numeric_tokens_read_as_zero() {
        let request = lenient("abc 90").unwrap();
        assert_eq!((request.start(), request.end()), (0, 90));

        // End reads as 0, a valid sweep back down to zero
        let request = lenient("90 xyz").unwrap();
        assert_eq!((request.start(), request.end(), request.step()), (90, 0, 1));

        // Step reads as 0, which is out of range
        assert_eq!(lenient("10 20 fast"), Err(ScanParamError::StepOutOfRange(0)));
    }

    #[test]
    fn numeric_prefix_is_honoured() {
        assert_eq!(leading_integer("12abc"), 12);
        assert_eq!(leading_integer("-7"), -7);
        assert_eq!(leading_integer("+5"), 5);
        assert_eq!(leading_integer("-"), 0);
        assert_eq!(leading_integer("x12"), 0);
        assert_eq!(leading_integer("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn strict_policy_rejects_non_numeric() {
        let err = parse_scan_args("10 abc", ScanDefaults::default(), ArgPolicy::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            ScanParamError::NotANumber {
                arg: ScanArg::End,
                token: "abc".to_string()
            }
        );
        assert_eq!(err.to_string(), "Error: 'abc' is not a valid end angle");
    }

    #[test]
    fn range_checks_run_in_order() {
        // Start is reported before end and step
        assert_eq!(lenient("200 300 0"), Err(ScanParamError::StartOutOfRange(200)));
        assert_eq!(lenient("10 300 0"), Err(ScanParamError::EndOutOfRange(300)));
        assert_eq!(lenient("10 10 0"), Err(ScanParamError::StepOutOfRange(0)));
        assert_eq!(lenient("10 10 1"), Err(ScanParamError::SameAngles));
        assert_eq!(lenient("-1 10"), Err(ScanParamError::StartOutOfRange(-1)));
        assert_eq!(lenient("0 10 181"), Err(ScanParamError::StepOutOfRange(181)));
    }

    #[test]
    fn angles_ascending_and_descending() {
        let up: Vec<u16> = lenient("10 90 5").unwrap().angles().collect();
        assert_eq!(up.len(), 17);
        assert_eq!(up.first(), Some(&10));
        assert_eq!(up.last(), Some(&90));

        let down: Vec<u16> = lenient("90 10 5").unwrap().angles().collect();
        assert_eq!(down, up.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn unaligned_end_is_not_sampled() {
        let request = lenient("0 10 3").unwrap();
        let angles: Vec<u16> = request.angles().collect();
        assert_eq!(angles, vec![0, 3, 6, 9]);
        assert_eq!(request.sample_count(), angles.len());
    }

    #[test]
    fn full_range_step_visits_both_ends() {
        let angles: Vec<u16> = lenient("180 0 180").unwrap().angles().collect();
        assert_eq!(angles, vec![180, 0]);
    }

    #[test]
    fn sample_count_matches_angles_exhaustively() {
        for start in (0..=180).step_by(15) {
            for end in (0..=180).step_by(20) {
                for step in [1, 2, 7, 45, 180] {
                    let Ok(request) = ScanRequest::new(start, end, step) else {
                        continue;
                    };
                    assert_eq!(request.angles().count(), request.sample_count());
                }
            }
        }
    }
}
