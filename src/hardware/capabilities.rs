//! Instrument Capabilities
//!
//! This module defines the narrow capability traits the orchestration engine talks to.
//! The engine never knows which concrete device sits behind a trait: the bench it drives
//! is assembled once at process start and handed to the engine by reference.
//!
//! - A rotation actuator implements: `Actuator`
//! - A photodetector implements: `Detector`
//! - A lamp or LED implements: `LightSource`
//!
//! # Design Philosophy
//!
//! Each capability trait:
//! - Is async (uses #[async_trait])
//! - Is thread-safe (requires Send + Sync)
//! - Uses anyhow::Result for errors
//! - Focuses on ONE thing
//!
//! Driver state (current angle, on/off) is owned by the driver. Interior mutability
//! is the driver's business; every method takes `&self`.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn sample_at<A, D>(actuator: &A, detector: &D, angle: u16) -> Result<u16>
//! where
//!     A: Actuator,
//!     D: Detector,
//! {
//!     actuator.set_position(angle, Duration::from_millis(50)).await?;
//!     detector.read_intensity().await
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Lowest angle the actuator accepts, in degrees.
pub const MIN_ANGLE_DEG: u16 = 0;

/// Highest angle the actuator accepts, in degrees.
pub const MAX_ANGLE_DEG: u16 = 180;

/// Full-scale reading of the reference 10-bit detector.
pub const MAX_INTENSITY: u16 = 1023;

/// Capability: Angular Positioning
///
/// Devices that rotate to an absolute angle (hobby servos, rotation mounts).
///
/// # Contract
/// - Angles are whole degrees in `MIN_ANGLE_DEG..=MAX_ANGLE_DEG`
/// - `set_position` returns only after the settle duration has elapsed
/// - Out-of-range angles are an error and cause no motion
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Move to an absolute angle and wait `settle` before returning
    ///
    /// # Returns
    /// - Ok(()) once the actuator has been commanded and the settle time has passed
    /// - Err if the angle is out of range or on hardware error
    async fn set_position(&self, angle_deg: u16, settle: Duration) -> Result<()>;

    /// Return to the mechanical zero
    ///
    /// Defined as `set_position(0, extended_settle)`.
    async fn home(&self, extended_settle: Duration) -> Result<()> {
        self.set_position(MIN_ANGLE_DEG, extended_settle).await
    }
}

/// Capability: Intensity Readout
///
/// Devices that return a single quantized light intensity (photodiodes, LDRs behind an ADC).
///
/// # Contract
/// - The value is raw ADC counts, no unit conversion
/// - Bounded by the converter resolution (`0..=MAX_INTENSITY` on the reference hardware)
/// - Reading is fast compared to a settle delay
#[async_trait]
pub trait Detector: Send + Sync {
    /// Take one intensity sample
    async fn read_intensity(&self) -> Result<u16>;
}

/// Capability: Switched Illumination
///
/// Devices that are either lit or dark (LEDs, shuttered lamps).
#[async_trait]
pub trait LightSource: Send + Sync {
    /// Switch the source on (idempotent)
    async fn turn_on(&self) -> Result<()>;

    /// Switch the source off (idempotent)
    async fn turn_off(&self) -> Result<()>;

    /// Report whether the source is currently on
    async fn is_on(&self) -> Result<bool>;
}
