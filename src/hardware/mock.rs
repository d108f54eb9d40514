//! Mock Hardware Implementations
//!
//! Provides a simulated polarimetry bench for running without physical hardware.
//! All mock devices use async-safe operations (tokio::time::sleep, not std::thread::sleep).
//!
//! # Available Mocks
//!
//! - `MockActuator` - Simulated rotation servo, records every commanded move
//! - `MockLightSource` - Simulated LED with a toggle counter
//! - `MockDetector` - Simulated photodiode following Malus's law over the actuator angle,
//!   or replaying a scripted sequence of readings
//! - `MockBench` - All three, wired together
//!
//! # Coupling
//!
//! The detector observes the actuator angle and the light state through shared handles,
//! the way the real bench couples them through optics:
//!
//! ```rust,ignore
//! let actuator = MockActuator::new();
//! let light = MockLightSource::new();
//! let detector = MockDetector::malus(&actuator, &light, MalusModel::default());
//! ```

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{sleep, Duration};

use crate::config::SimulationConfig;
use crate::hardware::capabilities::{
    Actuator, Detector, LightSource, MAX_ANGLE_DEG, MAX_INTENSITY,
};
use crate::hardware::Instruments;

// =============================================================================
// MockActuator - Simulated Rotation Servo
// =============================================================================

/// One position command as seen by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandedMove {
    /// Target angle in degrees
    pub angle_deg: u16,
    /// Settle time the caller asked for
    pub settle: Duration,
}

/// Mock rotation actuator
///
/// Simulates a hobby servo carrying the polarizer:
/// - Rejects angles above 180°
/// - Jumps to the target and then blocks for the requested settle time
/// - Keeps a log of every accepted move for inspection in tests
pub struct MockActuator {
    angle: Arc<RwLock<u16>>,
    moves: RwLock<Vec<CommandedMove>>,
}

impl MockActuator {
    /// Create new mock actuator parked at 0°
    pub fn new() -> Self {
        Self::with_angle(0)
    }

    /// Create new mock actuator parked at the given angle
    pub fn with_angle(initial_deg: u16) -> Self {
        Self {
            angle: Arc::new(RwLock::new(initial_deg.min(MAX_ANGLE_DEG))),
            moves: RwLock::new(Vec::new()),
        }
    }

    /// Current simulated angle
    pub async fn angle(&self) -> u16 {
        *self.angle.read().await
    }

    /// Every accepted move, in order
    pub async fn moves(&self) -> Vec<CommandedMove> {
        self.moves.read().await.clone()
    }

    /// Shared view of the angle, for coupling a detector
    fn angle_handle(&self) -> Arc<RwLock<u16>> {
        Arc::clone(&self.angle)
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Actuator for MockActuator {
    async fn set_position(&self, angle_deg: u16, settle: Duration) -> Result<()> {
        if angle_deg > MAX_ANGLE_DEG {
            bail!(
                "MockActuator: angle {}° outside 0-{}°",
                angle_deg,
                MAX_ANGLE_DEG
            );
        }

        tracing::trace!(angle_deg, settle_ms = settle.as_millis() as u64, "MockActuator: moving");
        *self.angle.write().await = angle_deg;
        self.moves.write().await.push(CommandedMove { angle_deg, settle });

        // CRITICAL: Use tokio::time::sleep, NOT std::thread::sleep
        sleep(settle).await;
        Ok(())
    }
}

// =============================================================================
// MockLightSource - Simulated LED
// =============================================================================

/// Mock light source
///
/// Tracks on/off state and counts every state change.
pub struct MockLightSource {
    on: Arc<RwLock<bool>>,
    toggles: AtomicU64,
}

impl MockLightSource {
    /// Create new mock light source, initially off
    pub fn new() -> Self {
        Self::with_state(false)
    }

    /// Create new mock light source in the given state
    pub fn with_state(on: bool) -> Self {
        Self {
            on: Arc::new(RwLock::new(on)),
            toggles: AtomicU64::new(0),
        }
    }

    /// Number of actual on/off transitions since creation
    pub fn toggle_count(&self) -> u64 {
        self.toggles.load(Ordering::SeqCst)
    }

    fn state_handle(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.on)
    }

    async fn set(&self, lit: bool) {
        let mut state = self.on.write().await;
        if *state != lit {
            *state = lit;
            self.toggles.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Default for MockLightSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LightSource for MockLightSource {
    async fn turn_on(&self) -> Result<()> {
        self.set(true).await;
        Ok(())
    }

    async fn turn_off(&self) -> Result<()> {
        self.set(false).await;
        Ok(())
    }

    async fn is_on(&self) -> Result<bool> {
        Ok(*self.on.read().await)
    }
}

// =============================================================================
// MockDetector - Simulated Photodiode
// =============================================================================

/// Malus's-law response of the simulated optics
///
/// `dark + (max - dark) * sin²(θ - θ_ext)` while lit, `dark` otherwise,
/// plus uniform noise of `±noise` counts, clamped to the 10-bit range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MalusModel {
    /// Angle at which transmission is minimal, in degrees
    pub extinction_angle_deg: f64,
    /// Reading at full transmission
    pub max_intensity: u16,
    /// Reading with no light reaching the detector
    pub dark_level: u16,
    /// Peak uniform noise, in counts
    pub noise_amplitude: u16,
}

impl MalusModel {
    /// Noise-free intensity for a polarizer angle
    pub fn ideal(&self, angle_deg: f64, lit: bool) -> f64 {
        let dark = f64::from(self.dark_level);
        if !lit {
            return dark;
        }
        let span = f64::from(self.max_intensity) - dark;
        let phase = (angle_deg - self.extinction_angle_deg).to_radians();
        dark + span * phase.sin().powi(2)
    }
}

impl Default for MalusModel {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for MalusModel {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            extinction_angle_deg: config.extinction_angle_deg,
            max_intensity: config.max_intensity,
            dark_level: config.dark_level,
            noise_amplitude: config.noise_amplitude,
        }
    }
}

enum Response {
    Malus {
        angle: Arc<RwLock<u16>>,
        lit: Arc<RwLock<bool>>,
        model: MalusModel,
    },
    Scripted(Mutex<VecDeque<u16>>),
}

/// Mock photodetector
///
/// Either models the optics of the bench (`malus`) or replays a fixed list of
/// readings (`scripted`). A scripted detector fails once its list is exhausted,
/// which is how tests exercise a driver fault in the middle of a scan.
pub struct MockDetector {
    response: Response,
    reads: AtomicU64,
}

impl MockDetector {
    /// Detector coupled to the given actuator and light source
    pub fn malus(actuator: &MockActuator, light: &MockLightSource, model: MalusModel) -> Self {
        Self {
            response: Response::Malus {
                angle: actuator.angle_handle(),
                lit: light.state_handle(),
                model,
            },
            reads: AtomicU64::new(0),
        }
    }

    /// Detector that returns `readings` in order, then errors
    pub fn scripted(readings: impl IntoIterator<Item = u16>) -> Self {
        Self {
            response: Response::Scripted(Mutex::new(readings.into_iter().collect())),
            reads: AtomicU64::new(0),
        }
    }

    /// Number of successful reads so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn read_intensity(&self) -> Result<u16> {
        let value = match &self.response {
            Response::Malus { angle, lit, model } => {
                let angle_deg = f64::from(*angle.read().await);
                let lit = *lit.read().await;
                let noise = if model.noise_amplitude == 0 {
                    0.0
                } else {
                    let amplitude = f64::from(model.noise_amplitude);
                    rand::thread_rng().gen_range(-amplitude..=amplitude)
                };
                (model.ideal(angle_deg, lit) + noise)
                    .round()
                    .clamp(0.0, f64::from(MAX_INTENSITY)) as u16
            }
            Response::Scripted(queue) => queue
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| anyhow!("MockDetector: scripted readings exhausted"))?,
        };

        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}

// =============================================================================
// MockBench - the three mocks wired together
// =============================================================================

/// A complete simulated bench
///
/// Keeps typed handles to each mock for inspection while
/// [`MockBench::instruments`] hands the same objects to the engine.
pub struct MockBench {
    /// Rotation servo
    pub actuator: Arc<MockActuator>,
    /// Photodiode, coupled to `actuator` and `light`
    pub detector: Arc<MockDetector>,
    /// LED, initially off
    pub light: Arc<MockLightSource>,
}

impl MockBench {
    /// Bench with Malus's-law optics described by `config`
    pub fn new(config: &SimulationConfig) -> Self {
        let actuator = MockActuator::new();
        let light = MockLightSource::new();
        let detector = MockDetector::malus(&actuator, &light, MalusModel::from(config));
        Self {
            actuator: Arc::new(actuator),
            detector: Arc::new(detector),
            light: Arc::new(light),
        }
    }

    /// Bench whose detector replays `readings`
    pub fn scripted(readings: impl IntoIterator<Item = u16>) -> Self {
        Self {
            actuator: Arc::new(MockActuator::new()),
            detector: Arc::new(MockDetector::scripted(readings)),
            light: Arc::new(MockLightSource::new()),
        }
    }

    /// Trait-object view for the engine
    pub fn instruments(&self) -> Instruments {
        Instruments::new(
            Arc::clone(&self.actuator) as Arc<dyn Actuator>,
            Arc::clone(&self.detector) as Arc<dyn Detector>,
            Arc::clone(&self.light) as Arc<dyn LightSource>,
        )
    }
}
