//! Instrument collaborators.
//!
//! [`capabilities`] holds the traits the engine depends on, [`mock`] the simulated bench.
//! [`Instruments`] bundles one driver per role. It is built once at start-up and handed
//! to the engine, which never reaches for hardware any other way.

pub mod capabilities;
pub mod mock;

use capabilities::{Actuator, Detector, LightSource};
use std::sync::Arc;

/// The three drivers of one bench.
#[derive(Clone)]
pub struct Instruments {
    /// Polarizer rotation
    pub actuator: Arc<dyn Actuator>,
    /// Photodetector
    pub detector: Arc<dyn Detector>,
    /// Illumination
    pub light: Arc<dyn LightSource>,
}

impl Instruments {
    /// Bundle explicit drivers
    pub fn new(
        actuator: Arc<dyn Actuator>,
        detector: Arc<dyn Detector>,
        light: Arc<dyn LightSource>,
    ) -> Self {
        Self {
            actuator,
            detector,
            light,
        }
    }
}

impl std::fmt::Debug for Instruments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instruments").finish_non_exhaustive()
    }
}
