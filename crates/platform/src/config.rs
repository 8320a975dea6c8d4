//! Per-deployment configuration and project constants.
//!
//! A `DeploymentConfig` is fixed for one configuration epoch: there is no
//! runtime reconfiguration path. Host tooling loads it from JSON (feature
//! `serde`); firmware-style callers build it in code.

use crate::clock_config::{DomainOverrides, ReferenceClock};
use crate::units::Volts;
use crate::vccio_config::VccioVoltages;

/// The project name
pub const APP_NAME: &str = "ButterStick bring-up";

/// Project version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Choices made for one deployment of the design.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeploymentConfig {
    /// Reference clock for the domain generator.
    pub reference: ReferenceClock,
    /// Domain frequencies that differ from the board defaults.
    pub clock_frequencies: DomainOverrides,
    /// Target VCCIO rail voltages.
    pub vccio: VccioVoltages,
    /// Whether the ULPI USB PHY is in use.
    pub usb: bool,
}

impl DeploymentConfig {
    /// USB device bring-up: board clock, default domains, SYZYGY 0/1 at 3.3 V
    /// and the ULPI bank at 1.8 V.
    #[must_use]
    pub fn usb_device() -> Self {
        Self {
            reference: ReferenceClock::BoardDefault,
            clock_frequencies: DomainOverrides::NONE,
            vccio: VccioVoltages([Some(Volts::V3_3), Some(Volts::V3_3), Some(Volts::V1_8)]),
            usb: true,
        }
    }

    /// Self-test from the on-die oscillator; no USB.
    #[must_use]
    pub fn oscillator_self_test() -> Self {
        Self {
            reference: ReferenceClock::InternalOscillator,
            usb: false,
            ..Self::usb_device()
        }
    }
}
