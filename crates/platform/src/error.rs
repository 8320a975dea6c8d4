//! Configuration-time errors.
//!
//! Every failure here is detected while elaborating a deployment, before any
//! clock or PDM behaviour exists. There is no runtime recovery: a clock tree
//! that cannot be generated, or a rail that cannot be reached, is refused.
//! PLL lock loss is *not* an error; the reset sequencer handles it.

use crate::clock_config::ClockDomain;
use crate::units::MegaHertz;
use crate::vccio_config::VccioChannel;

/// Reasons a deployment configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The reference clock frequency has no entry in the PLL frequency table.
    UnsupportedFrequency {
        /// Offending reference frequency in Hz.
        reference_hz: u32,
    },
    /// A named domain requested a frequency that is not one of the PLL taps.
    InvalidDomainFrequency {
        /// Domain whose request was rejected.
        domain: ClockDomain,
        /// Requested frequency.
        requested: MegaHertz,
    },
    /// A channel that must be driven has no target voltage.
    MissingVoltageConfiguration {
        /// Channel without a voltage.
        channel: VccioChannel,
    },
    /// A channel's target voltage cannot be produced, or is outside what the
    /// attached devices tolerate.
    InvalidVoltage {
        /// Channel with the bad voltage.
        channel: VccioChannel,
        /// Requested voltage in volts.
        volts: f64,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedFrequency { reference_hz } => write!(
                f,
                "Unsupported reference clock frequency {}.{:06} MHz",
                reference_hz / 1_000_000,
                reference_hz % 1_000_000
            ),
            Self::InvalidDomainFrequency { domain, requested } => write!(
                f,
                "Domain '{domain}' requested {requested}; valid choices are 60, 120 and 240 MHz"
            ),
            Self::MissingVoltageConfiguration { channel } => write!(
                f,
                "No target voltage for {channel}; VCCIO configuration is required for ULPI USB to function"
            ),
            Self::InvalidVoltage { channel, volts } => {
                write!(f, "Target voltage {volts} V cannot be produced on {channel}")
            }
        }
    }
}
