//! VCCIO regulator configuration for the three SYZYGY I/O banks.
//!
//! Each bank's I/O voltage comes from a buck regulator whose feedback node is
//! pulled by a PDM line from the FPGA. The PDM output has a DC output
//! impedance of 68 kΩ and behaves like a `3.3 V · x` source (x = duty) in
//! series with it. Three resistors meet at the feedback node:
//!
//! ```text
//!             53.6k
//!   VIO ─────/\/\/\────┐
//!             68k      │
//!   PDM(3.3x)/\/\/\────┼──── FB (regulated to 0.6 V)
//!             13k      │
//!   GND ─────/\/\/\────┘
//! ```
//!
//! The regulator adjusts VIO until FB sits at 0.6 V. Solving the node by
//! Kirchhoff's current law gives a linear relation `VIO = b − m · x`, i.e.
//! `x = (b − VIO) / m`. The calibrated constants for this board are
//! `m = 2.601`, `b = 3.546`; they are used verbatim since any other formula
//! changes the physical rail voltage.

use crate::error::ConfigError;
use crate::units::Volts;

// ── Channels ─────────────────────────────────────────────────────────────────

/// Number of VCCIO PDM channels on the ButterStick.
pub const VCCIO_CHANNEL_COUNT: usize = 3;

/// A VCCIO PDM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VccioChannel {
    /// SYZYGY port 0 I/O bank.
    Syzygy0,
    /// SYZYGY port 1 I/O bank.
    Syzygy1,
    /// SYZYGY port 2 I/O bank, shared with the ULPI USB PHY.
    Syzygy2,
}

impl VccioChannel {
    /// All channels in PDM pin order.
    pub const ALL: [VccioChannel; VCCIO_CHANNEL_COUNT] =
        [VccioChannel::Syzygy0, VccioChannel::Syzygy1, VccioChannel::Syzygy2];

    /// Index into the `pdm` pin array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Syzygy0 => 0,
            Self::Syzygy1 => 1,
            Self::Syzygy2 => 2,
        }
    }

    /// Channel for a `pdm` pin index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Syzygy0),
            1 => Some(Self::Syzygy1),
            2 => Some(Self::Syzygy2),
            _ => None,
        }
    }
}

impl core::fmt::Display for VccioChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "vccio{}", self.index())
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

/// Linear calibration `x = (intercept − V) / slope` of one regulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VccioCalibration {
    /// Volts of rail change per unit of duty (`m`).
    pub slope: f64,
    /// Rail voltage at 0 % duty (`b`).
    pub intercept: f64,
}

impl VccioCalibration {
    /// Calibrated constants for the ButterStick VCCIO regulators.
    pub const BUTTERSTICK: Self = Self {
        slope: 2.601,
        intercept: 3.546,
    };

    /// Duty fraction (`limit`) needed for `voltage`: `(b − v) / m`.
    ///
    /// The result is not range-checked; values outside `[0, 1)` cannot be
    /// produced by the PDM line.
    #[must_use]
    pub fn duty_fraction(&self, voltage: Volts) -> f64 {
        (self.intercept - voltage.get()) / self.slope
    }

    /// Rail voltage produced by a duty fraction: `b − m · x`.
    #[must_use]
    pub fn voltage_at(&self, duty_fraction: f64) -> f64 {
        self.intercept - self.slope * duty_fraction
    }
}

/// Resistor network at a regulator's feedback node.
///
/// Kept to cross-check [`VccioCalibration::BUTTERSTICK`]; the board never
/// uses the derived values directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackNetwork {
    /// Resistor from the regulator output to FB, in ohms.
    pub r_output: f64,
    /// Series impedance of the PDM source, in ohms.
    pub r_pdm: f64,
    /// Resistor from FB to ground, in ohms.
    pub r_ground: f64,
    /// PDM high level, in volts.
    pub pdm_high: f64,
    /// Regulation point of the feedback node, in volts.
    pub feedback: f64,
}

impl FeedbackNetwork {
    /// Values from the ButterStick schematic.
    pub const BUTTERSTICK: Self = Self {
        r_output: 53_600.0,
        r_pdm: 68_000.0,
        r_ground: 13_000.0,
        pdm_high: 3.3,
        feedback: 0.6,
    };

    /// Solve the feedback node for `VIO = b − m · x`.
    #[must_use]
    pub fn derived_calibration(&self) -> VccioCalibration {
        // (VIO − fb)/r_out + (pdm·x − fb)/r_pdm = fb/r_gnd
        let fb = self.feedback;
        let intercept = fb + self.r_output * (fb / self.r_ground + fb / self.r_pdm);
        let slope = self.r_output * self.pdm_high / self.r_pdm;
        VccioCalibration { slope, intercept }
    }
}

// ── Per-channel board description ────────────────────────────────────────────

/// Static description of one VCCIO channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VccioChannelSpec {
    /// Which channel this describes.
    pub channel: VccioChannel,
    /// Regulator calibration.
    pub calibration: VccioCalibration,
    /// Inclusive voltage window the attached devices tolerate, if narrower
    /// than what the regulator can produce.
    pub allowed_range: Option<(f64, f64)>,
    /// The bank also carries the ULPI USB PHY, which needs its I/O voltage
    /// configured whenever USB is in use.
    pub hosts_usb: bool,
}

impl VccioChannelSpec {
    /// Whether this channel must have a voltage configured.
    #[must_use]
    pub const fn is_required(&self, usb_in_use: bool) -> bool {
        self.hosts_usb && usb_in_use
    }

    /// Whether `voltage` lies inside [`Self::allowed_range`].
    #[must_use]
    pub fn permits(&self, voltage: Volts) -> bool {
        match self.allowed_range {
            Some((min, max)) => (min..=max).contains(&voltage.get()),
            None => true,
        }
    }
}

// ── Per-deployment voltages ──────────────────────────────────────────────────

/// Target voltage for each VCCIO channel, `None` when unconfigured.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VccioVoltages(pub [Option<Volts>; VCCIO_CHANNEL_COUNT]);

impl VccioVoltages {
    /// No channel configured.
    pub const UNCONFIGURED: Self = Self([None; VCCIO_CHANNEL_COUNT]);

    /// Build from plain volts, `None` leaving a channel unconfigured.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidVoltage`] for the first value [`Volts::new`] rejects.
    pub fn from_volts(volts: [Option<f64>; VCCIO_CHANNEL_COUNT]) -> Result<Self, ConfigError> {
        let mut voltages = Self::UNCONFIGURED;
        for (channel, value) in VccioChannel::ALL.into_iter().zip(volts) {
            if let Some(value) = value {
                let volts = Volts::new(value).map_err(|_| ConfigError::InvalidVoltage { channel, volts: value })?;
                voltages = voltages.with(channel, volts);
            }
        }
        Ok(voltages)
    }

    /// Target voltage for `channel`.
    #[must_use]
    pub fn get(&self, channel: VccioChannel) -> Option<Volts> {
        self.0.get(channel.index()).copied().flatten()
    }

    /// Set the target voltage for `channel`.
    #[must_use]
    pub fn with(mut self, channel: VccioChannel, voltage: Volts) -> Self {
        if let Some(slot) = self.0.get_mut(channel.index()) {
            *slot = Some(voltage);
        }
        self
    }

    /// Whether any channel has a voltage.
    #[must_use]
    pub fn any_configured(&self) -> bool {
        self.0.iter().any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schematic_network_matches_calibrated_constants() {
        let derived = FeedbackNetwork::BUTTERSTICK.derived_calibration();
        let cal = VccioCalibration::BUTTERSTICK;
        assert!(
            (derived.slope - cal.slope).abs() < 1e-3,
            "slope {} vs calibrated {}",
            derived.slope,
            cal.slope
        );
        assert!(
            (derived.intercept - cal.intercept).abs() < 1e-3,
            "intercept {} vs calibrated {}",
            derived.intercept,
            cal.intercept
        );
    }

    #[test]
    fn duty_fraction_for_3v3() {
        let v = Volts::new(3.3).unwrap();
        let x = VccioCalibration::BUTTERSTICK.duty_fraction(v);
        assert!((x - 0.0946).abs() < 1e-4, "got {x}");
    }

    #[test]
    fn voltage_at_inverts_duty_fraction() {
        let cal = VccioCalibration::BUTTERSTICK;
        let v = Volts::new(2.5).unwrap();
        assert!((cal.voltage_at(cal.duty_fraction(v)) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn channel_index_round_trip() {
        for ch in VccioChannel::ALL {
            assert_eq!(VccioChannel::from_index(ch.index()), Some(ch));
        }
        assert_eq!(VccioChannel::from_index(3), None);
    }

    #[test]
    fn voltages_with_and_get() {
        let v = VccioVoltages::UNCONFIGURED.with(VccioChannel::Syzygy2, Volts::new(1.8).unwrap());
        assert!(v.any_configured());
        assert_eq!(v.get(VccioChannel::Syzygy0), None);
        assert_eq!(v.get(VccioChannel::Syzygy2).map(Volts::get), Some(1.8));
    }

    #[test]
    fn from_volts_leaves_none_unconfigured() {
        let v = VccioVoltages::from_volts([Some(3.3), None, Some(1.8)]).unwrap();
        assert_eq!(v.get(VccioChannel::Syzygy0), Some(Volts::V3_3));
        assert_eq!(v.get(VccioChannel::Syzygy1), None);
        assert_eq!(v.get(VccioChannel::Syzygy2), Some(Volts::V1_8));
    }

    #[test]
    fn from_volts_rejects_out_of_range_values() {
        assert_eq!(
            VccioVoltages::from_volts([Some(6.0), Some(3.3), Some(1.8)]),
            Err(ConfigError::InvalidVoltage {
                channel: VccioChannel::Syzygy0,
                volts: 6.0
            })
        );
        assert_eq!(
            VccioVoltages::from_volts([Some(3.3), Some(3.3), Some(7.0)]),
            Err(ConfigError::InvalidVoltage {
                channel: VccioChannel::Syzygy2,
                volts: 7.0
            })
        );
        assert!(matches!(
            VccioVoltages::from_volts([None, Some(f64::NAN), None]),
            Err(ConfigError::InvalidVoltage {
                channel: VccioChannel::Syzygy1,
                ..
            })
        ));
    }
}
