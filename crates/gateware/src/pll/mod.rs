//! Clock multiplier abstraction.
//!
//! The PLL is treated as a timing black box with the interface
//! `{reference frequency, parameter record} → {three output taps, lock}`.
//! [`ecp5::Ecp5Pll`] models the ECP5 `EHXPLLL` behind the
//! [`ClockMultiplier`] trait so the frequency table, domain selection and
//! reset sequencing are testable without an analog model.

pub mod ecp5;
pub mod table;

use platform::units::MegaHertz;

pub use ecp5::Ecp5Pll;
pub use table::{validate, FrequencyTableEntry, PllParams, ECP5_FREQUENCY_TABLE};

/// The three PLL outputs, named by their `EHXPLLL` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tap {
    /// `CLKOP`: nominal 240 MHz, also the feedback path.
    ClkOp,
    /// `CLKOS`: nominal 120 MHz.
    ClkOs,
    /// `CLKOS2`: nominal 60 MHz.
    ClkOs2,
}

impl Tap {
    /// All taps, fastest first.
    pub const ALL: [Tap; 3] = [Tap::ClkOp, Tap::ClkOs, Tap::ClkOs2];

    /// Nominal frequency a domain selects this tap by.
    #[must_use]
    pub const fn nominal(self) -> MegaHertz {
        match self {
            Self::ClkOp => MegaHertz(240),
            Self::ClkOs => MegaHertz(120),
            Self::ClkOs2 => MegaHertz(60),
        }
    }

    /// Tap with the given nominal frequency.
    #[must_use]
    pub fn from_nominal(mhz: MegaHertz) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.nominal() == mhz)
    }

    /// `EHXPLLL` output port name.
    #[must_use]
    pub const fn port(self) -> &'static str {
        match self {
            Self::ClkOp => "CLKOP",
            Self::ClkOs => "CLKOS",
            Self::ClkOs2 => "CLKOS2",
        }
    }
}

impl core::fmt::Display for Tap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.port())
    }
}

/// Actual output frequencies in Hz.
///
/// These differ from the nominal values when the reference is approximate
/// (62 MHz oscillator → 248/124/62 MHz).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapFrequencies {
    /// `CLKOP` frequency.
    pub clkop_hz: u32,
    /// `CLKOS` frequency.
    pub clkos_hz: u32,
    /// `CLKOS2` frequency.
    pub clkos2_hz: u32,
}

impl TapFrequencies {
    /// Frequency of `tap` in Hz.
    #[must_use]
    pub const fn get(&self, tap: Tap) -> u32 {
        match tap {
            Tap::ClkOp => self.clkop_hz,
            Tap::ClkOs => self.clkos_hz,
            Tap::ClkOs2 => self.clkos2_hz,
        }
    }
}

/// Inputs to the multiplier for one reference clock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllInput {
    /// The reference clock toggled this cycle.
    pub reference_valid: bool,
    /// PLL reset (`RST`) asserted.
    pub reset: bool,
}

impl PllInput {
    /// A healthy reference with reset released.
    pub const RUNNING: Self = Self {
        reference_valid: true,
        reset: false,
    };

    /// Reference lost.
    pub const NO_REFERENCE: Self = Self {
        reference_valid: false,
        reset: false,
    };

    /// PLL held in reset.
    pub const RESET: Self = Self {
        reference_valid: true,
        reset: true,
    };
}

/// A clock multiplier: fixed-ratio taps plus a lock indicator.
pub trait ClockMultiplier {
    /// Reference frequency the multiplier was configured for, in Hz.
    fn reference_hz(&self) -> u32;

    /// Output tap frequencies once locked.
    fn tap_frequencies(&self) -> TapFrequencies;

    /// Lock status: outputs are frequency- and phase-stable.
    ///
    /// Never true unless the reference has been valid for the whole settle
    /// period since the last loss or reset.
    fn locked(&self) -> bool;

    /// Advance by one reference clock cycle.
    fn step(&mut self, input: PllInput);

    /// Cycles of `tap` per reference cycle (taps are integer multiples of the
    /// reference for every supported configuration).
    fn cycles_per_reference(&self, tap: Tap) -> u32 {
        self.tap_frequencies()
            .get(tap)
            .checked_div(self.reference_hz())
            .unwrap_or(0)
    }
}
