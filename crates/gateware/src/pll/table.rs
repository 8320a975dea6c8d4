//! ECP5 PLL frequency table and validator.
//!
//! Maps each supported reference frequency (exact match, not a range) to the
//! `EHXPLLL` parameter record that produces the 240/120/60 MHz taps.
//!
//! # Clock Tree
//!
//! ```text
//!   ref ─► CLKI_DIV ─► PFD ─► VCO ─► CLKOP_DIV (2) ─► CLKOP ─┬─► 240 MHz
//!                       ▲                                     │
//!                       └──────── CLKFB_DIV ◄─────────────────┘
//!                                 VCO ─► CLKOS_DIV  (4) ─► CLKOS  120 MHz
//!                                 VCO ─► CLKOS2_DIV (8) ─► CLKOS2  60 MHz
//! ```
//!
//! With feedback from CLKOP:
//!
//! ```text
//!   VCO = ref / CLKI_DIV × CLKFB_DIV × CLKOP_DIV
//!   tap = VCO / tap_DIV
//! ```
//!
//! | Reference | CLKFB_DIV | VCO     | CLKOP / CLKOS / CLKOS2 |
//! |-----------|-----------|---------|------------------------|
//! | 30 MHz    | 8         | 480 MHz | 240 / 120 / 60         |
//! | 60 MHz    | 4         | 480 MHz | 240 / 120 / 60         |
//! | 62 MHz †  | 4         | 496 MHz | 248 / 124 / 62         |
//!
//! † On-die `OSCG` (310 MHz / 5). Approximate; USB will not work.
//!
//! Supporting another reference means adding a row here.
//!
//! References:
//! - Lattice TN1263 "ECP5 and ECP5-5G sysCLOCK PLL/DLL Design and Usage Guide"
//! - Lattice DS1044 ECP5 family data sheet, PLL timing (f_VCO, f_PFD, t_LOCK)

use platform::error::ConfigError;

use super::{Tap, TapFrequencies};

/// Minimum ECP5 VCO frequency (Hz), DS1044.
pub const VCO_MIN_HZ: u64 = 400_000_000;

/// Maximum ECP5 VCO frequency (Hz), DS1044.
pub const VCO_MAX_HZ: u64 = 800_000_000;

/// Minimum phase-detector input frequency (Hz), DS1044.
pub const PFD_MIN_HZ: u32 = 3_125_000;

/// Maximum phase-detector input frequency (Hz), DS1044.
pub const PFD_MAX_HZ: u32 = 400_000_000;

/// `EHXPLLL` divider and phase parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllParams {
    /// Reference input divider.
    pub clki_div: u32,
    /// Feedback divider.
    pub clkfb_div: u32,
    /// CLKOP output divider (feedback path).
    pub clkop_div: u32,
    /// CLKOS output divider.
    pub clkos_div: u32,
    /// CLKOS2 output divider.
    pub clkos2_div: u32,
    /// CLKOP coarse phase (`div − 1` = 0°).
    pub clkop_cphase: u32,
    /// CLKOS coarse phase.
    pub clkos_cphase: u32,
    /// CLKOS2 coarse phase.
    pub clkos2_cphase: u32,
}

impl PllParams {
    /// Output dividers shared by every entry; only `CLKFB_DIV` varies.
    #[must_use]
    pub const fn with_feedback_divider(clkfb_div: u32) -> Self {
        Self {
            clki_div: 1,
            clkfb_div,
            clkop_div: 2,
            clkos_div: 4,
            clkos2_div: 8,
            clkop_cphase: 1,
            clkos_cphase: 3,
            clkos2_cphase: 7,
        }
    }

    /// Output divider of `tap`.
    #[must_use]
    pub const fn divider(&self, tap: Tap) -> u32 {
        match tap {
            Tap::ClkOp => self.clkop_div,
            Tap::ClkOs => self.clkos_div,
            Tap::ClkOs2 => self.clkos2_div,
        }
    }

    /// Phase-detector input frequency.
    #[must_use]
    pub fn pfd_hz(&self, reference_hz: u32) -> Option<u32> {
        reference_hz.checked_div(self.clki_div)
    }

    /// VCO frequency, feedback taken from CLKOP.
    #[must_use]
    pub fn vco_hz(&self, reference_hz: u32) -> Option<u64> {
        u64::from(self.pfd_hz(reference_hz)?)
            .checked_mul(u64::from(self.clkfb_div))?
            .checked_mul(u64::from(self.clkop_div))
    }

    /// Frequency of `tap`.
    #[must_use]
    pub fn tap_hz(&self, reference_hz: u32, tap: Tap) -> Option<u32> {
        let hz = self.vco_hz(reference_hz)?.checked_div(u64::from(self.divider(tap)))?;
        u32::try_from(hz).ok()
    }

    /// All three tap frequencies.
    #[must_use]
    pub fn tap_frequencies(&self, reference_hz: u32) -> Option<TapFrequencies> {
        Some(TapFrequencies {
            clkop_hz: self.tap_hz(reference_hz, Tap::ClkOp)?,
            clkos_hz: self.tap_hz(reference_hz, Tap::ClkOs)?,
            clkos2_hz: self.tap_hz(reference_hz, Tap::ClkOs2)?,
        })
    }
}

/// One row of the frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyTableEntry {
    /// Reference frequency this row matches exactly, in Hz.
    pub reference_hz: u32,
    /// Parameters for that reference.
    pub params: PllParams,
    /// The reference is only approximately this frequency (debug oscillator).
    pub approximate: bool,
}

impl FrequencyTableEntry {
    /// Tap frequencies produced by this row.
    #[must_use]
    pub fn tap_frequencies(&self) -> Option<TapFrequencies> {
        self.params.tap_frequencies(self.reference_hz)
    }
}

/// Supported reference frequencies for the ECP5 domain generator.
pub const ECP5_FREQUENCY_TABLE: &[FrequencyTableEntry] = &[
    FrequencyTableEntry {
        reference_hz: 62_000_000,
        params: PllParams::with_feedback_divider(4),
        approximate: true,
    },
    FrequencyTableEntry {
        reference_hz: 60_000_000,
        params: PllParams::with_feedback_divider(4),
        approximate: false,
    },
    FrequencyTableEntry {
        reference_hz: 30_000_000,
        params: PllParams::with_feedback_divider(8),
        approximate: false,
    },
];

/// Look up the parameter record for `reference_hz`.
///
/// # Errors
///
/// [`ConfigError::UnsupportedFrequency`] if no row matches exactly.
pub fn validate(reference_hz: u32) -> Result<&'static FrequencyTableEntry, ConfigError> {
    ECP5_FREQUENCY_TABLE
        .iter()
        .find(|e| e.reference_hz == reference_hz)
        .ok_or(ConfigError::UnsupportedFrequency { reference_hz })
}
