//! Physical-unit newtypes for board configuration.
//!
//! These keep volts and hertz from being mixed up with raw counter values:
//! - `Volts`: a finite, non-negative regulator target voltage
//! - `MegaHertz`: a nominal clock-domain frequency as written in configuration
//!
//! Reference clocks are carried as plain `u32` hertz values because the
//! frequency table matches them exactly.

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: f64,
    /// The inclusive minimum allowed value.
    pub min: f64,
    /// The inclusive maximum allowed value.
    pub max: f64,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} is outside [{}, {}]", self.value, self.min, self.max)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRangeError {}

// ── Volts ────────────────────────────────────────────────────────────────────

/// A regulator target voltage in volts.
///
/// Wraps an `f64` with the invariant `0.0 <= value <= Volts::MAX`.
/// Whether a voltage is *realizable* on a given channel depends on that
/// channel's calibration and is checked when the duty threshold is computed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[repr(transparent)]
pub struct Volts(f64);

impl Volts {
    /// Upper bound accepted by the type: the ButterStick VCCIO rails are
    /// generated from the 5 V input, nothing above that is meaningful.
    pub const MAX: f64 = 5.0;

    /// 3.3 V, the SYZYGY standard I/O rail.
    pub const V3_3: Self = Self(3.3);

    /// 1.8 V, the USB3343 VDDIO rail.
    pub const V1_8: Self = Self(1.8);

    /// Create a `Volts`, rejecting NaN, negative values and values above [`Volts::MAX`].
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value` is not in `[0, Volts::MAX]`.
    pub fn new(value: f64) -> Result<Self, OutOfRangeError> {
        if (0.0..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OutOfRangeError {
                value,
                min: 0.0,
                max: Self::MAX,
            })
        }
    }

    /// Return the voltage in volts.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Volts {
    type Error = OutOfRangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Volts> for f64 {
    fn from(v: Volts) -> Self {
        v.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Volts {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=f64}V", self.0);
    }
}

// ── MegaHertz ────────────────────────────────────────────────────────────────

/// A nominal clock frequency in MHz, as requested for a named clock domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct MegaHertz(pub u32);

impl MegaHertz {
    /// Return the frequency in MHz.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Return the frequency in Hz.
    #[must_use]
    pub const fn to_hz(self) -> u64 {
        // u32 MHz * 1e6 always fits in u64
        #[allow(clippy::arithmetic_side_effects)]
        let hz = self.0 as u64 * 1_000_000;
        hz
    }
}

impl core::fmt::Display for MegaHertz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} MHz", self.0)
    }
}
