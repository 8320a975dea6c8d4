//! Behavioural model of the ECP5 `EHXPLLL`.
//!
//! The analog loop is not modelled. Lock is asserted after a fixed number of
//! consecutive valid reference cycles and dropped on the first cycle the
//! reference is missing or `RST` is high; the settle count then restarts.
//!
//! The default settle period is the DS1044 worst-case lock time
//! (`t_LOCK` = 15 ms) expressed in reference cycles.

use platform::error::ConfigError;

use super::table::{validate, FrequencyTableEntry};
use super::{ClockMultiplier, PllInput, Tap, TapFrequencies};

/// DS1044 worst-case PLL lock time, in microseconds.
pub const LOCK_TIME_US: u32 = 15_000;

/// Number of entries returned by [`Ecp5Pll::primitive_parameters`].
pub const PARAMETER_COUNT: usize = 38;

/// Kind of a primitive setting: an HDL parameter or a synthesis attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// `p_…` instance parameter.
    Parameter,
    /// `a_…` synthesis attribute.
    Attribute,
}

/// Value of a primitive setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    /// Integer parameter.
    Int(u32),
    /// String parameter.
    Str(&'static str),
    /// Frequency attribute, rendered in MHz with six decimals.
    Frequency(u32),
}

impl core::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Frequency(hz) => write!(f, "\"{}.{:06}\"", hz / 1_000_000, hz % 1_000_000),
        }
    }
}

/// One `EHXPLLL` instance setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveSetting {
    /// Parameter or attribute.
    pub kind: SettingKind,
    /// Name without prefix.
    pub name: &'static str,
    /// Value.
    pub value: SettingValue,
}

impl core::fmt::Display for PrimitiveSetting {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let prefix = match self.kind {
            SettingKind::Parameter => "p",
            SettingKind::Attribute => "a",
        };
        write!(f, "{prefix}_{}={}", self.name, self.value)
    }
}

const fn p(name: &'static str, value: SettingValue) -> PrimitiveSetting {
    PrimitiveSetting {
        kind: SettingKind::Parameter,
        name,
        value,
    }
}

const fn a(name: &'static str, value: SettingValue) -> PrimitiveSetting {
    PrimitiveSetting {
        kind: SettingKind::Attribute,
        name,
        value,
    }
}

/// ECP5 PLL configured from one frequency-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecp5Pll {
    entry: &'static FrequencyTableEntry,
    taps: TapFrequencies,
    lock_cycles: u32,
    stable_cycles: u32,
    locked: bool,
}

impl Ecp5Pll {
    /// Configure for `reference_hz`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFrequency`] if the frequency table has no row.
    pub fn for_reference(reference_hz: u32) -> Result<Self, ConfigError> {
        Self::new(validate(reference_hz)?)
    }

    /// Configure from a table row.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFrequency`] if the row's dividers do not
    /// produce representable tap frequencies.
    pub fn new(entry: &'static FrequencyTableEntry) -> Result<Self, ConfigError> {
        let taps = entry
            .tap_frequencies()
            .ok_or(ConfigError::UnsupportedFrequency {
                reference_hz: entry.reference_hz,
            })?;
        let lock_cycles = (entry.reference_hz / 1_000_000).saturating_mul(LOCK_TIME_US);
        Ok(Self {
            entry,
            taps,
            lock_cycles: lock_cycles.max(1),
            stable_cycles: 0,
            locked: false,
        })
    }

    /// Override the settle period, in reference cycles (at least 1).
    #[must_use]
    pub fn with_lock_latency(mut self, cycles: u32) -> Self {
        self.lock_cycles = cycles.max(1);
        self
    }

    /// Settle period in reference cycles.
    #[must_use]
    pub fn lock_latency(&self) -> u32 {
        self.lock_cycles
    }

    /// Frequency of one tap, shorthand for `tap_frequencies().get(tap)`.
    #[must_use]
    pub fn tap_hz(&self, tap: Tap) -> u32 {
        self.taps.get(tap)
    }

    /// Frequency-table row in use.
    #[must_use]
    pub fn entry(&self) -> &'static FrequencyTableEntry {
        self.entry
    }

    /// The `EHXPLLL` instance parameters and attributes for this configuration.
    #[must_use]
    pub fn primitive_parameters(&self) -> [PrimitiveSetting; PARAMETER_COUNT] {
        use SettingValue::{Frequency, Int, Str};
        let params = &self.entry.params;
        [
            p("PLLRST_ENA", Str("DISABLED")),
            p("INTFB_WAKE", Str("DISABLED")),
            p("STDBY_ENABLE", Str("DISABLED")),
            p("DPHASE_SOURCE", Str("DISABLED")),
            p("CLKOS3_FPHASE", Int(0)),
            p("CLKOS3_CPHASE", Int(0)),
            p("CLKOS2_FPHASE", Int(0)),
            p("CLKOS2_CPHASE", Int(params.clkos2_cphase)),
            p("CLKOS_FPHASE", Int(0)),
            p("CLKOS_CPHASE", Int(params.clkos_cphase)),
            p("CLKOP_FPHASE", Int(0)),
            p("CLKOP_CPHASE", Int(params.clkop_cphase)),
            p("PLL_LOCK_MODE", Int(0)),
            p("CLKOS_TRIM_DELAY", Str("0")),
            p("CLKOS_TRIM_POL", Str("FALLING")),
            p("CLKOP_TRIM_DELAY", Str("0")),
            p("CLKOP_TRIM_POL", Str("FALLING")),
            p("OUTDIVIDER_MUXD", Str("DIVD")),
            p("CLKOS3_ENABLE", Str("DISABLED")),
            p("OUTDIVIDER_MUXC", Str("DIVC")),
            p("CLKOS2_ENABLE", Str("ENABLED")),
            p("OUTDIVIDER_MUXB", Str("DIVB")),
            p("CLKOS_ENABLE", Str("ENABLED")),
            p("OUTDIVIDER_MUXA", Str("DIVA")),
            p("CLKOP_ENABLE", Str("ENABLED")),
            p("CLKOS3_DIV", Int(1)),
            p("CLKOS2_DIV", Int(params.clkos2_div)),
            p("CLKOS_DIV", Int(params.clkos_div)),
            p("CLKOP_DIV", Int(params.clkop_div)),
            p("CLKFB_DIV", Int(params.clkfb_div)),
            p("CLKI_DIV", Int(params.clki_div)),
            p("FEEDBK_PATH", Str("CLKOP")),
            a("FREQUENCY_PIN_CLKI", Frequency(self.entry.reference_hz)),
            a("FREQUENCY_PIN_CLKOS2", Frequency(self.taps.clkos2_hz)),
            a("FREQUENCY_PIN_CLKOS", Frequency(self.taps.clkos_hz)),
            a("FREQUENCY_PIN_CLKOP", Frequency(self.taps.clkop_hz)),
            a("ICP_CURRENT", Str("9")),
            a("LPF_RESISTOR", Str("8")),
        ]
    }
}

impl ClockMultiplier for Ecp5Pll {
    fn reference_hz(&self) -> u32 {
        self.entry.reference_hz
    }

    fn tap_frequencies(&self) -> TapFrequencies {
        self.taps
    }

    fn locked(&self) -> bool {
        self.locked
    }

    fn step(&mut self, input: PllInput) {
        if !input.reference_valid || input.reset {
            if self.locked {
                #[cfg(feature = "std")]
                tracing::debug!(reference_valid = input.reference_valid, "PLL lost lock");
                #[cfg(feature = "defmt")]
                defmt::debug!("PLL lost lock");
            }
            self.stable_cycles = 0;
            self.locked = false;
            return;
        }
        self.stable_cycles = self.stable_cycles.saturating_add(1);
        if !self.locked && self.stable_cycles >= self.lock_cycles {
            self.locked = true;
            #[cfg(feature = "std")]
            tracing::debug!(cycles = self.stable_cycles, "PLL locked");
            #[cfg(feature = "defmt")]
            defmt::debug!("PLL locked after {=u32} reference cycles", self.stable_cycles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pll(latency: u32) -> Ecp5Pll {
        Ecp5Pll::for_reference(60_000_000)
            .unwrap()
            .with_lock_latency(latency)
    }

    #[test]
    fn default_latency_is_15ms_of_reference() {
        let pll = Ecp5Pll::for_reference(30_000_000).unwrap();
        assert_eq!(pll.lock_latency(), 450_000);
    }

    #[test]
    fn locks_after_settle_period() {
        let mut pll = pll(4);
        for _ in 0..3 {
            pll.step(PllInput::RUNNING);
            assert!(!pll.locked());
        }
        pll.step(PllInput::RUNNING);
        assert!(pll.locked());
    }

    #[test]
    fn never_locks_without_reference() {
        let mut pll = pll(1);
        for _ in 0..100 {
            pll.step(PllInput::NO_REFERENCE);
            assert!(!pll.locked());
        }
    }

    #[test]
    fn loss_drops_lock_immediately_and_restarts_settle() {
        let mut pll = pll(3);
        for _ in 0..3 {
            pll.step(PllInput::RUNNING);
        }
        assert!(pll.locked());
        pll.step(PllInput::NO_REFERENCE);
        assert!(!pll.locked());
        pll.step(PllInput::RUNNING);
        pll.step(PllInput::RUNNING);
        assert!(!pll.locked(), "settle count must restart after loss");
        pll.step(PllInput::RUNNING);
        assert!(pll.locked());
    }

    #[test]
    fn reset_drops_lock() {
        let mut pll = pll(1);
        pll.step(PllInput::RUNNING);
        assert!(pll.locked());
        pll.step(PllInput::RESET);
        assert!(!pll.locked());
    }

    #[test]
    fn unsupported_reference_has_no_pll() {
        assert!(Ecp5Pll::for_reference(48_000_000).is_err());
    }

    #[test]
    fn cycles_per_reference_at_30mhz() {
        let pll = Ecp5Pll::for_reference(30_000_000).unwrap();
        assert_eq!(pll.cycles_per_reference(Tap::ClkOp), 8);
        assert_eq!(pll.cycles_per_reference(Tap::ClkOs), 4);
        assert_eq!(pll.cycles_per_reference(Tap::ClkOs2), 2);
    }

    #[test]
    fn primitive_parameters_carry_table_row() {
        let pll = Ecp5Pll::for_reference(30_000_000).unwrap();
        let params = pll.primitive_parameters();
        let find = |name: &str| params.iter().find(|s| s.name == name).map(|s| s.value);
        assert_eq!(find("CLKFB_DIV"), Some(SettingValue::Int(8)));
        assert_eq!(find("CLKOS2_DIV"), Some(SettingValue::Int(8)));
        assert_eq!(find("FEEDBK_PATH"), Some(SettingValue::Str("CLKOP")));
        assert_eq!(
            find("FREQUENCY_PIN_CLKOP").map(|v| v.to_string()),
            Some("\"240.000000\"".to_string())
        );
    }

    #[test]
    fn setting_display_uses_hdl_prefixes() {
        let pll = Ecp5Pll::for_reference(60_000_000).unwrap();
        let rendered: Vec<String> = pll.primitive_parameters().iter().map(ToString::to_string).collect();
        assert!(rendered.contains(&"p_CLKFB_DIV=4".to_string()));
        assert!(rendered.contains(&"a_FREQUENCY_PIN_CLKI=\"60.000000\"".to_string()));
    }
}
