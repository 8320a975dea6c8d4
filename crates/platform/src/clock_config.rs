//! Clock domain configuration for the ButterStick.
//!
//! The design runs three derived clock domains generated from one reference
//! clock by the ECP5 PLL:
//!
//! ```text
//!   clk30 (30 MHz pin) ──► EHXPLLL ──► CLKOP  240 MHz ─┐
//!   or OSCG (≈62 MHz)              ──► CLKOS  120 MHz ─┼─► fast / sync / usb
//!                                  ──► CLKOS2  60 MHz ─┘
//! ```
//!
//! Each named domain picks one of the three taps by its nominal frequency.
//! The board supplies defaults; a deployment may override any subset of them.

use crate::units::MegaHertz;

/// Named clock domains driven by the domain generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClockDomain {
    /// High-speed domain (SerDes-adjacent logic, default 240 MHz).
    Fast,
    /// Main system domain (default 120 MHz). Hosts the VCCIO carrier counter.
    Sync,
    /// ULPI USB domain (default 60 MHz, must match the PHY clock).
    Usb,
}

impl ClockDomain {
    /// All domains, in a fixed order.
    pub const ALL: [ClockDomain; 3] = [ClockDomain::Fast, ClockDomain::Sync, ClockDomain::Usb];

    /// Domain name as used by downstream gateware.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Sync => "sync",
            Self::Usb => "usb",
        }
    }

    /// Parse a domain name (`"fast"`, `"sync"`, `"usb"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl core::fmt::Display for ClockDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A requested frequency for each named domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DomainFrequencies {
    /// Frequency of the `fast` domain.
    pub fast: MegaHertz,
    /// Frequency of the `sync` domain.
    pub sync: MegaHertz,
    /// Frequency of the `usb` domain.
    pub usb: MegaHertz,
}

impl DomainFrequencies {
    /// Board default shared by the ECP5 domain generator: fast=240, sync=120, usb=60.
    pub const ECP5_DEFAULT: Self = Self {
        fast: MegaHertz(240),
        sync: MegaHertz(120),
        usb: MegaHertz(60),
    };

    /// Frequency requested for `domain`.
    #[must_use]
    pub const fn get(&self, domain: ClockDomain) -> MegaHertz {
        match domain {
            ClockDomain::Fast => self.fast,
            ClockDomain::Sync => self.sync,
            ClockDomain::Usb => self.usb,
        }
    }

    /// Apply `overrides` key by key; domains without an override keep `self`'s value.
    #[must_use]
    pub fn with_overrides(&self, overrides: &DomainOverrides) -> Self {
        Self {
            fast: overrides.fast.unwrap_or(self.fast),
            sync: overrides.sync.unwrap_or(self.sync),
            usb: overrides.usb.unwrap_or(self.usb),
        }
    }
}

/// Optional per-deployment override of individual domain frequencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DomainOverrides {
    /// Override for `fast`.
    pub fast: Option<MegaHertz>,
    /// Override for `sync`.
    pub sync: Option<MegaHertz>,
    /// Override for `usb`.
    pub usb: Option<MegaHertz>,
}

impl DomainOverrides {
    /// No overrides: every domain keeps the board default.
    pub const NONE: Self = Self {
        fast: None,
        sync: None,
        usb: None,
    };

    /// Set the override for one domain, replacing any previous one.
    #[must_use]
    pub fn with(mut self, domain: ClockDomain, mhz: MegaHertz) -> Self {
        match domain {
            ClockDomain::Fast => self.fast = Some(mhz),
            ClockDomain::Sync => self.sync = Some(mhz),
            ClockDomain::Usb => self.usb = Some(mhz),
        }
        self
    }

    /// Override for `domain`, if any.
    #[must_use]
    pub const fn get(&self, domain: ClockDomain) -> Option<MegaHertz> {
        match domain {
            ClockDomain::Fast => self.fast,
            ClockDomain::Sync => self.sync,
            ClockDomain::Usb => self.usb,
        }
    }
}

/// A board clock input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPin {
    /// Resource name (e.g. `"clk30"`).
    pub name: &'static str,
    /// Nominal frequency of the oscillator feeding the pin, in Hz.
    pub frequency_hz: u32,
}

/// The ECP5's on-die `OSCG` oscillator.
///
/// Only suitable for self-tests: its frequency is approximate and USB cannot
/// work from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InternalOscillator {
    /// Resource name used for the oscillator source.
    pub name: &'static str,
    /// Undivided oscillator frequency in Hz (310 MHz on ECP5).
    pub base_hz: u32,
    /// `OSCG` `DIV` parameter.
    pub divider: u32,
}

impl InternalOscillator {
    /// Output frequency in Hz: `base_hz / divider`.
    #[must_use]
    pub const fn frequency_hz(&self) -> u32 {
        match self.base_hz.checked_div(self.divider) {
            Some(hz) => hz,
            None => 0,
        }
    }
}

/// Which clock the domain generator takes as its reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "source", rename_all = "snake_case"))]
pub enum ReferenceClock {
    /// The board's default clock pin.
    #[default]
    BoardDefault,
    /// An externally supplied clock of the given frequency.
    External {
        /// Frequency in Hz.
        frequency_hz: u32,
    },
    /// The on-die debug oscillator.
    InternalOscillator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_key_by_key() {
        let overrides = DomainOverrides::NONE.with(ClockDomain::Sync, MegaHertz(60));
        let merged = DomainFrequencies::ECP5_DEFAULT.with_overrides(&overrides);
        assert_eq!(merged.fast, MegaHertz(240));
        assert_eq!(merged.sync, MegaHertz(60));
        assert_eq!(merged.usb, MegaHertz(60));
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let merged = DomainFrequencies::ECP5_DEFAULT.with_overrides(&DomainOverrides::NONE);
        assert_eq!(merged, DomainFrequencies::ECP5_DEFAULT);
    }

    #[test]
    fn later_override_wins() {
        let overrides = DomainOverrides::NONE
            .with(ClockDomain::Fast, MegaHertz(120))
            .with(ClockDomain::Fast, MegaHertz(60));
        assert_eq!(overrides.get(ClockDomain::Fast), Some(MegaHertz(60)));
    }

    #[test]
    fn domain_names_round_trip() {
        for domain in ClockDomain::ALL {
            assert_eq!(ClockDomain::from_name(domain.name()), Some(domain));
        }
        assert_eq!(ClockDomain::from_name("pixel"), None);
    }

    #[test]
    fn oscg_div5_is_62mhz() {
        let osc = InternalOscillator {
            name: "OSCG",
            base_hz: 310_000_000,
            divider: 5,
        };
        assert_eq!(osc.frequency_hz(), 62_000_000);
    }
}
