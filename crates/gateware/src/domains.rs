//! Domain-to-tap selection.
//!
//! Each named domain is driven by the PLL tap whose nominal frequency equals
//! the requested frequency. Several domains may share a tap.

use platform::clock_config::{ClockDomain, DomainFrequencies, DomainOverrides};
use platform::error::ConfigError;

use crate::pll::Tap;

/// The tap chosen for every domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DomainMap {
    /// Tap driving `fast`.
    pub fast: Tap,
    /// Tap driving `sync`.
    pub sync: Tap,
    /// Tap driving `usb`.
    pub usb: Tap,
}

impl DomainMap {
    /// Merge `overrides` over `defaults` and pick a tap for each domain.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDomainFrequency`] for the first domain (in
    /// [`ClockDomain::ALL`] order) whose frequency is not 60, 120 or 240 MHz.
    pub fn select(
        defaults: &DomainFrequencies,
        overrides: &DomainOverrides,
    ) -> Result<Self, ConfigError> {
        let requested = defaults.with_overrides(overrides);
        let pick = |domain: ClockDomain| {
            let mhz = requested.get(domain);
            Tap::from_nominal(mhz).ok_or(ConfigError::InvalidDomainFrequency {
                domain,
                requested: mhz,
            })
        };
        Ok(Self {
            fast: pick(ClockDomain::Fast)?,
            sync: pick(ClockDomain::Sync)?,
            usb: pick(ClockDomain::Usb)?,
        })
    }

    /// Tap driving `domain`.
    #[must_use]
    pub const fn tap(&self, domain: ClockDomain) -> Tap {
        match domain {
            ClockDomain::Fast => self.fast,
            ClockDomain::Sync => self.sync,
            ClockDomain::Usb => self.usb,
        }
    }
}
