//! Reset sequencing.
//!
//! Every derived domain is held in reset exactly while the PLL is unlocked.
//! The relation is combinational: release happens on the cycle lock is
//! observed, and loss of lock re-asserts reset on the same cycle.

use platform::clock_config::ClockDomain;

/// Reset level of each domain for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DomainResets {
    /// `fast` reset.
    pub fast: bool,
    /// `sync` reset.
    pub sync: bool,
    /// `usb` reset.
    pub usb: bool,
}

impl DomainResets {
    /// All domains held.
    pub const ASSERTED: Self = Self::all(true);

    /// All domains released.
    pub const RELEASED: Self = Self::all(false);

    const fn all(level: bool) -> Self {
        Self {
            fast: level,
            sync: level,
            usb: level,
        }
    }

    /// Reset level of `domain`.
    #[must_use]
    pub const fn get(&self, domain: ClockDomain) -> bool {
        match domain {
            ClockDomain::Fast => self.fast,
            ClockDomain::Sync => self.sync,
            ClockDomain::Usb => self.usb,
        }
    }
}

/// Reset generator driven by PLL lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSequencer;

impl ResetSequencer {
    /// Reset levels for a given lock status: `reset = !lock` for every domain.
    #[must_use]
    pub const fn resets(locked: bool) -> DomainResets {
        DomainResets::all(!locked)
    }
}
