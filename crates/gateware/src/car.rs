//! Clock-and-reset domain generator.
//!
//! Resolves the deployment's reference clock, picks the matching PLL
//! configuration, wires the named domains to PLL taps and derives every
//! domain's reset from lock:
//!
//! ```text
//!   reference ─► validate ─► EHXPLLL ─┬─ CLKOP/CLKOS/CLKOS2 ─► DomainMap ─► fast/sync/usb
//!                                     └─ LOCK ─► ResetSequencer ─► rst (= !LOCK)
//! ```
//!
//! Elaboration is all-or-nothing: any configuration error is returned before
//! a generator exists.

use platform::board::BoardDefinition;
use platform::clock_config::{ClockDomain, ReferenceClock};
use platform::config::DeploymentConfig;
use platform::error::ConfigError;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::domains::DomainMap;
use crate::pll::{ClockMultiplier, Ecp5Pll, PllInput, Tap, TapFrequencies};
use crate::reset::{DomainResets, ResetSequencer};

/// Frequency in Hz of the clock `reference` selects on `board`.
#[must_use]
pub fn reference_frequency_hz(board: &BoardDefinition, reference: ReferenceClock) -> u32 {
    match reference {
        ReferenceClock::BoardDefault => board.default_clock.frequency_hz,
        ReferenceClock::External { frequency_hz } => frequency_hz,
        ReferenceClock::InternalOscillator => board.oscillator.frequency_hz(),
    }
}

/// One domain's clock and reset as seen by downstream logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DomainClock {
    /// Domain name.
    pub domain: ClockDomain,
    /// PLL tap driving it.
    pub tap: Tap,
    /// Tap frequency in Hz.
    pub frequency_hz: u32,
    /// Reset level.
    pub in_reset: bool,
}

/// Clock-and-reset outputs for one reference cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockAndReset {
    /// PLL lock.
    pub locked: bool,
    /// Per-domain reset, `!locked` for every domain.
    pub resets: DomainResets,
    /// Domain-to-tap wiring.
    pub domains: DomainMap,
    /// Tap frequencies.
    pub taps: TapFrequencies,
}

impl ClockAndReset {
    /// Clock and reset of `domain`.
    #[must_use]
    pub const fn domain(&self, domain: ClockDomain) -> DomainClock {
        let tap = self.domains.tap(domain);
        DomainClock {
            domain,
            tap,
            frequency_hz: self.taps.get(tap),
            in_reset: self.resets.get(domain),
        }
    }
}

/// PLL plus domain wiring plus reset derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGenerator<M: ClockMultiplier = Ecp5Pll> {
    pll: M,
    domains: DomainMap,
}

impl DomainGenerator<Ecp5Pll> {
    /// Elaborate for `board` and `config`.
    ///
    /// Records [`Diagnostic::ApproximateReference`] when the reference is the
    /// debug oscillator. Nothing is logged here.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFrequency`] if the reference has no table
    /// row, [`ConfigError::InvalidDomainFrequency`] if a domain asks for a
    /// frequency no tap provides.
    pub fn elaborate(
        board: &BoardDefinition,
        config: &DeploymentConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ConfigError> {
        let reference_hz = reference_frequency_hz(board, config.reference);
        let pll = Ecp5Pll::for_reference(reference_hz)?;
        let domains = DomainMap::select(&board.default_domain_frequencies, &config.clock_frequencies)?;

        if pll.entry().approximate {
            diagnostics.push(Diagnostic::ApproximateReference { reference_hz });
        }

        Ok(Self { pll, domains })
    }

    /// Override the PLL settle period, in reference cycles.
    #[must_use]
    pub fn with_lock_latency(mut self, cycles: u32) -> Self {
        self.pll = self.pll.with_lock_latency(cycles);
        self
    }
}

impl<M: ClockMultiplier> DomainGenerator<M> {
    /// Generator around an already-configured multiplier.
    #[must_use]
    pub const fn from_parts(pll: M, domains: DomainMap) -> Self {
        Self { pll, domains }
    }

    /// The clock multiplier.
    #[must_use]
    pub const fn pll(&self) -> &M {
        &self.pll
    }

    /// Domain-to-tap wiring.
    #[must_use]
    pub const fn domains(&self) -> &DomainMap {
        &self.domains
    }

    /// Outputs for the current PLL state.
    #[must_use]
    pub fn current(&self) -> ClockAndReset {
        let locked = self.pll.locked();
        ClockAndReset {
            locked,
            resets: ResetSequencer::resets(locked),
            domains: self.domains,
            taps: self.pll.tap_frequencies(),
        }
    }

    /// Advance the PLL by one reference cycle and return the new outputs.
    pub fn step(&mut self, input: PllInput) -> ClockAndReset {
        self.pll.step(input);
        self.current()
    }

    /// Cycles of `domain`'s clock per reference cycle.
    #[must_use]
    pub fn cycles_per_reference(&self, domain: ClockDomain) -> u32 {
        self.pll.cycles_per_reference(self.domains.tap(domain))
    }
}
