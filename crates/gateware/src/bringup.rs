//! Top-level bring-up assembly.
//!
//! Combines the clock-and-reset generator with the VCCIO controller and
//! steps both one reference cycle at a time:
//!
//! 1. PLL advances one reference cycle.
//! 2. Domain resets are recomputed from lock.
//! 3. The sync domain runs its clock edges for that reference cycle; the
//!    carrier counter lives there and is held at zero while sync is in reset.
//!
//! Derived clocks only run while the reference is present.

use platform::board::BoardDefinition;
use platform::clock_config::ClockDomain;
use platform::config::DeploymentConfig;
use platform::error::ConfigError;
use platform::vccio_config::{VccioChannel, VCCIO_CHANNEL_COUNT};

use crate::car::{ClockAndReset, DomainGenerator};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::pll::{ClockMultiplier, Ecp5Pll, PllInput};
use crate::vccio::{VccioCtrl, VccioPins};

/// What happened during one reference cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReferenceCycle {
    /// Clock and reset state after the PLL stepped.
    pub clocks: ClockAndReset,
    /// Sync-domain edges executed.
    pub sync_ticks: u32,
    /// Per channel, how many of those edges saw the PDM line high.
    pub pdm_high_ticks: [u32; VCCIO_CHANNEL_COUNT],
    /// VCCIO pins after the last edge.
    pub pins: VccioPins,
}

/// The whole bring-up core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bringup<M: ClockMultiplier = Ecp5Pll> {
    car: DomainGenerator<M>,
    vccio: VccioCtrl,
    diagnostics: Diagnostics,
}

impl Bringup<Ecp5Pll> {
    /// Validate everything, then build the core.
    ///
    /// Warnings are logged only once every check has passed, and are kept;
    /// see [`Bringup::diagnostics`].
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found. Nothing is built or logged on error.
    pub fn elaborate(board: &BoardDefinition, config: &DeploymentConfig) -> Result<Self, ConfigError> {
        let mut diagnostics = Diagnostics::new();
        let car = DomainGenerator::elaborate(board, config, &mut diagnostics)?;
        let vccio = VccioCtrl::elaborate(board, &config.vccio, config.usb, &mut diagnostics)?;

        if !board.officially_supported {
            diagnostics.push(Diagnostic::UnsupportedPlatform { board: board.name });
        }

        let core = Self {
            car,
            vccio,
            diagnostics,
        };
        core.log_elaborated();
        Ok(core)
    }

    /// Override the PLL settle period, in reference cycles.
    #[must_use]
    pub fn with_lock_latency(mut self, cycles: u32) -> Self {
        self.car = self.car.with_lock_latency(cycles);
        self
    }

    fn log_elaborated(&self) {
        #[cfg(feature = "std")]
        {
            let domains = self.car.domains();
            tracing::info!(
                reference_hz = self.car.pll().reference_hz(),
                fast = %domains.fast,
                sync = %domains.sync,
                usb = %domains.usb,
                "clock domains elaborated"
            );
            if self.vccio.is_enabled() {
                for channel in VccioChannel::ALL {
                    if let Some(threshold) = self.vccio.threshold(channel) {
                        tracing::debug!(%channel, threshold = threshold.get(), "vccio threshold");
                    }
                }
            }
        }
        #[cfg(feature = "defmt")]
        defmt::info!(
            "clock domains elaborated from {=u32} Hz reference",
            self.car.pll().reference_hz()
        );

        self.diagnostics.emit();
    }
}

impl<M: ClockMultiplier> Bringup<M> {
    /// Assemble from already-elaborated parts.
    #[must_use]
    pub fn from_parts(car: DomainGenerator<M>, vccio: VccioCtrl) -> Self {
        Self {
            car,
            vccio,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Warnings raised during elaboration.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The clock-and-reset generator.
    #[must_use]
    pub fn car(&self) -> &DomainGenerator<M> {
        &self.car
    }

    /// The VCCIO controller.
    #[must_use]
    pub fn vccio(&self) -> &VccioCtrl {
        &self.vccio
    }

    /// Advance by one reference cycle.
    pub fn step_reference(&mut self, input: PllInput) -> ReferenceCycle {
        let clocks = self.car.step(input);
        let sync_in_reset = clocks.resets.get(ClockDomain::Sync);
        let sync_ticks = if input.reference_valid {
            self.car.cycles_per_reference(ClockDomain::Sync)
        } else {
            0
        };

        let mut pdm_high_ticks = [0u32; VCCIO_CHANNEL_COUNT];
        for _ in 0..sync_ticks {
            let pins = self.vccio.outputs();
            for (count, high) in pdm_high_ticks.iter_mut().zip(pins.pdm) {
                *count = count.saturating_add(u32::from(high));
            }
            self.vccio.tick(sync_in_reset);
        }

        ReferenceCycle {
            clocks,
            sync_ticks,
            pdm_high_ticks,
            pins: self.vccio.outputs(),
        }
    }

    /// Step with a healthy reference until lock, at most `max_cycles` times.
    ///
    /// Returns the number of reference cycles taken, or `None` if lock was
    /// not reached.
    pub fn run_until_locked(&mut self, max_cycles: u32) -> Option<u32> {
        for cycle in 1..=max_cycles {
            if self.step_reference(PllInput::RUNNING).clocks.locked {
                return Some(cycle);
            }
        }
        None
    }
}
