//! VCCIO PDM controller.
//!
//! Drives the three `vccio_ctrl.pdm` lines and the shared `vccio_ctrl.en`
//! line that set the SYZYGY bank voltages:
//!
//! ```text
//!   carrier counter (sync domain, 14 bit) ─┬─ < t0 ─► pdm[0]
//!                                          ├─ < t1 ─► pdm[1]
//!                                          └─ < t2 ─► pdm[2]
//!   any channel configured ───────────────────────► en
//! ```
//!
//! Thresholds are computed once at elaboration. Per tick, the outputs are a
//! pure function of the counter register; the counter is the only state.

pub mod duty;

use platform::board::BoardDefinition;
use platform::error::ConfigError;
use platform::vccio_config::{VccioChannel, VccioVoltages, VCCIO_CHANNEL_COUNT};

use crate::counter::{CarrierCounter, CARRIER_WIDTH};
use crate::diagnostics::{Diagnostic, Diagnostics};
pub use duty::{quantise, voltage_to_threshold, DutyThreshold};

/// Levels on the `vccio_ctrl` pins for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VccioPins {
    /// PDM line per channel, in pin order.
    pub pdm: [bool; VCCIO_CHANNEL_COUNT],
    /// Regulator enable.
    pub en: bool,
}

impl VccioPins {
    /// Level of one channel's PDM line.
    #[must_use]
    pub fn channel(&self, channel: VccioChannel) -> bool {
        self.pdm.get(channel.index()).copied().unwrap_or(false)
    }
}

/// The VCCIO controller: one carrier counter and a threshold per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VccioCtrl {
    counter: CarrierCounter,
    thresholds: [DutyThreshold; VCCIO_CHANNEL_COUNT],
    enabled: bool,
}

impl VccioCtrl {
    /// Elaborate the controller for `board` with the deployment's voltages.
    ///
    /// - A channel required by an active bus (the ULPI bank while USB is in
    ///   use) must have a voltage.
    /// - With no channel configured and none required, the controller is
    ///   disabled: enable and all PDM lines stay low.
    /// - An unconfigured, non-required channel is held low.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingVoltageConfiguration`] for a required channel
    /// without a voltage; [`ConfigError::InvalidVoltage`] for a voltage the
    /// channel cannot produce.
    pub fn elaborate(
        board: &BoardDefinition,
        voltages: &VccioVoltages,
        usb_in_use: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ConfigError> {
        for spec in &board.vccio_channels {
            if spec.is_required(usb_in_use) && voltages.get(spec.channel).is_none() {
                return Err(ConfigError::MissingVoltageConfiguration {
                    channel: spec.channel,
                });
            }
        }

        if !voltages.any_configured() {
            diagnostics.push(Diagnostic::VccioDisabled);
            return Ok(Self::disabled(CARRIER_WIDTH));
        }

        let mut thresholds = [DutyThreshold::zero(CARRIER_WIDTH); VCCIO_CHANNEL_COUNT];
        for (spec, slot) in board.vccio_channels.iter().zip(thresholds.iter_mut()) {
            match voltages.get(spec.channel) {
                Some(voltage) => *slot = voltage_to_threshold(spec, voltage, CARRIER_WIDTH)?,
                None => diagnostics.push(Diagnostic::VccioChannelUnconfigured {
                    channel: spec.channel,
                }),
            }
        }

        Ok(Self::from_thresholds(CARRIER_WIDTH, thresholds))
    }

    /// Enabled controller with a `width`-bit counter and explicit thresholds.
    ///
    /// Each threshold is re-clamped to `2^width - 1`, whatever width it was
    /// built for.
    #[must_use]
    pub fn from_thresholds(width: u32, thresholds: [DutyThreshold; VCCIO_CHANNEL_COUNT]) -> Self {
        let counter = CarrierCounter::new(width);
        Self {
            thresholds: thresholds.map(|t| DutyThreshold::from_raw(t.get(), counter.width())),
            counter,
            enabled: true,
        }
    }

    /// Controller that drives nothing.
    #[must_use]
    pub fn disabled(width: u32) -> Self {
        Self {
            counter: CarrierCounter::new(width),
            thresholds: [DutyThreshold::zero(width); VCCIO_CHANNEL_COUNT],
            enabled: false,
        }
    }

    /// Whether the regulator enable is driven.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Threshold of `channel`.
    #[must_use]
    pub fn threshold(&self, channel: VccioChannel) -> Option<DutyThreshold> {
        self.thresholds.get(channel.index()).copied()
    }

    /// The shared carrier counter.
    #[must_use]
    pub fn counter(&self) -> &CarrierCounter {
        &self.counter
    }

    /// Combinational outputs for the current counter value.
    #[must_use]
    pub fn outputs(&self) -> VccioPins {
        if !self.enabled {
            return VccioPins::default();
        }
        let now = self.counter.value();
        VccioPins {
            pdm: self.thresholds.map(|t| now < t.get()),
            en: true,
        }
    }

    /// One sync-domain clock edge. While the domain is in reset the counter
    /// is held at zero.
    pub fn tick(&mut self, in_reset: bool) {
        if in_reset {
            self.counter.reset();
        } else {
            self.counter.tick();
        }
    }
}
