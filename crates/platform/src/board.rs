//! ButterStick board definition.
//!
//! Board-level facts the domain generator and VCCIO controller need. Passed
//! around as an explicit value so board variants do not share hidden state.

use crate::clock_config::{ClockPin, DomainFrequencies, InternalOscillator};
use crate::vccio_config::{VccioCalibration, VccioChannel, VccioChannelSpec, VCCIO_CHANNEL_COUNT};

/// Everything the core needs to know about a board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardDefinition {
    /// Board name used in diagnostics.
    pub name: &'static str,
    /// Clock pin used when the deployment does not pick another reference.
    pub default_clock: ClockPin,
    /// Domain frequencies used when the deployment does not override them.
    pub default_domain_frequencies: DomainFrequencies,
    /// VCCIO PDM channels in pin order.
    pub vccio_channels: [VccioChannelSpec; VCCIO_CHANNEL_COUNT],
    /// On-die debug oscillator.
    pub oscillator: InternalOscillator,
    /// Whether this platform is officially supported by the USB stack.
    pub officially_supported: bool,
}

impl BoardDefinition {
    /// Channel description for `channel`.
    #[must_use]
    pub fn vccio_channel(&self, channel: VccioChannel) -> Option<&VccioChannelSpec> {
        self.vccio_channels.get(channel.index())
    }
}

/// USB3343 ULPI PHY I/O supply range.
pub const USB3343_VDDIO_RANGE: (f64, f64) = (1.8, 3.3);

/// The ButterStick r1.0 (Lattice ECP5, 30 MHz reference, ULPI USB on SYZYGY 2's bank).
pub const BUTTERSTICK: BoardDefinition = BoardDefinition {
    name: "ButterStick",
    default_clock: ClockPin {
        name: "clk30",
        frequency_hz: 30_000_000,
    },
    default_domain_frequencies: DomainFrequencies::ECP5_DEFAULT,
    vccio_channels: [
        VccioChannelSpec {
            channel: VccioChannel::Syzygy0,
            calibration: VccioCalibration::BUTTERSTICK,
            allowed_range: None,
            hosts_usb: false,
        },
        VccioChannelSpec {
            channel: VccioChannel::Syzygy1,
            calibration: VccioCalibration::BUTTERSTICK,
            allowed_range: None,
            hosts_usb: false,
        },
        VccioChannelSpec {
            channel: VccioChannel::Syzygy2,
            calibration: VccioCalibration::BUTTERSTICK,
            allowed_range: Some(USB3343_VDDIO_RANGE),
            hosts_usb: true,
        },
    ],
    oscillator: InternalOscillator {
        name: "OSCG",
        base_hz: 310_000_000,
        divider: 5,
    },
    officially_supported: false,
};
