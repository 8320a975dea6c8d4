//! Voltage-to-duty mapping.
//!
//! Turns a target rail voltage into the carrier-counter threshold below
//! which the channel's PDM line is driven high:
//!
//! ```text
//! limit     = (b − v) / m                 (channel calibration)
//! threshold = floor(limit · 2^W)          (W = carrier width)
//! ```
//!
//! `limit` must lie in `[0, 1)`. Anything else is a voltage the PDM line
//! cannot produce and is refused rather than truncated into a different rail.

use platform::error::ConfigError;
use platform::units::Volts;
use platform::vccio_config::VccioChannelSpec;

use crate::counter::CarrierCounter;

/// Counter value below which a PDM output is high.
///
/// Always `<= 2^width − 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyThreshold {
    value: u32,
    width: u32,
}

impl DutyThreshold {
    /// Threshold 0: output permanently low.
    #[must_use]
    pub const fn zero(width: u32) -> Self {
        Self {
            value: 0,
            width: CarrierCounter::new(width).width(),
        }
    }

    /// Threshold from a raw counter value, clamped to `2^width − 1`.
    #[must_use]
    pub const fn from_raw(raw: u32, width: u32) -> Self {
        let counter = CarrierCounter::new(width);
        let value = if raw > counter.max() { counter.max() } else { raw };
        Self {
            value,
            width: counter.width(),
        }
    }

    /// Threshold value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.value
    }

    /// Counter width this threshold was computed for.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Fraction of each carrier period the output is high: `threshold / 2^W`.
    #[must_use]
    pub fn duty(&self) -> f64 {
        f64::from(self.value) / f64::from(CarrierCounter::new(self.width).period())
    }
}

/// Quantise a duty fraction in `[0, 1)` to a `width`-bit threshold.
///
/// Returns `None` for fractions outside `[0, 1)` (including NaN).
#[must_use]
pub fn quantise(limit: f64, width: u32) -> Option<DutyThreshold> {
    if !(0.0..1.0).contains(&limit) {
        return None;
    }
    let counter = CarrierCounter::new(width);
    let scaled = libm::floor(limit * f64::from(counter.period()));
    // limit ∈ [0, 1) so scaled ∈ [0, 2^W); from_raw guards the rounding edge.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let raw = scaled as u32;
    Some(DutyThreshold::from_raw(raw, width))
}

/// Threshold that makes `spec`'s regulator produce `voltage`.
///
/// # Errors
///
/// [`ConfigError::InvalidVoltage`] if `voltage` is outside the channel's
/// allowed range, or its duty fraction is outside `[0, 1)`.
pub fn voltage_to_threshold(
    spec: &VccioChannelSpec,
    voltage: Volts,
    width: u32,
) -> Result<DutyThreshold, ConfigError> {
    let invalid = ConfigError::InvalidVoltage {
        channel: spec.channel,
        volts: voltage.get(),
    };
    if !spec.permits(voltage) {
        return Err(invalid);
    }
    quantise(spec.calibration.duty_fraction(voltage), width).ok_or(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CARRIER_WIDTH;
    use platform::board::BUTTERSTICK;
    use platform::vccio_config::VccioChannel;

    fn spec(channel: VccioChannel) -> VccioChannelSpec {
        BUTTERSTICK.vccio_channels[channel.index()]
    }

    #[test]
    fn three_volts_three_is_1549() {
        // (3.546 - 3.3) / 2.601 = 0.09458; x 16384 = 1549.6 -> floor 1549
        let t = voltage_to_threshold(
            &spec(VccioChannel::Syzygy0),
            Volts::new(3.3).unwrap(),
            CARRIER_WIDTH,
        )
        .unwrap();
        assert_eq!(t.get(), 1549);
        assert!((t.duty() - 0.0946).abs() < 1e-3);
    }

    #[test]
    fn one_volt_eight_on_ulpi_bank() {
        // (3.546 - 1.8) / 2.601 = 0.67128; x 16384 = 10998.3 -> 10998
        let t = voltage_to_threshold(
            &spec(VccioChannel::Syzygy2),
            Volts::new(1.8).unwrap(),
            CARRIER_WIDTH,
        )
        .unwrap();
        assert_eq!(t.get(), 10_998);
    }

    #[test]
    fn common_rails_land_in_expected_duty_bands() {
        // 3.3 V sits near 10 % duty, 1.8 V near 70 %.
        let s = spec(VccioChannel::Syzygy0);
        let d33 = voltage_to_threshold(&s, Volts::new(3.3).unwrap(), CARRIER_WIDTH).unwrap();
        let d18 = voltage_to_threshold(&s, Volts::new(1.8).unwrap(), CARRIER_WIDTH).unwrap();
        assert!((d33.duty() - 0.10).abs() < 0.01);
        assert!((d18.duty() - 0.70).abs() < 0.03);
    }

    #[test]
    fn above_intercept_is_rejected() {
        let err = voltage_to_threshold(
            &spec(VccioChannel::Syzygy0),
            Volts::new(3.6).unwrap(),
            CARRIER_WIDTH,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidVoltage {
                channel: VccioChannel::Syzygy0,
                volts: 3.6
            }
        );
    }

    #[test]
    fn below_reachable_range_is_rejected() {
        // b - m = 0.945 V is the 100 % duty point; below it limit >= 1.
        assert!(voltage_to_threshold(
            &spec(VccioChannel::Syzygy0),
            Volts::new(0.9).unwrap(),
            CARRIER_WIDTH
        )
        .is_err());
    }

    #[test]
    fn ulpi_bank_refuses_out_of_usb3343_range() {
        // 1.2 V is reachable by the regulator but not tolerated by the PHY.
        let s = spec(VccioChannel::Syzygy2);
        assert!(voltage_to_threshold(&s, Volts::new(1.2).unwrap(), CARRIER_WIDTH).is_err());
        assert!(
            voltage_to_threshold(&spec(VccioChannel::Syzygy1), Volts::new(1.2).unwrap(), CARRIER_WIDTH)
                .is_ok()
        );
    }

    #[test]
    fn quantise_edges() {
        assert_eq!(quantise(0.0, 14).map(|t| t.get()), Some(0));
        assert_eq!(quantise(1.0, 14), None);
        assert_eq!(quantise(-0.001, 14), None);
        assert_eq!(quantise(f64::NAN, 14), None);
        assert_eq!(quantise(0.999_999_999_9, 14).map(|t| t.get()), Some(16_383));
    }

    #[test]
    fn from_raw_clamps_full_scale() {
        assert_eq!(DutyThreshold::from_raw(16_384, 14).get(), 16_383);
        assert_eq!(DutyThreshold::from_raw(100, 14).get(), 100);
        assert_eq!(DutyThreshold::zero(14).get(), 0);
    }
}
