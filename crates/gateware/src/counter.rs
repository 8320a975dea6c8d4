//! Free-running PDM carrier counter.
//!
//! A `W`-bit register that increments on every clock edge of its domain and
//! wraps modulo `2^W`. Its period, `2^W` ticks, is the carrier period shared
//! by every VCCIO channel; no channel resets or writes it.

/// Width of the VCCIO carrier counter in bits.
///
/// At a 120 MHz sync clock this gives a 7.3 kHz carrier, well below the
/// regulator's feedback filter corner.
pub const CARRIER_WIDTH: u32 = 14;

/// Widest counter the model supports (values are held in a `u32`).
pub const MAX_WIDTH: u32 = 31;

/// A wrapping `width`-bit counter register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierCounter {
    value: u32,
    width: u32,
}

impl CarrierCounter {
    /// New counter at zero. `width` is clamped to `1..=MAX_WIDTH`.
    #[must_use]
    pub const fn new(width: u32) -> Self {
        let width = if width == 0 {
            1
        } else if width > MAX_WIDTH {
            MAX_WIDTH
        } else {
            width
        };
        Self { value: 0, width }
    }

    /// Register width in bits.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Current register value (what combinational logic sees this cycle).
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Carrier period in ticks: `2^width`.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.max().wrapping_add(1)
    }

    /// Largest value the register holds: `2^width − 1`.
    #[must_use]
    pub const fn max(&self) -> u32 {
        u32::MAX >> 32u32.saturating_sub(self.width)
    }

    /// Clock edge: `value ← (value + 1) mod 2^width`.
    pub fn tick(&mut self) {
        self.value = self.value.wrapping_add(1) & self.max();
    }

    /// Clock edge with the domain's synchronous reset asserted.
    pub fn reset(&mut self) {
        self.value = 0;
    }
}

impl Default for CarrierCounter {
    fn default() -> Self {
        Self::new(CARRIER_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourteen_bit_period() {
        let c = CarrierCounter::default();
        assert_eq!(c.width(), 14);
        assert_eq!(c.period(), 16_384);
        assert_eq!(c.max(), 16_383);
    }

    #[test]
    fn wraps_to_zero_after_max() {
        let mut c = CarrierCounter::new(3);
        for expected in 1..8 {
            c.tick();
            assert_eq!(c.value(), expected);
        }
        c.tick();
        assert_eq!(c.value(), 0, "counter must wrap to 0 after 2^W - 1");
    }

    #[test]
    fn returns_to_start_after_exactly_one_period() {
        let mut c = CarrierCounter::default();
        c.tick();
        c.tick();
        let start = c.value();
        for _ in 0..c.period() {
            c.tick();
        }
        assert_eq!(c.value(), start);
    }

    #[test]
    fn reset_holds_zero() {
        let mut c = CarrierCounter::default();
        c.tick();
        c.reset();
        assert_eq!(c.value(), 0);
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(CarrierCounter::new(0).width(), 1);
        assert_eq!(CarrierCounter::new(40).width(), MAX_WIDTH);
        assert_eq!(CarrierCounter::new(31).max(), 0x7FFF_FFFF);
    }
}
