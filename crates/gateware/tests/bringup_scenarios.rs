//! End-to-end elaboration and simulation scenarios for the bring-up core.

// Integration test file -- intentional test patterns permitted.
#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]

use gateware::pll::{ClockMultiplier, PllInput, Tap};
use gateware::{Bringup, Diagnostic, DutyThreshold, VccioCtrl, CARRIER_WIDTH};
use platform::board::BUTTERSTICK;
use platform::clock_config::{ClockDomain, DomainOverrides, ReferenceClock};
use platform::config::DeploymentConfig;
use platform::error::ConfigError;
use platform::units::MegaHertz;
use platform::vccio_config::{VccioChannel, VccioVoltages};

fn sixty_mhz(overrides: DomainOverrides) -> DeploymentConfig {
    DeploymentConfig {
        reference: ReferenceClock::External {
            frequency_hz: 60_000_000,
        },
        clock_frequencies: overrides,
        ..DeploymentConfig::usb_device()
    }
}

/// 60 MHz reference, explicit usb/sync/fast at their nominal taps.
#[test]
fn sixty_mhz_reference_with_explicit_domains() {
    let overrides = DomainOverrides::NONE
        .with(ClockDomain::Usb, MegaHertz(60))
        .with(ClockDomain::Sync, MegaHertz(120))
        .with(ClockDomain::Fast, MegaHertz(240));
    let core = Bringup::elaborate(&BUTTERSTICK, &sixty_mhz(overrides)).unwrap();

    let pll = core.car().pll();
    assert_eq!(pll.entry().params.clkfb_div, 4);
    let clocks = core.car().current();
    assert_eq!(clocks.domain(ClockDomain::Fast).frequency_hz, 240_000_000);
    assert_eq!(clocks.domain(ClockDomain::Sync).frequency_hz, 120_000_000);
    assert_eq!(clocks.domain(ClockDomain::Usb).frequency_hz, 60_000_000);
    assert_eq!(clocks.domain(ClockDomain::Usb).tap, Tap::ClkOs2);
}

#[test]
fn sixty_mhz_reference_rejects_100mhz_sync() {
    let overrides = DomainOverrides::NONE.with(ClockDomain::Sync, MegaHertz(100));
    assert_eq!(
        Bringup::elaborate(&BUTTERSTICK, &sixty_mhz(overrides)).unwrap_err(),
        ConfigError::InvalidDomainFrequency {
            domain: ClockDomain::Sync,
            requested: MegaHertz(100),
        }
    );
}

#[test]
fn unsupported_reference_is_reported_before_domains() {
    let config = DeploymentConfig {
        reference: ReferenceClock::External {
            frequency_hz: 48_000_000,
        },
        clock_frequencies: DomainOverrides::NONE.with(ClockDomain::Sync, MegaHertz(100)),
        ..DeploymentConfig::usb_device()
    };
    assert_eq!(
        Bringup::elaborate(&BUTTERSTICK, &config).unwrap_err(),
        ConfigError::UnsupportedFrequency {
            reference_hz: 48_000_000
        }
    );
}

#[test]
fn oscillator_self_test_elaborates_with_warning() {
    let core = Bringup::elaborate(&BUTTERSTICK, &DeploymentConfig::oscillator_self_test()).unwrap();
    assert!(core.diagnostics().contains(&Diagnostic::ApproximateReference {
        reference_hz: 62_000_000
    }));
    assert_eq!(core.car().pll().tap_frequencies().clkop_hz, 248_000_000);
}

#[test]
fn nothing_configured_is_a_disabled_controller() {
    let config = DeploymentConfig {
        vccio: VccioVoltages::UNCONFIGURED,
        usb: false,
        ..DeploymentConfig::default()
    };
    let mut core = Bringup::elaborate(&BUTTERSTICK, &config).unwrap().with_lock_latency(1);
    assert!(core.diagnostics().contains(&Diagnostic::VccioDisabled));
    for _ in 0..8 {
        let cycle = core.step_reference(PllInput::RUNNING);
        assert_eq!(cycle.pdm_high_ticks, [0, 0, 0]);
        assert!(!cycle.pins.en);
    }
}

/// Reset is held through the settle period, released with lock, and
/// re-asserted the same cycle the reference disappears.
#[test]
fn lock_and_reset_timeline() {
    let mut core = Bringup::elaborate(&BUTTERSTICK, &DeploymentConfig::usb_device())
        .unwrap()
        .with_lock_latency(5);

    for _ in 0..4 {
        let cycle = core.step_reference(PllInput::RUNNING);
        assert!(!cycle.clocks.locked);
        for domain in ClockDomain::ALL {
            assert!(cycle.clocks.domain(domain).in_reset);
        }
    }
    let cycle = core.step_reference(PllInput::RUNNING);
    assert!(cycle.clocks.locked);
    for domain in ClockDomain::ALL {
        assert!(!cycle.clocks.domain(domain).in_reset);
    }

    let cycle = core.step_reference(PllInput::NO_REFERENCE);
    assert!(!cycle.clocks.locked);
    assert!(cycle.clocks.domain(ClockDomain::Sync).in_reset);

    // settle restarts from scratch
    assert_eq!(core.run_until_locked(100), Some(5));
}

/// Over exactly one carrier period after lock, each line is high for exactly
/// `threshold` sync ticks.
#[test]
fn usb_device_duty_over_one_carrier_period() {
    let mut core = Bringup::elaborate(&BUTTERSTICK, &DeploymentConfig::usb_device())
        .unwrap()
        .with_lock_latency(1);

    let period = 1u32 << CARRIER_WIDTH;
    let per_ref = core.car().cycles_per_reference(ClockDomain::Sync);
    assert_eq!(period % per_ref, 0);

    let mut high = [0u32; 3];
    let mut ticks = 0u32;
    for _ in 0..period / per_ref {
        let cycle = core.step_reference(PllInput::RUNNING);
        assert!(cycle.clocks.locked);
        ticks += cycle.sync_ticks;
        for (acc, n) in high.iter_mut().zip(cycle.pdm_high_ticks) {
            *acc += n;
        }
    }
    assert_eq!(ticks, period);

    let t = |ch| core.vccio().threshold(ch).unwrap().get();
    assert_eq!(t(VccioChannel::Syzygy0), 1549);
    assert_eq!(t(VccioChannel::Syzygy2), 10_998);
    assert_eq!(
        high,
        [
            t(VccioChannel::Syzygy0),
            t(VccioChannel::Syzygy1),
            t(VccioChannel::Syzygy2)
        ]
    );
    assert_eq!(core.vccio().counter().value(), 0, "counter wrapped to 0");
}

#[test]
fn degenerate_thresholds() {
    let mut ctrl = VccioCtrl::from_thresholds(CARRIER_WIDTH, [
        DutyThreshold::zero(CARRIER_WIDTH),
        DutyThreshold::from_raw(1 << CARRIER_WIDTH, CARRIER_WIDTH),
        DutyThreshold::zero(CARRIER_WIDTH),
    ]);
    let mut low_ticks = 0u32;
    for _ in 0..1u32 << CARRIER_WIDTH {
        let pins = ctrl.outputs();
        assert!(!pins.pdm[0], "threshold 0 is permanently low");
        if !pins.pdm[1] {
            low_ticks += 1;
            assert_eq!(ctrl.counter().value(), (1 << CARRIER_WIDTH) - 1);
        }
        ctrl.tick(false);
    }
    assert_eq!(low_ticks, 1, "full scale is low only on the max tick");
}
