//! xtask simulate: run the bring-up model cycle by cycle.
//!
//! Steps the elaborated core one reference cycle at a time, optionally
//! dropping the reference on chosen cycles, and reports lock timing and the
//! PDM duty measured over the sync ticks that ran while locked.

use anyhow::Result;
use colored::Colorize;
use gateware::pll::{ClockMultiplier, PllInput};
use gateware::{Bringup, CARRIER_WIDTH};
use platform::board::BoardDefinition;
use platform::config::DeploymentConfig;
use platform::vccio_config::{VccioChannel, VCCIO_CHANNEL_COUNT};

/// Options for one simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Reference cycles to run; `None` runs until lock plus one carrier period.
    pub cycles: Option<u32>,
    /// PLL settle period override, in reference cycles.
    pub lock_latency: Option<u32>,
    /// Reference cycles (1-based) on which the reference is missing.
    pub dropouts: Vec<u32>,
}

/// What the run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Reference cycles executed.
    pub cycles: u32,
    /// Cycles (1-based) on which lock was gained.
    pub lock_gained: Vec<u32>,
    /// Cycles (1-based) on which lock was lost.
    pub lock_lost: Vec<u32>,
    /// Sync ticks that ran with the sync domain out of reset.
    pub locked_sync_ticks: u64,
    /// Per channel, of those ticks, how many had the PDM line high.
    pub pdm_high_ticks: [u64; VCCIO_CHANNEL_COUNT],
}

impl SimulationReport {
    /// Measured duty of `channel` while locked.
    #[allow(clippy::cast_precision_loss)]
    pub fn duty(&self, channel: VccioChannel) -> Option<f64> {
        if self.locked_sync_ticks == 0 {
            return None;
        }
        let high = *self.pdm_high_ticks.get(channel.index())?;
        Some(high as f64 / self.locked_sync_ticks as f64)
    }
}

/// Run `core` according to `options`.
pub fn simulate<M: ClockMultiplier>(core: &mut Bringup<M>, options: &SimulationOptions, latency: u32) -> SimulationReport {
    let period = 1u32 << CARRIER_WIDTH;
    let per_ref = core
        .car()
        .cycles_per_reference(platform::ClockDomain::Sync)
        .max(1);
    let cycles = options
        .cycles
        .unwrap_or_else(|| latency.saturating_add(period.div_ceil(per_ref)));

    let mut report = SimulationReport {
        cycles,
        lock_gained: Vec::new(),
        lock_lost: Vec::new(),
        locked_sync_ticks: 0,
        pdm_high_ticks: [0; VCCIO_CHANNEL_COUNT],
    };
    let mut was_locked = core.car().current().locked;

    for cycle in 1..=cycles {
        let input = if options.dropouts.contains(&cycle) {
            PllInput::NO_REFERENCE
        } else {
            PllInput::RUNNING
        };
        let step = core.step_reference(input);

        match (was_locked, step.clocks.locked) {
            (false, true) => report.lock_gained.push(cycle),
            (true, false) => report.lock_lost.push(cycle),
            _ => {}
        }
        was_locked = step.clocks.locked;

        if !step.clocks.resets.sync {
            report.locked_sync_ticks = report
                .locked_sync_ticks
                .saturating_add(u64::from(step.sync_ticks));
            for (total, high) in report.pdm_high_ticks.iter_mut().zip(step.pdm_high_ticks) {
                *total = total.saturating_add(u64::from(high));
            }
        }
    }
    report
}

/// Entry point called from main.rs
pub fn run(board: &BoardDefinition, config: &DeploymentConfig, options: &SimulationOptions) -> Result<()> {
    println!();
    println!("{}", "⏱  Simulating bring-up...".cyan().bold());
    println!();

    let mut core = match Bringup::elaborate(board, config) {
        Ok(core) => core,
        Err(e) => {
            eprintln!("{}", format!("  ✗ {e}").red().bold());
            anyhow::bail!("Configuration rejected");
        }
    };
    if let Some(cycles) = options.lock_latency {
        core = core.with_lock_latency(cycles);
    }
    let latency = core.car().pll().lock_latency();
    let reference_hz = core.car().pll().reference_hz();
    tracing::info!(reference_hz, latency, "starting simulation");

    let report = simulate(&mut core, options, latency);

    println!("  reference cycles   {}", report.cycles);
    match report.lock_gained.first() {
        Some(cycle) => println!(
            "{}",
            format!(
                "  ✓ locked at cycle {cycle} ({:.3} ms); resets released the same cycle",
                f64::from(*cycle) * 1e3 / f64::from(reference_hz)
            )
            .green()
        ),
        None => println!("{}", "  ⚠ never locked; all domains held in reset".yellow()),
    }
    for (lost, regained) in report
        .lock_lost
        .iter()
        .zip(report.lock_gained.iter().skip(1).map(Some).chain(std::iter::repeat(None)))
    {
        match regained {
            Some(at) => println!("  lock lost at cycle {lost}, regained at cycle {at}"),
            None => println!("{}", format!("  lock lost at cycle {lost}, not regained").yellow()),
        }
    }
    println!();

    let vccio = core.vccio();
    if vccio.is_enabled() {
        println!(
            "{}",
            format!("  VCCIO duty over {} locked sync ticks", report.locked_sync_ticks).cyan()
        );
        for channel in VccioChannel::ALL {
            let expected = vccio.threshold(channel).map_or(0.0, |t| t.duty());
            match report.duty(channel) {
                Some(measured) => println!(
                    "    {:<8} measured {measured:.5}  expected {expected:.5}",
                    channel.to_string()
                ),
                None => println!("    {:<8} no locked ticks", channel.to_string()),
            }
        }
    } else {
        println!("  {}", "VCCIO disabled".yellow());
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::board::BUTTERSTICK;

    fn core(latency: u32) -> Bringup {
        Bringup::elaborate(&BUTTERSTICK, &DeploymentConfig::usb_device())
            .unwrap()
            .with_lock_latency(latency)
    }

    #[test]
    fn default_length_covers_one_carrier_period_after_lock() {
        let mut core = core(10);
        let report = simulate(&mut core, &SimulationOptions::default(), 10);
        assert_eq!(report.cycles, 10 + 4096);
        assert_eq!(report.lock_gained, vec![10]);
        assert!(report.lock_lost.is_empty());
        // 4097 locked reference cycles of 4 sync ticks each
        assert_eq!(report.locked_sync_ticks, 4 * 4097);
    }

    #[test]
    fn duty_over_whole_periods_matches_threshold() {
        let mut core = core(1);
        let options = SimulationOptions {
            cycles: Some(4096),
            ..SimulationOptions::default()
        };
        let report = simulate(&mut core, &options, 1);
        assert_eq!(report.locked_sync_ticks, 16_384);
        assert_eq!(report.pdm_high_ticks[0], 1549);
        assert_eq!(report.pdm_high_ticks[2], 10_998);
        let duty = report.duty(VccioChannel::Syzygy0).unwrap();
        assert!((duty - 1549.0 / 16_384.0).abs() < 1e-12);
    }

    #[test]
    fn dropout_loses_and_regains_lock() {
        let mut core = core(3);
        let options = SimulationOptions {
            cycles: Some(20),
            dropouts: vec![6],
            ..SimulationOptions::default()
        };
        let report = simulate(&mut core, &options, 3);
        assert_eq!(report.lock_gained, vec![3, 9]);
        assert_eq!(report.lock_lost, vec![6]);
    }

    #[test]
    fn never_locked_reports_no_duty() {
        let mut core = core(1_000);
        let options = SimulationOptions {
            cycles: Some(10),
            ..SimulationOptions::default()
        };
        let report = simulate(&mut core, &options, 1_000);
        assert!(report.lock_gained.is_empty());
        assert_eq!(report.duty(VccioChannel::Syzygy0), None);
    }
}
