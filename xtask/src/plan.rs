//! xtask plan: elaborate a deployment and print what would be built.

use anyhow::Result;
use colored::Colorize;
use gateware::pll::{ClockMultiplier, Tap};
use gateware::Bringup;
use platform::board::BoardDefinition;
use platform::clock_config::ClockDomain;
use platform::config::DeploymentConfig;
use platform::vccio_config::VccioChannel;

/// Entry point called from main.rs
pub fn run(board: &BoardDefinition, config: &DeploymentConfig, show_primitive: bool) -> Result<()> {
    println!();
    println!("{}", format!("📐 Elaborating {}...", board.name).cyan().bold());
    println!();

    let core = match Bringup::elaborate(board, config) {
        Ok(core) => core,
        Err(e) => {
            eprintln!("{}", format!("  ✗ {e}").red().bold());
            anyhow::bail!("Configuration rejected");
        }
    };

    let pll = core.car().pll();
    let entry = pll.entry();
    let params = &entry.params;
    println!("{}", "  PLL".cyan());
    println!(
        "    reference   {} Hz{}",
        entry.reference_hz,
        if entry.approximate { " (approximate)" } else { "" }
    );
    println!(
        "    dividers    CLKI_DIV={} CLKFB_DIV={} CLKOP_DIV={} CLKOS_DIV={} CLKOS2_DIV={}",
        params.clki_div, params.clkfb_div, params.clkop_div, params.clkos_div, params.clkos2_div
    );
    if let Some(vco) = params.vco_hz(entry.reference_hz) {
        println!("    VCO         {:.3} MHz", mhz(vco));
    }
    for tap in Tap::ALL {
        println!(
            "    {:<11} {:.3} MHz (nominal {})",
            tap.port(),
            mhz(u64::from(pll.tap_frequencies().get(tap))),
            tap.nominal()
        );
    }
    println!(
        "    lock        after {} reference cycles",
        pll.lock_latency()
    );
    println!();

    if show_primitive {
        println!("{}", "  EHXPLLL".cyan());
        for setting in pll.primitive_parameters() {
            println!("    {setting}");
        }
        println!();
    }

    println!("{}", "  Domains".cyan());
    let clocks = core.car().current();
    for domain in ClockDomain::ALL {
        let d = clocks.domain(domain);
        println!(
            "    {:<11} {} ({:.3} MHz), reset = !lock",
            domain.name(),
            d.tap,
            mhz(u64::from(d.frequency_hz))
        );
    }
    println!();

    println!("{}", "  VCCIO".cyan());
    let vccio = core.vccio();
    if vccio.is_enabled() {
        for channel in VccioChannel::ALL {
            let Some(spec) = board.vccio_channel(channel) else {
                continue;
            };
            match (config.vccio.get(channel), vccio.threshold(channel)) {
                (Some(target), Some(threshold)) => println!(
                    "    {:<11} {:.3} V -> threshold {:>5} (duty {:.4}, ≈{:.3} V)",
                    channel.to_string(),
                    target.get(),
                    threshold.get(),
                    threshold.duty(),
                    spec.calibration.voltage_at(threshold.duty())
                ),
                _ => println!("    {:<11} {}", channel.to_string(), "held low".yellow()),
            }
        }
    } else {
        println!("    {}", "disabled".yellow());
    }
    println!();

    for diagnostic in core.diagnostics().iter() {
        println!("{}", format!("  ⚠ {diagnostic}").yellow());
    }

    println!("{}", "✓ Configuration accepted".green().bold());
    println!();
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn mhz(hz: u64) -> f64 {
    hz as f64 / 1e6
}
