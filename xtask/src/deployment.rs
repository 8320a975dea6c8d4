//! Deployment selection for `plan` and `simulate`.
//!
//! A deployment starts from a preset (or the all-default config), optionally
//! replaced by a JSON file, then individual fields are overridden from the
//! command line. Fields missing from the JSON keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use platform::clock_config::{ClockDomain, ReferenceClock};
use platform::config::DeploymentConfig;
use platform::units::{MegaHertz, Volts};
use platform::vccio_config::VccioChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// clk30, default domains, SYZYGY 0/1 at 3.3 V, ULPI bank at 1.8 V
    UsbDevice,
    /// On-die oscillator, no USB
    OscillatorSelfTest,
}

#[derive(Debug, Default, Args)]
pub struct DeploymentArgs {
    /// JSON deployment file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Starting point when no JSON file is given
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// External reference clock frequency in Hz
    #[arg(long, conflicts_with = "oscillator")]
    pub reference_hz: Option<u32>,

    /// Use the on-die debug oscillator as reference
    #[arg(long)]
    pub oscillator: bool,

    /// Domain frequency override, e.g. `--domain sync=60` (repeatable)
    #[arg(long = "domain", value_parser = parse_domain_override)]
    pub domains: Vec<(ClockDomain, MegaHertz)>,

    /// VCCIO target voltage, e.g. `--vccio 2=1.8` (repeatable)
    #[arg(long = "vccio", value_parser = parse_vccio)]
    pub vccio: Vec<(VccioChannel, Volts)>,

    /// ULPI USB is in use
    #[arg(long, conflicts_with = "no_usb")]
    pub usb: bool,

    /// ULPI USB is not in use
    #[arg(long)]
    pub no_usb: bool,
}

impl DeploymentArgs {
    /// Build the deployment these arguments describe.
    pub fn resolve(&self) -> Result<DeploymentConfig> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => load(path)?,
            (None, Some(Preset::UsbDevice)) => DeploymentConfig::usb_device(),
            (None, Some(Preset::OscillatorSelfTest)) => DeploymentConfig::oscillator_self_test(),
            (None, None) => DeploymentConfig::default(),
        };

        if let Some(frequency_hz) = self.reference_hz {
            config.reference = ReferenceClock::External { frequency_hz };
        }
        if self.oscillator {
            config.reference = ReferenceClock::InternalOscillator;
        }
        for &(domain, mhz) in &self.domains {
            config.clock_frequencies = config.clock_frequencies.with(domain, mhz);
        }
        for &(channel, volts) in &self.vccio {
            config.vccio = config.vccio.with(channel, volts);
        }
        if self.usb {
            config.usb = true;
        }
        if self.no_usb {
            config.usb = false;
        }

        tracing::debug!(?config, "resolved deployment");
        Ok(config)
    }
}

/// Read a JSON deployment file.
pub fn load(path: &Path) -> Result<DeploymentConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read deployment file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid deployment file {}", path.display()))
}

fn parse_domain_override(s: &str) -> Result<(ClockDomain, MegaHertz), String> {
    let (name, mhz) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DOMAIN=MHZ, got '{s}'"))?;
    let domain = ClockDomain::from_name(name.trim())
        .ok_or_else(|| format!("unknown domain '{name}' (expected fast, sync or usb)"))?;
    let mhz = mhz
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad frequency '{mhz}': {e}"))?;
    Ok((domain, MegaHertz(mhz)))
}

fn parse_vccio(s: &str) -> Result<(VccioChannel, Volts), String> {
    let (index, volts) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CHANNEL=VOLTS, got '{s}'"))?;
    let channel = index
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(VccioChannel::from_index)
        .ok_or_else(|| format!("unknown VCCIO channel '{index}' (expected 0, 1 or 2)"))?;
    let volts = volts
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad voltage '{volts}': {e}"))?;
    let volts = Volts::new(volts).map_err(|e| e.to_string())?;
    Ok((channel, volts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_domain_override() {
        assert_eq!(
            parse_domain_override("sync=60").unwrap(),
            (ClockDomain::Sync, MegaHertz(60))
        );
        assert!(parse_domain_override("pixel=60").is_err());
        assert!(parse_domain_override("sync").is_err());
    }

    #[test]
    fn parses_vccio() {
        let (channel, volts) = parse_vccio("2=1.8").unwrap();
        assert_eq!(channel, VccioChannel::Syzygy2);
        assert!((volts.get() - 1.8).abs() < f64::EPSILON);
        assert!(parse_vccio("3=1.8").is_err());
        assert!(parse_vccio("0=9.0").is_err());
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "reference": {{ "source": "external", "frequency_hz": 60000000 }},
                "clock_frequencies": {{ "sync": 60 }},
                "vccio": [3.3, null, 1.8],
                "usb": true
            }}"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(
            config.reference,
            ReferenceClock::External {
                frequency_hz: 60_000_000
            }
        );
        assert_eq!(config.clock_frequencies.get(ClockDomain::Sync), Some(MegaHertz(60)));
        assert_eq!(config.clock_frequencies.get(ClockDomain::Fast), None);
        assert!(config.vccio.get(VccioChannel::Syzygy1).is_none());
        assert!(config.usb);
    }

    #[test]
    fn empty_json_is_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert_eq!(load(file.path()).unwrap(), DeploymentConfig::default());
    }

    #[test]
    fn out_of_range_json_voltage_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "vccio": [12.0, null, null] }}"#).unwrap();
        assert!(load(file.path()).is_err());
    }

    #[test]
    fn command_line_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "usb": true, "vccio": [3.3, 3.3, 1.8] }}"#).unwrap();
        let args = DeploymentArgs {
            config: Some(file.path().to_path_buf()),
            oscillator: true,
            domains: vec![(ClockDomain::Fast, MegaHertz(120))],
            vccio: vec![(VccioChannel::Syzygy0, Volts::new(2.5).unwrap())],
            no_usb: true,
            ..DeploymentArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.reference, ReferenceClock::InternalOscillator);
        assert_eq!(config.clock_frequencies.get(ClockDomain::Fast), Some(MegaHertz(120)));
        assert_eq!(
            config.vccio.get(VccioChannel::Syzygy0).map(Volts::get),
            Some(2.5)
        );
        assert!(!config.usb);
    }

    #[test]
    fn preset_without_file() {
        let args = DeploymentArgs {
            preset: Some(Preset::UsbDevice),
            ..DeploymentArgs::default()
        };
        assert_eq!(args.resolve().unwrap(), DeploymentConfig::usb_device());
    }
}
