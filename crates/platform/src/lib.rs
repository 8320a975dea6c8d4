//! Board description for the ButterStick bring-up core.
//!
//! This crate holds the static facts and per-deployment choices that the
//! `gateware` crate elaborates into clock domains and VCCIO PDM outputs. It
//! contains no per-tick behaviour.
//!
//! # Layers
//!
//! ```text
//! xtask (plan / simulate)
//!         ↓
//! gateware (domain generator, VCCIO controller, simulation)
//!         ↓
//! platform (this crate - board definition, units, config, errors)
//! ```
//!
//! # Modules
//!
//! - [`board`] - the [`BoardDefinition`] and the [`board::BUTTERSTICK`] constant
//! - [`clock_config`] - named clock domains, default frequencies and overrides
//! - [`vccio_config`] - VCCIO channels, regulator calibration and voltage table
//! - [`config`] - [`DeploymentConfig`]
//! - [`error`] - [`ConfigError`]
//! - [`units`] - [`Volts`] and [`MegaHertz`]
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls
//! - `serde`: (de)serialize [`DeploymentConfig`]
//! - `defmt`: `defmt::Format` derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // part numbers and pin names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod board;
pub mod clock_config;
pub mod config;
pub mod error;
pub mod units;
pub mod vccio_config;

pub use board::BoardDefinition;
pub use clock_config::{ClockDomain, DomainFrequencies, DomainOverrides, ReferenceClock};
pub use config::DeploymentConfig;
pub use error::ConfigError;
pub use units::{MegaHertz, OutOfRangeError, Volts};
pub use vccio_config::{VccioCalibration, VccioChannel, VccioChannelSpec, VccioVoltages};
