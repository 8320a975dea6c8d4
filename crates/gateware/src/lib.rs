//! Behavioural model of the ButterStick bring-up core.
//!
//! Two independent blocks share the sync clock:
//!
//! - **Clock and reset** ([`car`]): the reference clock is validated against
//!   the ECP5 PLL frequency table, the named domains (`fast`, `sync`, `usb`)
//!   are wired to PLL taps, and every domain is held in reset while the PLL
//!   is unlocked.
//! - **VCCIO** ([`vccio`]): target bank voltages are converted once into
//!   duty thresholds, then compared against a free-running carrier counter
//!   to drive the regulator PDM lines.
//!
//! [`bringup::Bringup`] elaborates both from a
//! [`BoardDefinition`](platform::BoardDefinition) and a
//! [`DeploymentConfig`](platform::DeploymentConfig) and steps them one
//! reference cycle at a time.
//!
//! All configuration errors are raised at elaboration. Nothing here fails
//! per tick; loss of lock is handled structurally by holding domains in reset.
//!
//! # Features
//!
//! - `std`: `tracing` diagnostics, `std::error::Error` for [`ConfigError`](platform::ConfigError)
//! - `defmt`: `defmt` diagnostics and `Format` derives

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
#![allow(clippy::doc_markdown)] // primitive and port names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod bringup;
pub mod car;
pub mod counter;
pub mod diagnostics;
pub mod domains;
pub mod pll;
pub mod reset;
pub mod vccio;

pub use bringup::{Bringup, ReferenceCycle};
pub use car::{ClockAndReset, DomainClock, DomainGenerator};
pub use counter::{CarrierCounter, CARRIER_WIDTH};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use domains::DomainMap;
pub use pll::{ClockMultiplier, Ecp5Pll, PllInput, Tap, TapFrequencies};
pub use reset::{DomainResets, ResetSequencer};
pub use vccio::{DutyThreshold, VccioCtrl, VccioPins};
