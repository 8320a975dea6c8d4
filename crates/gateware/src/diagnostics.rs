//! Warning-level diagnostics raised while elaborating a deployment.
//!
//! Diagnostics never stop elaboration. They are collected while checking and
//! only logged (defmt on target, tracing on host) once the whole deployment
//! has been accepted, so a rejected configuration leaves no warnings behind.

use platform::VccioChannel;

/// Upper bound on diagnostics from one elaboration.
pub const MAX_DIAGNOSTICS: usize = 8;

/// Something worth a warning, but not worth refusing the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// The board is not officially supported by the USB stack.
    UnsupportedPlatform {
        /// Board name.
        board: &'static str,
    },
    /// The reference clock only approximates its nominal frequency
    /// (the on-die debug oscillator). USB will not work.
    ApproximateReference {
        /// Approximate reference frequency in Hz.
        reference_hz: u32,
    },
    /// No VCCIO channel is configured; the controller is disabled.
    VccioDisabled,
    /// A channel has no target voltage; its PDM line is held low.
    VccioChannelUnconfigured {
        /// The channel left undriven.
        channel: VccioChannel,
    },
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedPlatform { board } => write!(
                f,
                "{board} is not officially supported, and thus not tested. Your results may vary."
            ),
            Self::ApproximateReference { reference_hz } => write!(
                f,
                "Using an approximate {} MHz reference; USB communication won't work for f_OSC != 60MHz.",
                reference_hz / 1_000_000
            ),
            Self::VccioDisabled => f.write_str("VCCIO configuration is required for ULPI USB to function."),
            Self::VccioChannelUnconfigured { channel } => {
                write!(f, "{channel} has no target voltage; PDM output held low")
            }
        }
    }
}

/// Diagnostics collected during one elaboration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: heapless::Vec<Diagnostic, MAX_DIAGNOSTICS>,
}

impl Diagnostics {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `diagnostic`. Once [`MAX_DIAGNOSTICS`] are held, further ones are dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let _ = self.entries.push(diagnostic);
    }

    /// Log every kept diagnostic at warning level, in order.
    #[cfg_attr(not(any(feature = "std", feature = "defmt")), allow(unused_variables))]
    pub fn emit(&self) {
        for diagnostic in &self.entries {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}", diagnostic);
            #[cfg(feature = "std")]
            tracing::warn!("{}", diagnostic);
        }
    }

    /// Whether `diagnostic` was raised.
    #[must_use]
    pub fn contains(&self, diagnostic: &Diagnostic) -> bool {
        self.entries.contains(diagnostic)
    }

    /// Iterate over the kept diagnostics in the order they were raised.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of kept diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was raised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
