//! Error types for slsynth-core
//!
//! This module provides a no_std compatible error type shared by the
//! synthesizer programmer and every device backend.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Requested frequency is not in the word table of the detected variant
    FrequencyNotSupported(u32),

    /// A GPIO control request failed
    ///
    /// Raised mid-transfer, this aborts the programming sequence. The
    /// synthesizer may hold a partially shifted word; the mux is left on the
    /// fixed oscillator.
    GpioControlFailed {
        /// GPIO line the request was driving
        bit: u8,
        /// OS error code reported by the device, 0 if unknown
        errno: i32,
    },

    /// Reading the GPIO direction mask failed
    GpioQueryFailed {
        /// OS error code reported by the device, 0 if unknown
        errno: i32,
    },

    /// The serial controller rejected the new base clock rate
    BaseClockFailed {
        /// Rate that was being set
        hz: u32,
        /// OS error code reported by the device, 0 if unknown
        errno: i32,
    },
}

impl Error {
    /// Whether this error left GPIO lines in a modified state
    ///
    /// Lookup failures are detected before the first GPIO write.
    pub fn touched_hardware(&self) -> bool {
        matches!(
            self,
            Self::GpioControlFailed { .. } | Self::BaseClockFailed { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrequencyNotSupported(hz) => write!(f, "{} not found in table", hz),
            Self::GpioControlFailed { bit, errno } => {
                write!(f, "GPIO control failed on bit {} (errno {})", bit, errno)
            }
            Self::GpioQueryFailed { errno } => {
                write!(f, "GPIO direction query failed (errno {})", errno)
            }
            Self::BaseClockFailed { hz, errno } => {
                write!(f, "failed to set base clock to {} Hz (errno {})", hz, errno)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
