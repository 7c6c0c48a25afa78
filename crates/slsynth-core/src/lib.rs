//! slsynth-core - Core library for SyncLink frequency synthesizer programming
//!
//! SyncLink PCI Express cards and USB adapters have a fixed 14.7456 MHz base
//! clock. The serial controller generates bit clocks by dividing the base
//! clock by a 16-bit integer, so rates that are not divisors of 14.7456 MHz
//! need the on-board frequency synthesizer, an IDT ICS307-3.
//!
//! The synthesizer is loaded with a 132-bit programming word through a
//! bit-banged serial interface made of four serial controller GPIO lines.
//! This crate holds the precomputed programming words, the pin layout
//! detection, and the shift/latch protocol. It is `no_std` and talks to the
//! hardware only through the [`programmer::GpioPort`] and
//! [`programmer::BaseClock`] traits.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Error`]
//!
//! # Example
//!
//! ```ignore
//! use slsynth_core::programmer::{fsynth, BaseClock, GpioPort};
//!
//! fn set_rate<D: GpioPort + BaseClock>(dev: &mut D) -> slsynth_core::Result<()> {
//!     fsynth::set_rate(dev, 20_000_000)?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod error;
pub mod programmer;
pub mod synth;

pub use error::{Error, Result};
