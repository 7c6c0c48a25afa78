//! Synthesizer programming over serial controller GPIO
//!
//! This module defines the device traits the programmer drives and the
//! ICS307 shift/latch protocol built on top of them.

pub mod fsynth;
mod traits;

pub use traits::*;
