//! ICS307-3 programming words and board variants
//!
//! The synthesizer's 132-bit programming words are calculated by the IDT
//! VersaClock 2 software for each supported output frequency. They depend on
//! the reference clock and the output pin wiring, so PCI Express cards and
//! USB adapters each have their own table.

mod table;
mod variant;

pub use table::{lookup, SynthEntry, SynthWord, PCI_TABLE, USB_TABLE, WORD_BITS};
pub use variant::{PinMapping, Variant, USB_OUTPUT_MASK};
