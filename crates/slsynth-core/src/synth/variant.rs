//! Board variants and their synthesizer pin layouts

use core::fmt;

use super::table::{lookup, SynthEntry, SynthWord, PCI_TABLE, USB_TABLE};
use crate::error::Result;

/// GPIO lines that USB adapters configure as outputs (bits 20-23)
pub const USB_OUTPUT_MASK: u32 = 0xF << 20;

/// GPIO lines wired to the synthesizer programming interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMapping {
    /// Base clock source select (high = synthesizer output)
    pub mux: u8,
    /// Shift register clock, sampled on the rising edge
    pub clk: u8,
    /// Latch strobe for the shifted word
    pub sel: u8,
    /// Serial data
    pub dat: u8,
}

/// Adapter family, which determines pin layout and word table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// PCI Express cards (GPIO 12-15)
    Pci,
    /// USB adapters (GPIO 20-23)
    Usb,
}

impl Variant {
    /// Pick the variant from a GPIO direction mask (1 = output)
    ///
    /// USB adapters are recognized by GPIO 20-23 all being outputs; anything
    /// else is treated as a PCI Express card.
    pub fn from_directions(dir: u32) -> Self {
        if dir & USB_OUTPUT_MASK == USB_OUTPUT_MASK {
            Self::Usb
        } else {
            Self::Pci
        }
    }

    /// GPIO lines used to program the synthesizer
    pub const fn pins(self) -> PinMapping {
        match self {
            Self::Pci => PinMapping {
                mux: 15,
                clk: 14,
                sel: 13,
                dat: 12,
            },
            Self::Usb => PinMapping {
                mux: 23,
                clk: 22,
                sel: 21,
                dat: 20,
            },
        }
    }

    /// Programming word table, including the zero sentinel
    pub fn table(self) -> &'static [SynthEntry] {
        match self {
            Self::Pci => &PCI_TABLE,
            Self::Usb => &USB_TABLE,
        }
    }

    /// Programming word for `freq` on this variant
    pub fn lookup(self, freq: u32) -> Result<SynthWord> {
        lookup(self.table(), freq)
    }

    /// Supported output frequencies in table order
    pub fn frequencies(self) -> impl Iterator<Item = u32> {
        self.table()
            .iter()
            .map(|entry| entry.freq)
            .take_while(|&freq| freq != 0)
    }

    /// Short human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Pci => "PCI Express",
            Self::Usb => "USB",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::vec::Vec;

    #[test]
    fn test_from_directions() {
        assert_eq!(Variant::from_directions(0x00F0_0000), Variant::Usb);
        assert_eq!(Variant::from_directions(0xFFFF_FFFF), Variant::Usb);
        assert_eq!(Variant::from_directions(0), Variant::Pci);
        assert_eq!(Variant::from_directions(0x0070_0000), Variant::Pci);
        assert_eq!(Variant::from_directions(0x00E0_0000), Variant::Pci);
        assert_eq!(Variant::from_directions(0x0000_F000), Variant::Pci);
        assert_eq!(Variant::from_directions(0xFF0F_FFFF), Variant::Pci);
    }

    #[test]
    fn test_pins() {
        let pci = Variant::Pci.pins();
        assert_eq!((pci.mux, pci.clk, pci.sel, pci.dat), (15, 14, 13, 12));
        let usb = Variant::Usb.pins();
        assert_eq!((usb.mux, usb.clk, usb.sel, usb.dat), (23, 22, 21, 20));
    }

    #[test]
    fn test_frequencies() {
        let pci: Vec<u32> = Variant::Pci.frequencies().collect();
        let usb: Vec<u32> = Variant::Usb.frequencies().collect();
        assert_eq!(pci.len(), 12);
        assert_eq!(pci, usb);
        assert_eq!(pci.first(), Some(&1_228_800));
        assert_eq!(pci.last(), Some(&64_000_000));
    }

    #[test]
    fn test_lookup_uses_variant_table() {
        assert_ne!(
            Variant::Pci.lookup(20_000_000),
            Variant::Usb.lookup(20_000_000)
        );
        assert_eq!(
            Variant::Usb.lookup(9_999_999),
            Err(Error::FrequencyNotSupported(9_999_999))
        );
    }
}
