//! Precomputed ICS307-3 programming word tables
//!
//! Values come from the vendor synthesis tool and must not be edited or
//! recomputed. Each table ends with a zero-frequency sentinel entry.

use crate::error::{Error, Result};

/// Number of bits in an ICS307 programming word
pub const WORD_BITS: usize = 132;

/// A 132-bit ICS307 programming word
///
/// Stored as five 32-bit words. Bits are transmitted MSB first starting with
/// word 0; only the top 4 bits of word 4 are part of the 132-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthWord {
    words: [u32; 5],
}

impl SynthWord {
    /// Create a programming word from its five 32-bit words
    pub const fn new(words: [u32; 5]) -> Self {
        Self { words }
    }

    /// The raw 32-bit words
    pub const fn words(&self) -> &[u32; 5] {
        &self.words
    }

    /// Bit `index` of the 132-bit field in transmit order
    ///
    /// Index 0 is bit 31 of word 0, index 131 is bit 28 of word 4.
    ///
    /// # Panics
    ///
    /// Panics if `index >= WORD_BITS`.
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < WORD_BITS, "bit index {} out of range", index);
        let word = self.words[index / 32];
        (word << (index % 32)) & 0x8000_0000 != 0
    }

    /// Iterate over all 132 bits in transmit order (MSB first)
    pub fn bits(self) -> impl Iterator<Item = bool> {
        (0..WORD_BITS).map(move |i| self.bit(i))
    }
}

/// One frequency table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthEntry {
    /// Synthesizer output frequency in Hz (0 = end of table)
    pub freq: u32,
    /// Programming word producing `freq`
    pub word: SynthWord,
}

const fn entry(freq: u32, words: [u32; 5]) -> SynthEntry {
    SynthEntry {
        freq,
        word: SynthWord::new(words),
    }
}

/// PCI Express cards
///
/// ICS307-3 with 14.7456 MHz reference oscillator, VDD 3.3V,
/// CLK1 (pin 8) outputs the clock.
pub static PCI_TABLE: [SynthEntry; 13] = [
    entry(1_228_800, [0x1800155E, 0x29A00000, 0x00000000, 0x0000DFFF, 0x60000000]),
    entry(12_288_000, [0x29BFDC00, 0x61200000, 0x00000000, 0x0000A5FF, 0xA0000000]),
    entry(14_745_600, [0x38003C05, 0x24200000, 0x00000000, 0x000057FF, 0xA0000000]),
    entry(16_000_000, [0x280CFC02, 0x64A00000, 0x00000000, 0x000307FD, 0x20000000]),
    entry(16_384_000, [0x08001402, 0xA1200000, 0x00000000, 0x0000A5FF, 0xA0000000]),
    entry(20_000_000, [0x00001403, 0xE0C00000, 0x00000000, 0x00045E02, 0xF0000000]),
    entry(24_000_000, [0x00001405, 0x61400000, 0x00000000, 0x0004D204, 0x30000000]),
    entry(28_219_200, [0x00001405, 0xA1400000, 0x00000000, 0x0003C1FC, 0x20000000]),
    entry(30_000_000, [0x20267C05, 0x64C00000, 0x00000000, 0x00050603, 0x30000000]),
    entry(32_000_000, [0x21BFDC00, 0x5A400000, 0x00000000, 0x0004D206, 0x30000000]),
    entry(45_056_000, [0x08001406, 0xE0200000, 0x00000000, 0x000217FE, 0x20000000]),
    entry(64_000_000, [0x21BFDC00, 0x12000000, 0x00000000, 0x000F5E14, 0xF0000000]),
    entry(0, [0, 0, 0, 0, 0]),
];

/// USB adapters
///
/// ICS307-3 with 14.7456 MHz crystal, VDD 3.3V, CLK3 (pin 14) is fsynth and
/// CLK1 (pin 8) the base clock.
///
/// CLK1 and CLK3 must always be driven to avoid floating FPGA clock inputs,
/// so every word selects the same output on both, or CLK1 as a multiple of
/// CLK3.
pub static USB_TABLE: [SynthEntry; 13] = [
    entry(1_228_800, [0x296C1402, 0x25200000, 0x00000000, 0x00009FFF, 0xA0000000]),
    entry(12_288_000, [0x28401400, 0xE5200000, 0x00000000, 0x00009BFF, 0xA0000000]),
    entry(14_745_600, [0x28481401, 0xE5200000, 0x00000000, 0x0000A5FF, 0xA0000000]),
    entry(16_000_000, [0x284C1402, 0x64A00000, 0x00000000, 0x000307FD, 0x20000000]),
    entry(16_384_000, [0x28501402, 0xE4A00000, 0x00000000, 0x0001F9FE, 0x20000000]),
    entry(20_000_000, [0x205C1404, 0x65400000, 0x00000000, 0x00068205, 0xF0000000]),
    entry(24_000_000, [0x20641405, 0x65400000, 0x00000000, 0x0004D204, 0x30000000]),
    entry(28_219_200, [0x20641405, 0x64C00000, 0x00000000, 0x0004F603, 0x70000000]),
    entry(30_000_000, [0x20641405, 0x64C00000, 0x00000000, 0x00050603, 0x30000000]),
    entry(32_000_000, [0x206C1406, 0x65400000, 0x00000000, 0x00049E03, 0xF0000000]),
    entry(45_056_000, [0x28701406, 0xE4200000, 0x00000000, 0x000217FE, 0x20000000]),
    entry(64_000_000, [0x20781400, 0x4D400000, 0x00000000, 0x00049E03, 0xF0000000]),
    entry(0, [0, 0, 0, 0, 0]),
];

/// Find the programming word for `freq`
///
/// Scans `table` in order up to the zero-frequency sentinel and returns the
/// first exact match.
pub fn lookup(table: &[SynthEntry], freq: u32) -> Result<SynthWord> {
    table
        .iter()
        .take_while(|entry| entry.freq != 0)
        .find(|entry| entry.freq == freq)
        .map(|entry| entry.word)
        .ok_or(Error::FrequencyNotSupported(freq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn check_table(table: &[SynthEntry]) {
        let (sentinel, entries) = table.split_last().unwrap();
        assert_eq!(entries.len(), 12);
        assert_eq!(sentinel.freq, 0);
        assert_eq!(sentinel.word, SynthWord::new([0; 5]));

        for (i, a) in entries.iter().enumerate() {
            assert_ne!(a.freq, 0);
            for b in &entries[i + 1..] {
                assert_ne!(a.freq, b.freq, "duplicate frequency {}", a.freq);
            }
        }
    }

    #[test]
    fn test_table_shape() {
        check_table(&PCI_TABLE);
        check_table(&USB_TABLE);
    }

    #[test]
    fn test_lookup_returns_stored_word() {
        for table in [&PCI_TABLE[..], &USB_TABLE[..]] {
            for entry in table.iter().take_while(|e| e.freq != 0) {
                assert_eq!(lookup(table, entry.freq), Ok(entry.word));
            }
        }
    }

    #[test]
    fn test_lookup_24mhz() {
        assert_eq!(
            lookup(&PCI_TABLE, 24_000_000).unwrap().words(),
            &[0x00001405, 0x61400000, 0x00000000, 0x0004D204, 0x30000000]
        );
        assert_eq!(
            lookup(&USB_TABLE, 24_000_000).unwrap().words(),
            &[0x20641405, 0x65400000, 0x00000000, 0x0004D204, 0x30000000]
        );
    }

    #[test]
    fn test_lookup_missing() {
        for freq in [0, 1, 9_999_999, 20_000_001, 14_745_599, u32::MAX] {
            assert_eq!(
                lookup(&PCI_TABLE, freq),
                Err(Error::FrequencyNotSupported(freq))
            );
            assert_eq!(
                lookup(&USB_TABLE, freq),
                Err(Error::FrequencyNotSupported(freq))
            );
        }
    }

    #[test]
    fn test_lookup_stops_at_sentinel() {
        let table = [
            entry(1_000, [1, 0, 0, 0, 0]),
            entry(0, [0; 5]),
            entry(2_000, [2, 0, 0, 0, 0]),
        ];
        assert!(lookup(&table, 1_000).is_ok());
        assert_eq!(lookup(&table, 2_000), Err(Error::FrequencyNotSupported(2_000)));
    }

    #[test]
    fn test_bits_msb_first() {
        let word = SynthWord::new([0xFFFF_FFFF, 0, 0, 0, 0]);
        let bits: Vec<bool> = word.bits().collect();
        assert_eq!(bits.len(), WORD_BITS);
        assert!(bits[..32].iter().all(|&b| b));
        assert!(bits[32..].iter().all(|&b| !b));
    }

    #[test]
    fn test_bits_word_boundaries() {
        let word = SynthWord::new([0x0000_0001, 0x8000_0000, 0, 0, 0x9000_0000]);
        assert!(word.bit(31));
        assert!(word.bit(32));
        assert!(!word.bit(33));
        assert!(word.bit(128));
        assert!(!word.bit(129));
        assert!(!word.bit(130));
        assert!(word.bit(131));
        assert_eq!(word.bits().filter(|&b| b).count(), 4);
    }

    #[test]
    fn test_bits_ignore_low_bits_of_last_word() {
        let word = SynthWord::new([0, 0, 0, 0, 0x0FFF_FFFF]);
        assert!(word.bits().all(|b| !b));
    }
}
