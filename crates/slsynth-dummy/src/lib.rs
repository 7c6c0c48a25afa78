//! slsynth-dummy - Emulated SyncLink adapter for testing
//!
//! This crate provides a dummy adapter that emulates the GPIO block of a
//! SyncLink controller with an ICS307 synthesizer wired to it. It's useful
//! for testing and development without real hardware.

mod link;

pub use link::DummyLink;

use slsynth_core::error::{Error, Result};
use slsynth_core::programmer::{BaseClock, GpioPort, GpioWrite};
use slsynth_core::synth::{SynthWord, Variant, USB_OUTPUT_MASK};

/// Fixed oscillator feeding the controller while the mux is low
pub const OSCILLATOR_HZ: u32 = 14_745_600;

/// Configuration for the dummy adapter
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// GPIO direction mask, `None` makes the direction query fail
    pub directions: Option<u32>,
    /// Fail every GPIO write after this many have succeeded
    pub fail_after: Option<usize>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            directions: Some(0),
            fail_after: None,
        }
    }
}

impl DummyConfig {
    /// PCI Express card layout
    pub fn pci() -> Self {
        Self::default()
    }

    /// USB adapter layout
    pub fn usb() -> Self {
        Self {
            directions: Some(USB_OUTPUT_MASK),
            ..Self::default()
        }
    }

    /// Fail every GPIO write after `count` successful ones
    pub fn with_fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

/// Dummy SyncLink adapter
///
/// Tracks the GPIO output levels, feeds the synthesizer's shift register on
/// rising CLK edges and latches it on rising SEL edges.
pub struct DummyAdapter {
    config: DummyConfig,
    variant: Variant,
    levels: u32,
    shift: [u32; 5],
    shifted: usize,
    latched: Option<SynthWord>,
    base_clock: Option<u32>,
    writes: Vec<GpioWrite>,
}

impl DummyAdapter {
    /// Create a new dummy adapter with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let variant = config
            .directions
            .map(Variant::from_directions)
            .unwrap_or(Variant::Pci);
        Self {
            config,
            variant,
            levels: 0,
            shift: [0; 5],
            shifted: 0,
            latched: None,
            base_clock: None,
            writes: Vec::new(),
        }
    }

    /// Create a new dummy adapter with a PCI Express layout
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Board layout this adapter emulates
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Current GPIO output levels
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Every successful GPIO write, in order
    pub fn writes(&self) -> &[GpioWrite] {
        &self.writes
    }

    /// Rising CLK edges seen since the last latch
    pub fn shifted_bits(&self) -> usize {
        self.shifted
    }

    /// Word held by the synthesizer, if one was latched
    pub fn latched_word(&self) -> Option<SynthWord> {
        self.latched
    }

    /// Whether the controller runs from the synthesizer output
    pub fn synthesizer_selected(&self) -> bool {
        self.levels & (1 << self.variant.pins().mux) != 0
    }

    /// Frequency generated for the latched word, if it is a table entry
    pub fn synthesizer_hz(&self) -> Option<u32> {
        let word = self.latched?;
        self.variant
            .table()
            .iter()
            .take_while(|entry| entry.freq != 0)
            .find(|entry| entry.word == word)
            .map(|entry| entry.freq)
    }

    /// Frequency actually feeding the serial controller
    pub fn clock_hz(&self) -> Option<u32> {
        if self.synthesizer_selected() {
            self.synthesizer_hz()
        } else {
            Some(OSCILLATOR_HZ)
        }
    }

    /// Base clock rate last reported to the controller
    pub fn base_clock(&self) -> Option<u32> {
        self.base_clock
    }

    fn shift_in(&mut self, bit: bool) {
        for i in 0..4 {
            self.shift[i] = (self.shift[i] << 1) | (self.shift[i + 1] >> 31);
        }
        // last word only holds 4 bits
        self.shift[4] = ((self.shift[4] << 1) | ((bit as u32) << 28)) & 0xF000_0000;
        self.shifted += 1;
    }

    fn rising(&self, write: &GpioWrite, bit: u8) -> bool {
        let line = 1 << bit;
        write.mask & line != 0 && self.levels & line == 0 && write.state & line != 0
    }
}

impl GpioPort for DummyAdapter {
    fn gpio_directions(&mut self) -> Result<u32> {
        self.config
            .directions
            .ok_or(Error::GpioQueryFailed { errno: 25 })
    }

    fn write_gpio(&mut self, write: GpioWrite) -> Result<()> {
        if self.config.fail_after == Some(self.writes.len()) {
            log::debug!("dummy: failing GPIO write {}", self.writes.len());
            return Err(Error::GpioControlFailed {
                bit: write.bit().unwrap_or(0),
                errno: 5,
            });
        }

        let pins = self.variant.pins();
        if self.rising(&write, pins.clk) {
            let dat = self.levels & (1 << pins.dat) != 0;
            self.shift_in(dat);
        }
        if self.rising(&write, pins.sel) {
            self.latched = Some(SynthWord::new(self.shift));
            log::debug!(
                "dummy: latched {:08X?} after {} bits",
                self.shift,
                self.shifted
            );
            self.shifted = 0;
        }

        self.levels = (self.levels & !write.mask) | (write.state & write.mask);
        self.writes.push(write);
        Ok(())
    }
}

impl BaseClock for DummyAdapter {
    fn set_base_clock(&mut self, hz: u32) -> Result<()> {
        log::debug!("dummy: base clock set to {} Hz", hz);
        self.base_clock = Some(hz);
        Ok(())
    }
}
