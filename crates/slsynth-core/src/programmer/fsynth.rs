//! ICS307-3 frequency synthesizer programming
//!
//! The synthesizer has a 132-bit shift register loaded through three GPIO
//! lines (data, clock, latch). A fourth GPIO line switches the serial
//! controller's base clock from the fixed 14.7456 MHz oscillator to the
//! synthesizer output.
//!
//! ## Sequence
//!
//! 1. Detect the board variant from the GPIO direction mask
//! 2. Look up the programming word (fails before any GPIO write)
//! 3. Drive CLK low
//! 4. For each of the 132 bits, MSB first: drive DAT, pulse CLK
//! 5. Pulse SEL to latch the word
//! 6. Drive MUX high to select the synthesizer output
//! 7. Tell the controller the new base clock rate
//!
//! The first failing GPIO request aborts the sequence. MUX is only switched
//! after a complete word has been latched, and a retry always shifts the
//! full 132 bits again.

use crate::error::Result;
use crate::programmer::{BaseClock, GpioPort};
use crate::synth::{PinMapping, SynthWord, Variant};

/// Detect the board variant of `port`
///
/// A failing direction query is not fatal: the port is treated as a PCI
/// Express card.
pub fn detect<P: GpioPort + ?Sized>(port: &mut P) -> Variant {
    match port.gpio_directions() {
        Ok(dir) => {
            let variant = Variant::from_directions(dir);
            log::debug!("fsynth: GPIO directions 0x{:08X}, {} layout", dir, variant);
            variant
        }
        Err(e) => {
            log::warn!("fsynth: {}, assuming {} layout", e, Variant::Pci);
            Variant::Pci
        }
    }
}

/// Shift `word` into the synthesizer, latch it and select the synthesizer
/// as base clock source
pub fn load_word<P: GpioPort + ?Sized>(
    port: &mut P,
    pins: PinMapping,
    word: SynthWord,
) -> Result<()> {
    log::trace!(
        "fsynth: shifting {:08X?} (dat={}, clk={}, sel={}, mux={})",
        word.words(),
        pins.dat,
        pins.clk,
        pins.sel,
        pins.mux
    );

    port.set_bit(pins.clk, false)?;
    for bit in word.bits() {
        port.set_bit(pins.dat, bit)?;
        port.pulse(pins.clk)?;
    }

    port.pulse(pins.sel)?;
    port.set_bit(pins.mux, true)
}

/// Program the synthesizer to `freq` and switch the base clock to it
///
/// Returns the detected board variant. Does not notify the controller of
/// the new rate, see [`set_rate`].
pub fn program<P: GpioPort + ?Sized>(port: &mut P, freq: u32) -> Result<Variant> {
    let variant = detect(port);
    let word = variant.lookup(freq)?;

    load_word(port, variant.pins(), word)?;

    log::info!("fsynth: {} synthesizer set to {} Hz", variant, freq);
    Ok(variant)
}

/// Tell the serial controller its base clock now runs at `hz`
pub fn notify_base_clock<D: BaseClock + ?Sized>(dev: &mut D, hz: u32) -> Result<()> {
    dev.set_base_clock(hz)?;
    log::debug!("fsynth: base clock set to {} Hz", hz);
    Ok(())
}

/// Notify every port sharing the card's base clock
///
/// Multi-port cards have one synthesizer feeding all ports. Stops at the
/// first failing port.
pub fn notify_ports(ports: &mut [&mut dyn BaseClock], hz: u32) -> Result<()> {
    for port in ports.iter_mut() {
        notify_base_clock(&mut **port, hz)?;
    }
    Ok(())
}

/// Program the synthesizer and update the controller's base clock rate
pub fn set_rate<D: GpioPort + BaseClock + ?Sized>(dev: &mut D, freq: u32) -> Result<Variant> {
    let variant = program(dev, freq)?;
    notify_base_clock(dev, freq)?;
    Ok(variant)
}
