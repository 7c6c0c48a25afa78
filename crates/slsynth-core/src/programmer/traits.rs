//! Device trait definitions
//!
//! A SyncLink port exposes its GPIO lines and base clock setting through
//! device control requests. Backends implement these traits on top of their
//! transport; the programmer only ever talks to the traits.

use crate::error::Result;

/// One GPIO output request: drive the lines in `mask` to the levels in `state`
///
/// Lines outside `mask` are left untouched by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioWrite {
    /// Output levels
    pub state: u32,
    /// Lines affected by this request
    pub mask: u32,
}

impl GpioWrite {
    /// Request that drives exactly one line
    pub const fn single(bit: u8, high: bool) -> Self {
        Self {
            state: (high as u32) << bit,
            mask: 1 << bit,
        }
    }

    /// The line driven, if this request drives exactly one line
    pub fn bit(&self) -> Option<u8> {
        if self.mask.count_ones() == 1 {
            Some(self.mask.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Level requested for `bit`
    pub fn level(&self, bit: u8) -> bool {
        self.state & (1 << bit) != 0
    }
}

/// Access to the serial controller's general purpose I/O lines
///
/// Every call is one device control request. Implementations must not
/// reorder or batch requests: the synthesizer samples the lines directly.
pub trait GpioPort {
    /// Read the GPIO direction mask (1 = output)
    fn gpio_directions(&mut self) -> Result<u32>;

    /// Issue one GPIO output request
    fn write_gpio(&mut self, write: GpioWrite) -> Result<()>;

    /// Drive a single line high or low
    fn set_bit(&mut self, bit: u8, high: bool) -> Result<()> {
        self.write_gpio(GpioWrite::single(bit, high))
    }

    /// Drive a line high then low
    fn pulse(&mut self, bit: u8) -> Result<()> {
        self.set_bit(bit, true)?;
        self.set_bit(bit, false)
    }
}

/// Serial controller base clock rate
///
/// The controller derives every port clock from its base clock, so it has to
/// know the rate after the clock source changes.
pub trait BaseClock {
    /// Tell the controller the base clock now runs at `hz`
    fn set_base_clock(&mut self, hz: u32) -> Result<()>;
}

impl<T: GpioPort + ?Sized> GpioPort for &mut T {
    fn gpio_directions(&mut self) -> Result<u32> {
        (**self).gpio_directions()
    }

    fn write_gpio(&mut self, write: GpioWrite) -> Result<()> {
        (**self).write_gpio(write)
    }
}

impl<T: BaseClock + ?Sized> BaseClock for &mut T {
    fn set_base_clock(&mut self, hz: u32) -> Result<()> {
        (**self).set_base_clock(hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_write() {
        let high = GpioWrite::single(22, true);
        assert_eq!(high.state, 1 << 22);
        assert_eq!(high.mask, 1 << 22);
        assert_eq!(high.bit(), Some(22));
        assert!(high.level(22));

        let low = GpioWrite::single(12, false);
        assert_eq!(low.state, 0);
        assert_eq!(low.mask, 1 << 12);
        assert_eq!(low.bit(), Some(12));
        assert!(!low.level(12));
    }

    #[test]
    fn test_multi_line_write_has_no_bit() {
        let write = GpioWrite {
            state: 0,
            mask: 0b11,
        };
        assert_eq!(write.bit(), None);
    }
}
