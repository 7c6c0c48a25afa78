//! SyncLink driver ABI: parameter block, GPIO descriptor and constants
//!
//! Layouts and values follow the kernel's `linux/synclink.h`.

use bitflags::bitflags;

/// Serial protocol modes (`MGSL_MODE_*`)
pub mod mode {
    /// Asynchronous (UART)
    pub const ASYNC: libc::c_ulong = 1;
    /// HDLC/SDLC framing
    pub const HDLC: libc::c_ulong = 2;
    /// Monosync
    pub const MONOSYNC: libc::c_ulong = 3;
    /// Bisync
    pub const BISYNC: libc::c_ulong = 4;
    /// Raw bit stream, no framing or byte alignment
    pub const RAW: libc::c_ulong = 6;
    /// Not a protocol: sets the controller's base clock rate from
    /// `clock_speed` and leaves the active parameters unchanged
    pub const BASE_CLOCK: libc::c_ulong = 7;
}

/// Data encodings (`HDLC_ENCODING_*`)
pub mod encoding {
    /// Non-return to zero
    pub const NRZ: u8 = 0;
    /// NRZ, bit inverted
    pub const NRZB: u8 = 1;
    /// NRZ inverted, mark
    pub const NRZI_MARK: u8 = 2;
    /// NRZ inverted, space
    pub const NRZI_SPACE: u8 = 3;
}

/// Frame check sequence types (`HDLC_CRC_*`)
pub mod crc {
    /// No CRC
    pub const NONE: u16 = 0;
    /// CRC16-CCITT
    pub const CRC16_CCITT: u16 = 1;
    /// CRC32-CCITT
    pub const CRC32_CCITT: u16 = 2;
}

/// Transmit idle patterns (`HDLC_TXIDLE_*`)
pub mod txidle {
    /// HDLC flags
    pub const FLAGS: u32 = 0;
    /// Alternating zeros and ones
    pub const ALT_ZEROS_ONES: u32 = 1;
    /// All zeros
    pub const ZEROS: u32 = 2;
    /// All ones
    pub const ONES: u32 = 3;
    /// Alternating mark and space
    pub const ALT_MARK_SPACE: u32 = 4;
    /// Space
    pub const SPACE: u32 = 5;
    /// Mark
    pub const MARK: u32 = 6;
}

bitflags! {
    /// HDLC option flags (`HDLC_FLAG_*`)
    ///
    /// Clock source selection is encoded so that "receive clock from RxC pin"
    /// and "transmit clock from TxC pin" are the zero values, see
    /// [`HdlcFlags::RXC_RXCPIN`] and [`HdlcFlags::TXC_TXCPIN`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HdlcFlags: u16 {
        /// Send abort (15 ones) on transmit underrun
        const UNDERRUN_ABORT15 = 0x0001;
        /// Send flag on transmit underrun
        const UNDERRUN_FLAG    = 0x0002;
        /// Transmit clock from the RxC pin
        const TXC_RXCPIN       = 0x0008;
        /// Share zero between closing and opening flags
        const SHARE_ZERO       = 0x0010;
        /// Transmit only while CTS is active
        const AUTO_CTS         = 0x0020;
        /// Receive only while DCD is active
        const AUTO_DCD         = 0x0040;
        /// Assert RTS only while transmitting
        const AUTO_RTS         = 0x0080;
        /// Receive clock from the DPLL
        const RXC_DPLL         = 0x0100;
        /// Receive clock from the baud rate generator
        const RXC_BRG          = 0x0200;
        /// Transmit clock from the DPLL
        const TXC_DPLL         = 0x0400;
        /// Transmit clock from the baud rate generator
        const TXC_BRG          = 0x0800;
        /// DPLL divides by 8
        const DPLL_DIV8        = 0x1000;
        /// DPLL divides by 16
        const DPLL_DIV16       = 0x2000;
        /// HDLC loop mode
        const LOOPMODE         = 0x4000;
        /// Receive clock from the TxC pin
        const RXC_TXCPIN       = 0x8000;
    }
}

impl HdlcFlags {
    /// Receive clock from the RxC pin (the default)
    pub const RXC_RXCPIN: Self = Self::empty();
    /// Transmit clock from the TxC pin (the default)
    pub const TXC_TXCPIN: Self = Self::empty();
}

/// Physical serial interface (`MGSL_INTERFACE_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    /// Interface drivers disabled
    Disabled = 0,
    /// RS-232
    Rs232 = 1,
    /// V.35
    V35 = 2,
    /// RS-422/RS-485
    Rs422 = 3,
}

impl Interface {
    /// Bits of the interface word that select the electrical interface
    pub const MASK: libc::c_int = 0xF;

    /// Replace the interface selection in `word`, keeping option bits
    pub fn apply(self, word: libc::c_int) -> libc::c_int {
        (word & !Self::MASK) | self as libc::c_int
    }
}

/// Device parameter block (`MGSL_PARAMS`)
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct MgslParams {
    /// Protocol mode, see [`mode`]
    pub mode: libc::c_ulong,
    /// Internal loopback
    pub loopback: u8,
    /// Option flags, see [`HdlcFlags`]
    pub flags: u16,
    /// Data encoding, see [`encoding`]
    pub encoding: u8,
    /// External clock speed in bits per second (0 = external clock)
    pub clock_speed: libc::c_ulong,
    /// Receive HDLC address filter (0xFF = disabled)
    pub addr_filter: u8,
    /// Frame check type, see [`crc`]
    pub crc_type: u16,
    /// Preamble length code
    pub preamble_length: u8,
    /// Preamble pattern code
    pub preamble: u8,
    /// Async data rate in bits per second
    pub data_rate: libc::c_ulong,
    /// Async data bits
    pub data_bits: u8,
    /// Async stop bits
    pub stop_bits: u8,
    /// Async parity
    pub parity: u8,
}

/// GPIO request block (`struct gpio_desc`)
///
/// `smask`/`dmask` select which bits of `state`/`dir` the driver applies.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GpioDesc {
    /// Output levels
    pub state: u32,
    /// Output levels to change
    pub smask: u32,
    /// Directions (1 = output)
    pub dir: u32,
    /// Directions to change
    pub dmask: u32,
}
