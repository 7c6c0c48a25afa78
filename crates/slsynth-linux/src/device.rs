//! SyncLink serial port implementation
//!
//! This module provides the `SyncLinkPort` struct, a handle to an open
//! SyncLink tty device. It implements the `GpioPort` and `BaseClock` traits
//! for synthesizer programming and offers the port setup and raw data
//! transfer calls used once the clock is running.

use crate::error::{Result, SyncLinkError};
use crate::params::{crc, encoding, mode, txidle, GpioDesc, HdlcFlags, Interface, MgslParams};

use slsynth_core::error::{Error as CoreError, Result as CoreResult};
use slsynth_core::programmer::{BaseClock, GpioPort, GpioWrite};

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
};

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

/// Device opened when none is given
pub const DEFAULT_DEVICE: &str = "/dev/ttySLG0";

/// Byte oriented line discipline
const N_TTY: libc::c_int = 0;

/// SyncLink and tty ioctls
mod ioctl {
    use super::{GpioDesc, MgslParams};
    use nix::{
        ioctl_read, ioctl_read_bad, ioctl_write_int_bad, ioctl_write_ptr, ioctl_write_ptr_bad,
        request_code_none,
    };

    // SyncLink ioctl magic number
    const MGSL_MAGIC_IOC: u8 = b'm';

    ioctl_write_ptr!(mgsl_iocsparams, MGSL_MAGIC_IOC, 0, MgslParams);
    ioctl_read!(mgsl_iocgparams, MGSL_MAGIC_IOC, 1, MgslParams);
    ioctl_write_int_bad!(mgsl_iocstxidle, request_code_none!(MGSL_MAGIC_IOC, 2));
    ioctl_write_int_bad!(mgsl_ioctxenable, request_code_none!(MGSL_MAGIC_IOC, 4));
    ioctl_write_int_bad!(mgsl_iocrxenable, request_code_none!(MGSL_MAGIC_IOC, 5));
    ioctl_write_int_bad!(mgsl_iocsif, request_code_none!(MGSL_MAGIC_IOC, 10));
    ioctl_read_bad!(
        mgsl_iocgif,
        request_code_none!(MGSL_MAGIC_IOC, 11),
        libc::c_int
    );
    ioctl_write_ptr!(mgsl_iocsgpio, MGSL_MAGIC_IOC, 16, GpioDesc);
    ioctl_read!(mgsl_iocggpio, MGSL_MAGIC_IOC, 17, GpioDesc);

    // Generic tty ioctls
    ioctl_read_bad!(tiocoutq, libc::TIOCOUTQ, libc::c_int);
    ioctl_write_ptr_bad!(tiocsetd, libc::TIOCSETD, libc::c_int);
}

/// Transmit data transfer method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Programmed I/O: the driver feeds the FIFO as data is queued, so
    /// back-to-back writes go out without idle between them
    Pio,
    /// DMA: each write is sent as a block, idle pattern in between
    Dma,
}

impl TxMode {
    fn enable_arg(self) -> libc::c_int {
        match self {
            Self::Dma => 1,
            Self::Pio => 2,
        }
    }
}

/// Raw mode port configuration
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Internal clock speed in bits per second
    pub clock_speed: u32,
    /// Clock source selection
    pub clock_flags: HdlcFlags,
    /// Internal loopback
    pub loopback: bool,
    /// Pattern sent while no data is queued, see [`crate::params::txidle`]
    pub tx_idle: u32,
    /// Receive transfer size in bytes (1-256)
    ///
    /// Below 128 the driver uses programmed I/O, from 128 DMA (must then be a
    /// multiple of 4). Smaller values lower receive latency at the cost of
    /// more overhead.
    pub rx_fill_level: u16,
    /// Minimum bytes a read waits for (termios VMIN)
    pub rx_min_bytes: u8,
    /// Transmit data transfer method
    pub tx_mode: TxMode,
    /// Electrical interface selected on USB adapters
    pub interface: Interface,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            clock_speed: 2400,
            clock_flags: HdlcFlags::RXC_RXCPIN | HdlcFlags::TXC_TXCPIN,
            loopback: false,
            tx_idle: txidle::ONES,
            rx_fill_level: 8,
            rx_min_bytes: 100,
            tx_mode: TxMode::Pio,
            interface: Interface::Rs422,
        }
    }
}

impl PortConfig {
    /// Set the internal clock speed in bits per second
    pub fn with_clock_speed(mut self, speed: u32) -> Self {
        self.clock_speed = speed;
        self
    }

    /// Enable or disable internal loopback
    pub fn with_loopback(mut self, loopback: bool) -> Self {
        self.loopback = loopback;
        self
    }

    /// Set the transmit data transfer method
    pub fn with_tx_mode(mut self, tx_mode: TxMode) -> Self {
        self.tx_mode = tx_mode;
        self
    }

    /// Set the minimum number of bytes a read blocks for
    pub fn with_rx_min_bytes(mut self, count: u8) -> Self {
        self.rx_min_bytes = count;
        self
    }

    /// Set the interface used on USB adapters
    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interface = interface;
        self
    }

    /// Device parameter block for raw mode, starting from `current`
    pub fn raw_params(&self, current: MgslParams) -> MgslParams {
        MgslParams {
            mode: mode::RAW,
            encoding: encoding::NRZ,
            crc_type: crc::NONE,
            loopback: self.loopback as u8,
            flags: self.clock_flags.bits(),
            clock_speed: self.clock_speed as libc::c_ulong,
            ..current
        }
    }

    /// Receiver enable argument: fill level in bits 16-31, enable in bit 0
    pub fn rx_enable_arg(&self, enable: bool) -> libc::c_int {
        ((self.rx_fill_level as libc::c_int) << 16) | enable as libc::c_int
    }
}

/// Handle to an open SyncLink serial port
///
/// GPIO requests need `&mut self` so a synthesizer transfer cannot be
/// interleaved with other requests on the same handle. Data transfer and
/// queue queries take `&self` so a receive worker and a transmitter can share
/// the port.
pub struct SyncLinkPort {
    /// Device file handle
    file: File,
    /// Device path
    path: String,
}

impl SyncLinkPort {
    /// Open a SyncLink device
    ///
    /// The device is opened non-blocking so the open does not wait for DCD.
    /// [`SyncLinkPort::configure`] switches it to blocking I/O.
    pub fn open(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(SyncLinkError::NoDevice);
        }

        log::debug!("synclink: Opening device {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| SyncLinkError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        log::info!("synclink: Opened {}", path);

        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this is a USB adapter
    ///
    /// USB adapters have no default interface and need one selected.
    pub fn is_usb(&self) -> bool {
        self.path.contains("USB")
    }

    fn control_err(&self, request: &'static str) -> impl FnOnce(Errno) -> SyncLinkError + '_ {
        move |e| SyncLinkError::ControlFailed {
            request,
            path: self.path.clone(),
            source: std::io::Error::from_raw_os_error(e as i32),
        }
    }

    /// Read the device parameters
    pub fn params(&self) -> Result<MgslParams> {
        let mut params = MgslParams::default();
        unsafe {
            ioctl::mgsl_iocgparams(self.file.as_raw_fd(), &mut params)
                .map_err(self.control_err("MGSL_IOCGPARAMS"))?;
        }
        Ok(params)
    }

    /// Write the device parameters
    pub fn set_params(&self, params: &MgslParams) -> Result<()> {
        unsafe {
            ioctl::mgsl_iocsparams(self.file.as_raw_fd(), params)
                .map_err(self.control_err("MGSL_IOCSPARAMS"))?;
        }
        Ok(())
    }

    /// Set the pattern transmitted between data
    pub fn set_tx_idle(&self, idle: u32) -> Result<()> {
        unsafe {
            ioctl::mgsl_iocstxidle(self.file.as_raw_fd(), idle as libc::c_int)
                .map_err(self.control_err("MGSL_IOCSTXIDLE"))?;
        }
        Ok(())
    }

    /// Receiver control, see [`PortConfig::rx_enable_arg`]
    pub fn rx_enable(&self, arg: libc::c_int) -> Result<()> {
        unsafe {
            ioctl::mgsl_iocrxenable(self.file.as_raw_fd(), arg)
                .map_err(self.control_err("MGSL_IOCRXENABLE"))?;
        }
        Ok(())
    }

    /// Start receiving
    pub fn enable_receiver(&self) -> Result<()> {
        self.rx_enable(1)?;
        log::debug!("synclink: {} receiver enabled", self.path);
        Ok(())
    }

    /// Enable the transmitter with the given transfer method
    pub fn tx_enable(&self, tx_mode: TxMode) -> Result<()> {
        unsafe {
            ioctl::mgsl_ioctxenable(self.file.as_raw_fd(), tx_mode.enable_arg())
                .map_err(self.control_err("MGSL_IOCTXENABLE"))?;
        }
        Ok(())
    }

    /// Read the interface word (selection plus option bits)
    pub fn interface(&self) -> Result<libc::c_int> {
        let mut word: libc::c_int = 0;
        unsafe {
            ioctl::mgsl_iocgif(self.file.as_raw_fd(), &mut word)
                .map_err(self.control_err("MGSL_IOCGIF"))?;
        }
        Ok(word)
    }

    /// Write the interface word
    pub fn set_interface(&self, word: libc::c_int) -> Result<()> {
        unsafe {
            ioctl::mgsl_iocsif(self.file.as_raw_fd(), word)
                .map_err(self.control_err("MGSL_IOCSIF"))?;
        }
        Ok(())
    }

    /// Select the electrical interface, keeping the option bits
    pub fn select_interface(&self, interface: Interface) -> Result<()> {
        let word = interface.apply(self.interface()?);
        self.set_interface(word)?;

        if self.interface()? & Interface::MASK == 0 {
            return Err(SyncLinkError::NoInterface);
        }

        log::debug!("synclink: {} interface {:?}", self.path, interface);
        Ok(())
    }

    /// Set the tty line discipline
    pub fn set_line_discipline(&self, ldisc: libc::c_int) -> Result<()> {
        unsafe {
            ioctl::tiocsetd(self.file.as_raw_fd(), &ldisc)
                .map_err(self.control_err("TIOCSETD"))?;
        }
        Ok(())
    }

    /// Put the tty in raw mode with reads blocking for `min_bytes`
    pub fn set_raw_termios(&self, min_bytes: u8) -> Result<()> {
        let fd = self.file.as_fd();
        let mut tio = termios::tcgetattr(fd).map_err(self.control_err("tcgetattr"))?;

        tio.input_flags = InputFlags::empty();
        tio.output_flags = OutputFlags::empty();
        tio.control_flags =
            ControlFlags::CREAD | ControlFlags::CS8 | ControlFlags::HUPCL | ControlFlags::CLOCAL;
        tio.local_flags = LocalFlags::empty();
        tio.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        tio.control_chars[SpecialCharacterIndices::VMIN as usize] = min_bytes;

        termios::tcsetattr(fd, SetArg::TCSANOW, &tio).map_err(self.control_err("tcsetattr"))?;
        Ok(())
    }

    /// Switch to blocking reads and writes
    pub fn set_blocking(&self) -> Result<()> {
        let fd = self.file.as_raw_fd();
        let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(self.control_err("F_GETFL"))?;
        let flags = OFlag::from_bits_truncate(flags) & !OFlag::O_NONBLOCK;
        fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(self.control_err("F_SETFL"))?;
        Ok(())
    }

    /// Set up the port for raw mode transfers
    ///
    /// Leaves the receiver disabled; call [`SyncLinkPort::enable_receiver`]
    /// once a reader is ready.
    pub fn configure(&self, config: &PortConfig) -> Result<()> {
        self.set_line_discipline(N_TTY)?;
        self.set_raw_termios(config.rx_min_bytes)?;

        let params = config.raw_params(self.params()?);
        self.set_params(&params)?;

        self.set_tx_idle(config.tx_idle)?;
        self.rx_enable(config.rx_enable_arg(false))?;
        self.tx_enable(config.tx_mode)?;
        self.set_blocking()?;

        if self.is_usb() {
            self.select_interface(config.interface)?;
        }

        log::info!(
            "synclink: {} configured for raw mode ({} bps, {:?} transmit)",
            self.path,
            config.clock_speed,
            config.tx_mode
        );
        Ok(())
    }

    /// Wait up to `timeout_ms` for received data
    ///
    /// Returns `false` on timeout or when the wait was interrupted by a
    /// signal.
    pub fn wait_readable(&self, timeout_ms: u16) -> Result<bool> {
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(timeout_ms)) {
            Ok(n) => Ok(n > 0),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(SyncLinkError::ReadFailed(std::io::Error::from_raw_os_error(
                e as i32,
            ))),
        }
    }

    /// Read received data
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        (&self.file).read(buf).map_err(SyncLinkError::ReadFailed)
    }

    /// Queue data for transmission
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        (&self.file).write(buf).map_err(SyncLinkError::WriteFailed)
    }

    /// Number of bytes queued but not yet sent
    pub fn outbound_queue(&self) -> Result<usize> {
        let mut count: libc::c_int = 0;
        unsafe {
            ioctl::tiocoutq(self.file.as_raw_fd(), &mut count)
                .map_err(self.control_err("TIOCOUTQ"))?;
        }
        Ok(count.max(0) as usize)
    }

    /// Block until all queued data has been sent
    pub fn drain(&self) -> Result<()> {
        termios::tcdrain(self.file.as_fd()).map_err(self.control_err("tcdrain"))?;
        Ok(())
    }
}

impl GpioPort for SyncLinkPort {
    fn gpio_directions(&mut self) -> CoreResult<u32> {
        let mut desc = GpioDesc {
            dmask: 0xFFFF_FFFF,
            ..Default::default()
        };
        unsafe {
            ioctl::mgsl_iocggpio(self.file.as_raw_fd(), &mut desc)
                .map_err(|e| CoreError::GpioQueryFailed { errno: e as i32 })?;
        }
        Ok(desc.dir)
    }

    fn write_gpio(&mut self, write: GpioWrite) -> CoreResult<()> {
        let desc = GpioDesc {
            state: write.state,
            smask: write.mask,
            dir: 0,
            dmask: 0,
        };
        log::trace!(
            "synclink: GPIO state=0x{:08X} mask=0x{:08X}",
            desc.state,
            desc.smask
        );
        unsafe {
            ioctl::mgsl_iocsgpio(self.file.as_raw_fd(), &desc).map_err(|e| {
                log::error!("synclink: {} MGSL_IOCSGPIO failed: {}", self.path, e);
                CoreError::GpioControlFailed {
                    bit: write.bit().unwrap_or(0),
                    errno: e as i32,
                }
            })?;
        }
        Ok(())
    }
}

impl BaseClock for SyncLinkPort {
    fn set_base_clock(&mut self, hz: u32) -> CoreResult<()> {
        let params = MgslParams {
            mode: mode::BASE_CLOCK,
            clock_speed: hz as libc::c_ulong,
            ..Default::default()
        };
        self.set_params(&params).map_err(|e| {
            log::error!("synclink: {}", e);
            let errno = match &e {
                SyncLinkError::ControlFailed { source, .. } => source.raw_os_error().unwrap_or(0),
                _ => 0,
            };
            CoreError::BaseClockFailed { hz, errno }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_raw_sample_setup() {
        let config = PortConfig::default();
        assert_eq!(config.clock_speed, 2400);
        assert_eq!(config.clock_flags.bits(), 0);
        assert_eq!(config.tx_idle, txidle::ONES);
        assert_eq!(config.rx_min_bytes, 100);
        assert_eq!(config.tx_mode, TxMode::Pio);
        assert_eq!(config.interface, Interface::Rs422);
    }

    #[test]
    fn test_raw_params_keep_unrelated_fields() {
        let current = MgslParams {
            mode: mode::HDLC,
            crc_type: crc::CRC16_CCITT,
            addr_filter: 0xFF,
            data_rate: 9600,
            ..Default::default()
        };
        let params = PortConfig::default().with_loopback(true).raw_params(current);

        assert_eq!(params.mode, mode::RAW);
        assert_eq!(params.encoding, encoding::NRZ);
        assert_eq!(params.crc_type, crc::NONE);
        assert_eq!(params.loopback, 1);
        assert_eq!(params.clock_speed, 2400);
        assert_eq!(params.addr_filter, 0xFF);
        assert_eq!(params.data_rate, 9600);
    }

    #[test]
    fn test_rx_enable_arg() {
        let config = PortConfig::default();
        assert_eq!(config.rx_enable_arg(false), 8 << 16);
        assert_eq!(config.rx_enable_arg(true), (8 << 16) | 1);
    }

    #[test]
    fn test_open_missing_device() {
        let err = SyncLinkPort::open("/dev/ttySLG-does-not-exist").err().unwrap();
        assert!(matches!(err, SyncLinkError::OpenFailed { .. }));
        assert!(err.to_string().contains("open error=2"));
    }

    #[test]
    fn test_open_empty_path() {
        assert!(matches!(
            SyncLinkPort::open(""),
            Err(SyncLinkError::NoDevice)
        ));
    }
}
