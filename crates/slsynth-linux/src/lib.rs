//! slsynth-linux - Linux SyncLink serial device support
//!
//! This crate drives SyncLink GT/AC serial adapters through the tty
//! character devices created by the `synclink_gt` driver (`/dev/ttySLGn`)
//! and MicroGate USB adapters (`/dev/ttyUSBn` style names containing "USB").
//!
//! # Overview
//!
//! Beyond the normal tty interface the driver exposes `MGSL_IOC*` ioctls
//! for HDLC/raw mode parameters, transmit idle patterns, receiver and
//! transmitter control, the physical interface (RS232, V.35, RS422) and the
//! serial controller's general purpose I/O lines. The GPIO and base clock
//! ioctls are what [`slsynth_core::programmer::fsynth`] uses to program the
//! on-board frequency synthesizer.
//!
//! # Example
//!
//! ```no_run
//! use slsynth_core::programmer::fsynth;
//! use slsynth_linux::{PortConfig, SyncLinkPort};
//!
//! let mut port = SyncLinkPort::open("/dev/ttySLG0")?;
//! fsynth::set_rate(&mut port, 20_000_000)?;
//!
//! port.configure(&PortConfig::default())?;
//! port.enable_receiver()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - `synclink_gt` kernel driver (or the MicroGate USB driver)
//! - Read/write access to the device node (usually the `dialout` group)

pub mod device;
pub mod error;
pub mod params;

// Re-exports
pub use device::{PortConfig, SyncLinkPort, TxMode, DEFAULT_DEVICE};
pub use error::{Result, SyncLinkError};
pub use params::{HdlcFlags, Interface, MgslParams};
