//! Raw data link abstraction used by the send/receive loops

use slsynth_linux::{SyncLinkError, SyncLinkPort};

/// A port carrying a raw bit stream
///
/// All calls take `&self`: the receive worker and the transmitter use the
/// same link from two threads.
pub trait RawLink: Sync {
    /// Error returned by link operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Wait up to `timeout_ms` for received data
    fn wait_readable(&self, timeout_ms: u16) -> Result<bool, Self::Error>;

    /// Read received data, 0 means the link closed
    fn read(&self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue data for transmission
    fn write(&self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Bytes queued but not yet sent
    fn outbound_queue(&self) -> Result<usize, Self::Error>;

    /// Block until everything queued has been sent
    fn drain(&self) -> Result<(), Self::Error>;
}

impl RawLink for SyncLinkPort {
    type Error = SyncLinkError;

    fn wait_readable(&self, timeout_ms: u16) -> Result<bool, Self::Error> {
        SyncLinkPort::wait_readable(self, timeout_ms)
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        SyncLinkPort::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Self::Error> {
        SyncLinkPort::write(self, buf)
    }

    fn outbound_queue(&self) -> Result<usize, Self::Error> {
        SyncLinkPort::outbound_queue(self)
    }

    fn drain(&self) -> Result<(), Self::Error> {
        SyncLinkPort::drain(self)
    }
}

#[cfg(feature = "dummy")]
impl RawLink for slsynth_dummy::DummyLink {
    type Error = std::io::Error;

    fn wait_readable(&self, timeout_ms: u16) -> Result<bool, Self::Error> {
        slsynth_dummy::DummyLink::wait_readable(self, timeout_ms)
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        slsynth_dummy::DummyLink::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Self::Error> {
        slsynth_dummy::DummyLink::write(self, buf)
    }

    fn outbound_queue(&self) -> Result<usize, Self::Error> {
        slsynth_dummy::DummyLink::outbound_queue(self)
    }

    fn drain(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
