//! Loopback data link
//!
//! Stands in for a port in internal loopback: everything written comes back
//! on the receive side.

use std::collections::VecDeque;
use std::io;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Bytes held before the oldest are dropped, like a receiver overrun
const CAPACITY: usize = 64 * 1024;

/// In-memory loopback link
#[derive(Default)]
pub struct DummyLink {
    queue: Mutex<VecDeque<u8>>,
    ready: Condvar,
}

impl DummyLink {
    /// Create an empty loopback link
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<u8>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `buf`; it is received immediately
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut queue = self.queue();
        queue.extend(buf);
        let excess = queue.len().saturating_sub(CAPACITY);
        if excess > 0 {
            log::debug!("dummy: loopback overrun, dropping {} bytes", excess);
            queue.drain(..excess);
        }
        self.ready.notify_all();
        Ok(buf.len())
    }

    /// Wait up to `timeout_ms` for received data
    pub fn wait_readable(&self, timeout_ms: u16) -> io::Result<bool> {
        let queue = self.queue();
        let (queue, _) = self
            .ready
            .wait_timeout_while(queue, Duration::from_millis(timeout_ms.into()), |q| {
                q.is_empty()
            })
            .unwrap_or_else(PoisonError::into_inner);
        Ok(!queue.is_empty())
    }

    /// Take up to `buf.len()` received bytes
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut queue = self.queue();
        let count = buf.len().min(queue.len());
        for (dst, src) in buf.iter_mut().zip(queue.drain(..count)) {
            *dst = src;
        }
        Ok(count)
    }

    /// Bytes written but not yet read back
    pub fn outbound_queue(&self) -> io::Result<usize> {
        Ok(self.pending())
    }

    /// Bytes waiting to be read
    pub fn pending(&self) -> usize {
        self.queue().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback() {
        let link = DummyLink::new();
        assert!(!link.wait_readable(1).unwrap());

        assert_eq!(link.write(&[1, 2, 3, 4]).unwrap(), 4);
        assert!(link.wait_readable(1).unwrap());
        assert_eq!(link.outbound_queue().unwrap(), 4);

        let mut buf = [0u8; 3];
        assert_eq!(link.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(link.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 4);
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_overrun_drops_oldest() {
        let link = DummyLink::new();
        link.write(&vec![0u8; CAPACITY]).unwrap();
        link.write(&[7]).unwrap();
        assert_eq!(link.pending(), CAPACITY);

        let mut buf = vec![0u8; CAPACITY];
        link.read(&mut buf).unwrap();
        assert_eq!(buf[CAPACITY - 1], 7);
    }

    #[test]
    fn test_wakes_waiting_reader() {
        let link = DummyLink::new();
        std::thread::scope(|s| {
            let reader = s.spawn(|| link.wait_readable(5000).unwrap());
            std::thread::sleep(Duration::from_millis(10));
            link.write(&[0xAA]).unwrap();
            assert!(reader.join().unwrap());
        });
    }
}
