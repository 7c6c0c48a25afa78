//! Raw mode send/receive loop
//!
//! Raw mode captures a bit on every clock without framing or byte alignment,
//! so received data can be shifted by 0-7 bits relative to what was sent.
//! The transmitter sends all-zero blocks to contrast with the all-ones idle
//! pattern.

use crate::cancel::CancelToken;
use crate::hexdump::hex_dump;
use crate::link::RawLink;

use slsynth_linux::TxMode;

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bytes per transmitted block and per read
pub const BLOCK_SIZE: usize = 100;

/// Receive readiness poll, bounds how long the worker takes to see a cancel
const RX_POLL_MS: u16 = 100;

/// Outbound queue poll interval in continuous mode
const QUEUE_POLL: Duration = Duration::from_millis(5);

/// Idle gap after each block in burst mode
const BURST_GAP: Duration = Duration::from_millis(25);

/// How transmitted blocks are spaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Keep between one and two blocks queued so the line never idles
    Continuous,
    /// Send each block completely, then idle
    Burst,
}

impl Pacing {
    /// Transmit transfer method suited to this pacing
    pub fn tx_mode(self) -> TxMode {
        match self {
            Self::Continuous => TxMode::Pio,
            Self::Burst => TxMode::Dma,
        }
    }
}

/// Run the receive worker and the transmitter until cancelled
///
/// Returns the transmit error if a write failed. A receive error only stops
/// the worker.
pub fn run_raw<L: RawLink>(
    link: &L,
    pacing: Pacing,
    cancel: &CancelToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let sent = run_loops(link, pacing, cancel, io::stdout(), io::stdout())
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;
    log::debug!("transmit stopped after {} blocks", sent);
    Ok(())
}

fn run_loops<L, R, T>(
    link: &L,
    pacing: Pacing,
    cancel: &CancelToken,
    rx_out: R,
    tx_out: T,
) -> Result<u32, BoxError>
where
    L: RawLink,
    R: Write + Send,
    T: Write,
{
    thread::scope(|s| {
        let receiver = s.spawn(|| receive(link, cancel, rx_out));

        let result = transmit(link, pacing, cancel, tx_out);
        cancel.cancel();

        match receiver.join() {
            Ok(Ok(blocks)) => log::debug!("receive worker stopped after {} blocks", blocks),
            Ok(Err(e)) => log::warn!("receive stopped: {}", e),
            Err(_) => log::error!("receive worker panicked"),
        }

        result
    })
}

/// Print every received block until the link closes or `cancel` is set
///
/// Returns the number of blocks received.
fn receive<L: RawLink, W: Write>(
    link: &L,
    cancel: &CancelToken,
    mut out: W,
) -> Result<u32, BoxError> {
    let mut buf = [0u8; BLOCK_SIZE];
    let mut blocks = 0;

    while !cancel.is_cancelled() {
        if !link.wait_readable(RX_POLL_MS)? {
            continue;
        }

        let count = link.read(&mut buf)?;
        if count == 0 {
            log::debug!("receive: link closed");
            break;
        }

        blocks += 1;
        // one write per block keeps the dump together on a shared stdout
        let text = format!(
            "<<< {:09} received {} bytes\n{}",
            blocks,
            count,
            hex_dump(&buf[..count])
        );
        out.write_all(text.as_bytes())?;
    }

    Ok(blocks)
}

/// Send all-zero blocks until `cancel` is set or a write fails
///
/// Returns the number of blocks sent.
fn transmit<L: RawLink, W: Write>(
    link: &L,
    pacing: Pacing,
    cancel: &CancelToken,
    mut out: W,
) -> Result<u32, BoxError> {
    let buf = [0u8; BLOCK_SIZE];
    let mut blocks = 0;

    while !cancel.is_cancelled() {
        blocks += 1;
        writeln!(out, ">>> {:09} send {} bytes", blocks, BLOCK_SIZE)?;
        link.write(&buf)?;

        match pacing {
            Pacing::Continuous => {
                writeln!(out, ">>> wait for send count <= {}", BLOCK_SIZE)?;
                wait_for_queue(link, cancel);
            }
            Pacing::Burst => {
                if let Err(e) = link.drain() {
                    log::debug!("transmit: drain failed: {}", e);
                }
                thread::sleep(BURST_GAP);
            }
        }
    }

    Ok(blocks)
}

/// Wait until at most one block is queued
///
/// Keeping the queue non-empty prevents idle between blocks; keeping it under
/// two blocks bounds the latency from write to line. A failing queue query
/// ends the wait.
fn wait_for_queue<L: RawLink>(link: &L, cancel: &CancelToken) {
    while !cancel.is_cancelled() {
        match link.outbound_queue() {
            Ok(queued) if queued > BLOCK_SIZE => thread::sleep(QUEUE_POLL),
            Ok(_) => break,
            Err(e) => {
                log::debug!("transmit: queue query failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        rx: VecDeque<Vec<u8>>,
        rx_closed: bool,
        queue_depths: VecDeque<usize>,
        queue_queries: usize,
        writes: Vec<usize>,
        drains: usize,
        fail_write: Option<usize>,
        cancel_on_write: Option<(usize, CancelToken)>,
    }

    #[derive(Default)]
    struct FakeLink {
        state: Mutex<State>,
    }

    impl FakeLink {
        fn state(&self) -> std::sync::MutexGuard<'_, State> {
            self.state.lock().unwrap()
        }
    }

    impl RawLink for FakeLink {
        type Error = io::Error;

        fn wait_readable(&self, _timeout_ms: u16) -> Result<bool, io::Error> {
            let ready = {
                let state = self.state();
                !state.rx.is_empty() || state.rx_closed
            };
            if !ready {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(ready)
        }

        fn read(&self, buf: &mut [u8]) -> Result<usize, io::Error> {
            match self.state().rx.pop_front() {
                Some(block) => {
                    buf[..block.len()].copy_from_slice(&block);
                    Ok(block.len())
                }
                None => Ok(0),
            }
        }

        fn write(&self, buf: &[u8]) -> Result<usize, io::Error> {
            let mut state = self.state();
            if state.fail_write == Some(state.writes.len()) {
                return Err(io::Error::from_raw_os_error(5));
            }
            state.writes.push(buf.len());
            if let Some((after, token)) = &state.cancel_on_write {
                if state.writes.len() == *after {
                    token.cancel();
                }
            }
            Ok(buf.len())
        }

        fn outbound_queue(&self) -> Result<usize, io::Error> {
            let mut state = self.state();
            state.queue_queries += 1;
            state
                .queue_depths
                .pop_front()
                .ok_or_else(|| io::Error::from_raw_os_error(25))
        }

        fn drain(&self) -> Result<(), io::Error> {
            self.state().drains += 1;
            Ok(())
        }
    }

    fn cancelled_after(link: &FakeLink, writes: usize) -> CancelToken {
        let token = CancelToken::new();
        link.state().cancel_on_write = Some((writes, token.clone()));
        token
    }

    #[test]
    fn test_wait_for_queue_resumes_at_one_block() {
        let link = FakeLink::default();
        link.state().queue_depths = [350, 250, 101, 100, 500].into();

        wait_for_queue(&link, &CancelToken::new());
        assert_eq!(link.state().queue_queries, 4);
        assert_eq!(link.state().queue_depths, [500]);
    }

    #[test]
    fn test_wait_for_queue_stops_on_query_error() {
        let link = FakeLink::default();
        wait_for_queue(&link, &CancelToken::new());
        assert_eq!(link.state().queue_queries, 1);
    }

    #[test]
    fn test_wait_for_queue_observes_cancel() {
        let link = FakeLink::default();
        link.state().queue_depths = [1000; 8].into();
        let token = CancelToken::new();
        token.cancel();
        wait_for_queue(&link, &token);
        assert_eq!(link.state().queue_queries, 0);
    }

    #[test]
    fn test_transmit_continuous() {
        let link = FakeLink::default();
        link.state().queue_depths = [200, 100, 0, 50].into();
        let token = cancelled_after(&link, 3);

        let mut out = Vec::new();
        assert_eq!(
            transmit(&link, Pacing::Continuous, &token, &mut out).unwrap(),
            3
        );

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], ">>> 000000001 send 100 bytes");
        assert_eq!(lines[1], ">>> wait for send count <= 100");
        assert_eq!(lines[4], ">>> 000000003 send 100 bytes");
        assert_eq!(link.state().writes, [100, 100, 100]);
        assert_eq!(link.state().drains, 0);
    }

    #[test]
    fn test_transmit_burst_drains() {
        let link = FakeLink::default();
        let token = cancelled_after(&link, 2);

        let mut out = Vec::new();
        assert_eq!(transmit(&link, Pacing::Burst, &token, &mut out).unwrap(), 2);
        assert_eq!(link.state().drains, 2);
        assert_eq!(link.state().queue_queries, 0);
        assert!(!String::from_utf8(out).unwrap().contains("wait"));
    }

    #[test]
    fn test_transmit_write_failure() {
        let link = FakeLink::default();
        link.state().fail_write = Some(1);
        link.state().queue_depths = [0; 4].into();

        let result = transmit(&link, Pacing::Continuous, &CancelToken::new(), io::sink());
        assert!(result.is_err());
        assert_eq!(link.state().writes.len(), 1);
    }

    #[test]
    fn test_receive_prints_blocks_until_closed() {
        let link = FakeLink::default();
        {
            let mut state = link.state();
            state.rx = [vec![0xFF; 100], vec![0x80, 0x01]].into();
            state.rx_closed = true;
        }

        let mut out = Vec::new();
        assert_eq!(receive(&link, &CancelToken::new(), &mut out).unwrap(), 2);

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("<<< 000000001 received 100 bytes\n0000: FF FF"));
        assert!(out.ends_with("<<< 000000002 received 2 bytes\n0000: 80 01\n"));
    }

    #[test]
    fn test_receive_observes_cancel() {
        let link = FakeLink::default();
        link.state().rx = [vec![0; 100]].into();
        let token = CancelToken::new();
        token.cancel();

        assert_eq!(receive(&link, &token, io::sink()).unwrap(), 0);
        assert_eq!(link.state().rx.len(), 1);
    }

    #[test]
    fn test_cancel_stops_both_loops() {
        let link = FakeLink::default();
        link.state().queue_depths = [0; 16].into();
        let token = cancelled_after(&link, 5);

        let sent = run_loops(&link, Pacing::Continuous, &token, io::sink(), io::sink()).unwrap();
        assert_eq!(sent, 5);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_write_failure_stops_receiver() {
        let link = FakeLink::default();
        link.state().fail_write = Some(2);
        link.state().queue_depths = [0; 16].into();
        let token = CancelToken::new();

        let result = run_loops(&link, Pacing::Continuous, &token, io::sink(), io::sink());
        assert!(result.is_err());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_pacing_tx_mode() {
        assert_eq!(Pacing::Continuous.tx_mode(), TxMode::Pio);
        assert_eq!(Pacing::Burst.tx_mode(), TxMode::Dma);
    }
}
