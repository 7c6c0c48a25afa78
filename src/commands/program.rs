//! Synthesizer programming and the device session built around it

use super::raw::{run_raw, Pacing};
use crate::cancel::{cancel_on_interrupt, CancelToken};
use crate::link::RawLink;

use slsynth_core::programmer::{fsynth, BaseClock, GpioPort};
use slsynth_core::synth::Variant;
use slsynth_linux::{PortConfig, SyncLinkPort};

/// What to do once the synthesizer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// Exit right after programming
    ProgramOnly,
    /// Run the raw send/receive loop until Ctrl-C
    Raw(Pacing),
}

/// Program `dev` to `freq` and tell every port on the card the new rate
pub fn set_rate<D: GpioPort + BaseClock + ?Sized>(
    dev: &mut D,
    peers: &mut [&mut dyn BaseClock],
    freq: u32,
) -> slsynth_core::Result<Variant> {
    let variant = fsynth::set_rate(dev, freq)?;
    fsynth::notify_ports(peers, freq)?;
    Ok(variant)
}

/// Program the synthesizer of a SyncLink device, then run the session
pub fn run_device(
    device: &str,
    peers: &[String],
    freq: u32,
    session: Session,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("set fsynth rate for {} to {}", device, freq);

    let mut port = SyncLinkPort::open(device)?;
    let mut peer_ports = peers
        .iter()
        .map(|path| SyncLinkPort::open(path))
        .collect::<Result<Vec<_>, _>>()?;
    let mut peer_refs: Vec<&mut dyn BaseClock> = peer_ports
        .iter_mut()
        .map(|p| p as &mut dyn BaseClock)
        .collect();

    let variant = set_rate(&mut port, &mut peer_refs, freq)?;
    log::info!("{} synthesizer running at {} Hz", variant, freq);

    let Session::Raw(pacing) = session else {
        return Ok(());
    };

    println!("raw sample running on {}", device);
    let config = PortConfig::default().with_tx_mode(pacing.tx_mode());
    port.configure(&config)?;

    start_session(&port, pacing, || port.enable_receiver().map_err(Into::into))
}

/// Program an emulated adapter, then run the session over a loopback link
#[cfg(feature = "dummy")]
pub fn run_dummy(
    peers: &[String],
    freq: u32,
    session: Session,
) -> Result<(), Box<dyn std::error::Error>> {
    use slsynth_dummy::{DummyAdapter, DummyLink};

    println!("set fsynth rate for dummy adapter to {}", freq);

    let mut adapter = DummyAdapter::new_default();
    let mut peer_adapters: Vec<DummyAdapter> =
        peers.iter().map(|_| DummyAdapter::new_default()).collect();
    let mut peer_refs: Vec<&mut dyn BaseClock> = peer_adapters
        .iter_mut()
        .map(|p| p as &mut dyn BaseClock)
        .collect();

    set_rate(&mut adapter, &mut peer_refs, freq)?;
    log::info!(
        "dummy: controller clock {:?} Hz after {} GPIO writes",
        adapter.clock_hz(),
        adapter.writes().len()
    );

    let Session::Raw(pacing) = session else {
        return Ok(());
    };

    println!("raw sample running on dummy loopback");
    let link = DummyLink::new();
    start_session(&link, pacing, || Ok(()))
}

/// Install the interrupt handler, start receiving and run the loops
fn start_session<L, F>(
    link: &L,
    pacing: Pacing,
    enable_receiver: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    L: RawLink,
    F: FnOnce() -> Result<(), Box<dyn std::error::Error>>,
{
    let cancel = CancelToken::new();
    cancel_on_interrupt(&cancel)?;
    println!("Press Ctrl-C to stop program.");

    enable_receiver()?;
    run_raw(link, pacing, &cancel)
}
