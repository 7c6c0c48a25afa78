//! List command implementation

use slsynth_core::synth::Variant;

/// Every supported frequency with its availability per board family
pub fn frequency_rows() -> Vec<(u32, bool, bool)> {
    let mut freqs: Vec<u32> = Variant::Pci
        .frequencies()
        .chain(Variant::Usb.frequencies())
        .collect();
    freqs.sort_unstable();
    freqs.dedup();

    freqs
        .into_iter()
        .map(|f| {
            (
                f,
                Variant::Pci.lookup(f).is_ok(),
                Variant::Usb.lookup(f).is_ok(),
            )
        })
        .collect()
}

/// List all supported synthesizer frequencies
pub fn list_frequencies() {
    println!("Supported synthesizer frequencies:");
    println!();
    println!(
        "{:>14}  {:<12} {:<4}",
        "Frequency",
        Variant::Pci.name(),
        Variant::Usb.name()
    );
    println!("{}", "-".repeat(34));

    for (freq, pci, usb) in frequency_rows() {
        println!(
            "{:>14}  {:<12} {:<4}",
            format_hz(freq),
            if pci { "yes" } else { "-" },
            if usb { "yes" } else { "-" }
        );
    }
}

fn format_hz(hz: u32) -> String {
    format!("{}.{:04} MHz", hz / 1_000_000, (hz % 1_000_000) / 100)
}
