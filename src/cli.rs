//! CLI argument parsing

use clap::Parser;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser, Debug)]
#[command(name = "slsynth")]
#[command(
    author,
    version,
    about = "SyncLink frequency synthesizer programmer and raw mode link exerciser",
    long_about = "Programs the ICS307 frequency synthesizer of a SyncLink adapter, \
                  switches the controller's base clock to it and then sends and \
                  receives a raw bit stream until interrupted with Ctrl-C."
)]
pub struct Cli {
    /// SyncLink device
    #[arg(default_value = slsynth_linux::DEFAULT_DEVICE)]
    pub device: String,

    /// Synthesizer output frequency in Hz (decimal or 0x hex)
    #[arg(short, long, default_value = "20000000", value_parser = parse_hex_u32)]
    pub frequency: u32,

    /// Other port on the same card, notified of the new base clock (repeatable)
    #[arg(long = "peer", value_name = "DEVICE")]
    pub peers: Vec<String>,

    /// Send 100 byte bursts separated by idle instead of continuous data
    #[arg(long)]
    pub burst: bool,

    /// Program the synthesizer and exit
    #[arg(long, conflicts_with = "burst")]
    pub program_only: bool,

    /// List supported synthesizer frequencies and exit
    #[arg(long)]
    pub list: bool,

    /// Use an emulated adapter and loopback link instead of a device
    #[arg(long)]
    pub dummy: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["slsynth"]).unwrap();
        assert_eq!(cli.device, "/dev/ttySLG0");
        assert_eq!(cli.frequency, 20_000_000);
        assert!(cli.peers.is_empty());
        assert!(!cli.burst && !cli.program_only && !cli.list && !cli.dummy);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "slsynth",
            "/dev/ttyUSB0",
            "-f",
            "0x16E3600",
            "--peer",
            "/dev/ttySLG1",
            "--peer",
            "/dev/ttySLG2",
            "--burst",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.device, "/dev/ttyUSB0");
        assert_eq!(cli.frequency, 24_000_000);
        assert_eq!(cli.peers, ["/dev/ttySLG1", "/dev/ttySLG2"]);
        assert!(cli.burst);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_bad_frequency() {
        assert!(Cli::try_parse_from(["slsynth", "-f", "20MHz"]).is_err());
        assert!(Cli::try_parse_from(["slsynth", "--burst", "--program-only"]).is_err());
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("14745600"), Ok(14_745_600));
        assert_eq!(parse_hex_u32("0XE10000"), Ok(14_745_600));
        assert!(parse_hex_u32("0x").is_err());
    }
}
