//! CLI command implementations
//!
//! ## Program
//!
//! The `program` module loads the synthesizer word and switches the base
//! clock, on a SyncLink device or on the emulated adapter.
//!
//! ## Raw
//!
//! The `raw` module runs the send/receive loop that exercises the link once
//! the clock is running.

mod list;
pub mod program;
pub mod raw;

pub use list::list_frequencies;
