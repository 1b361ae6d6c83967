//! Deck Probe
//!
//! Inspects FLAC files through the same `FlacSource` the player uses:
//! prints the track record filled in from the stream header and decodes
//! the whole stream to check that it reads cleanly.

pub mod config;
pub mod error;
pub mod probe;

pub use error::{ProbeError, Result};
