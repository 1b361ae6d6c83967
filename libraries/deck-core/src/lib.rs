//! Deck Core
//!
//! Platform-agnostic types, traits, and error handling shared between the
//! decoding libraries and the library/catalog side of Deck.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackInfo`, `AudioFormat`, `SampleRate`
//! - **Core Traits**: `SoundSource`
//! - **Error Handling**: Unified `DeckError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use deck_core::{AudioFormat, SampleRate, TrackInfo};
//!
//! let mut info = TrackInfo::default();
//! info.set_type("FLAC");
//! info.bitrate_kbps = Some(1411);
//!
//! let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, 16);
//! assert_eq!(format.byte_rate(), 176_400);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{DeckError, Result};
pub use traits::SoundSource;
pub use types::{AudioFormat, SampleRate, TrackInfo};
