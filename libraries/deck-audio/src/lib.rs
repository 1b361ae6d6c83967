//! Deck Audio
//!
//! Streaming FLAC decoding for Deck.
//!
//! This crate provides:
//! - [`FlacSource`], a pull reader of interleaved 16-bit stereo samples with
//!   sample-accurate seeking
//! - The frame decoder contract ([`frame`]) and a Symphonia-backed engine
//!   implementing it
//! - Byte-stream cursors over files, memory and forward-only readers
//! - Vorbis comment parsing into Deck's track records
//!
//! # Example: Reading Samples
//!
//! ```rust,no_run
//! use deck_audio::{DecoderSettings, FlacSource};
//! use deck_core::TrackInfo;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = FlacSource::new("/music/track.flac")
//!     .with_settings(DecoderSettings::default());
//!
//! let mut info = TrackInfo::default();
//! source.parse_header(&mut info)?;
//! println!("{:?} by {:?}", info.title, info.artist);
//!
//! // Jump one second in (44.1 kHz stereo) and pull a block
//! source.seek(88_200)?;
//! let mut block = vec![0i16; 2048];
//! let n = source.read(&mut block);
//! println!("Read {} samples", n);
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Decoding From Memory
//!
//! ```rust,no_run
//! use deck_audio::FlacSource;
//! use std::io::Cursor;
//!
//! # fn example(bytes: Vec<u8>) -> deck_audio::Result<()> {
//! let mut source = FlacSource::new("in-memory.flac");
//! source.open_stream(Box::new(Cursor::new(bytes)))?;
//! # Ok(())
//! # }
//! ```

mod carry;
pub mod channels;
mod error;
mod flac;
pub mod frame;
mod settings;
pub mod stream;
pub mod symphonia_engine;
pub mod tags;

pub use carry::CarryOver;
pub use error::{AudioError, Result};
pub use flac::{FlacSource, ReadStatus};
pub use frame::{DecoderFactory, FrameDecoder, FrameSink, StreamInfo};
pub use settings::DecoderSettings;
pub use stream::{ByteStream, FileStream, SequentialStream};
pub use symphonia_engine::{SymphoniaFactory, SymphoniaFlacDecoder};
pub use tags::TagSet;
