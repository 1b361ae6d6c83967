/// Core traits for Deck
use crate::error::Result;
use crate::types::{AudioFormat, TrackInfo};
use std::path::Path;

/// A seekable source of interleaved 16-bit PCM samples
///
/// Positions and lengths are expressed in *logical samples*: one logical
/// sample is one interleaved `i16` slot of the stereo output, so a stereo
/// frame spans two logical samples.
pub trait SoundSource: Send {
    /// Open the underlying asset and read its stream parameters
    ///
    /// Opening an already open source starts a fresh session.
    ///
    /// # Errors
    /// Returns an error if the asset cannot be read or is not supported
    fn open(&mut self) -> Result<()>;

    /// Seek to a logical sample index
    ///
    /// Returns the requested position. A closed source returns `0`.
    fn seek(&mut self, position: u64) -> Result<u64>;

    /// Fill `destination` with interleaved samples
    ///
    /// Returns the number of samples written. A short count means the
    /// stream is exhausted or the decoder failed; it is never an error.
    fn read(&mut self, destination: &mut [i16]) -> usize;

    /// Total length in logical samples (0 when closed)
    fn length(&self) -> u64;

    /// Open the asset and fill in the track description record
    fn parse_header(&mut self, info: &mut TrackInfo) -> Result<()>;

    /// Output format of the samples returned by `read`
    fn format(&self) -> Option<AudioFormat>;

    /// Check whether this source type handles the given file
    fn supports_format(&self, path: &Path) -> bool;
}
