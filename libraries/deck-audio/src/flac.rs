//! Streaming FLAC sample source
//!
//! [`FlacSource`] turns the frame-at-a-time output of a [`FrameDecoder`]
//! into a pull API: callers ask for any number of interleaved 16-bit stereo
//! samples and get exactly that many back until the stream runs out.
//!
//! Positions and lengths are counted in *logical samples*, one per `i16`
//! slot of the stereo output. A decoder works in per-channel samples, so
//! seeking divides the position by two.
//!
//! ```no_run
//! use deck_audio::FlacSource;
//!
//! let mut source = FlacSource::new("track.flac");
//! source.open()?;
//!
//! let mut buffer = vec![0i16; 4096];
//! while source.read(&mut buffer) > 0 {
//!     // hand the samples to the mixer
//! }
//! # Ok::<(), deck_audio::AudioError>(())
//! ```

use crate::carry::CarryOver;
use crate::channels::{interleave_stereo, OUTPUT_CHANNELS};
use crate::error::{AudioError, Result};
use crate::frame::{
    DecoderFactory, ErrorStatus, Frame, FrameDecoder, FrameSink, MetadataBlock, MetadataKind,
    StreamInfo, WriteStatus,
};
use crate::settings::DecoderSettings;
use crate::stream::{ByteStream, FileStream};
use crate::symphonia_engine::SymphoniaFactory;
use crate::tags::TagSet;
use deck_core::{AudioFormat, SoundSource, TrackInfo};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest block size a FLAC stream may declare
const MAX_FLAC_BLOCK: usize = 65_535;

/// Bit depth the output contract is built on
const SUPPORTED_BITS_PER_SAMPLE: u32 = 16;

/// Why the last read stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Every requested sample was delivered
    Complete,
    /// The stream ran out (or no stream is open)
    EndOfStream,
    /// The decoder failed on a frame
    DecodeFailed,
}

/// Pull-based reader of interleaved 16-bit stereo samples from a FLAC asset
pub struct FlacSource {
    path: PathBuf,
    settings: DecoderSettings,
    factory: Arc<dyn DecoderFactory>,
    session: Option<Box<dyn FrameDecoder>>,
    stream_info: Option<StreamInfo>,
    comments: Vec<String>,
    tags: TagSet,
    carry: CarryOver,
    scratch: Vec<i16>,
    status: ReadStatus,
    last_error: Option<AudioError>,
}

/// Receives decoder callbacks on behalf of a [`FlacSource`]
struct SourceSink<'a> {
    name: &'a Path,
    scratch: &'a mut Vec<i16>,
    stream_info: &'a mut Option<StreamInfo>,
    comments: &'a mut Vec<String>,
}

impl FrameSink for SourceSink<'_> {
    fn write(&mut self, frame: &Frame<'_>) -> WriteStatus {
        interleave_stereo(frame, self.scratch);
        WriteStatus::Continue
    }

    fn metadata(&mut self, block: &MetadataBlock) {
        match block {
            MetadataBlock::StreamInfo(info) => *self.stream_info = Some(*info),
            MetadataBlock::VorbisComment(entries) => self.comments.extend(entries.iter().cloned()),
        }
    }

    fn error(&mut self, status: ErrorStatus) {
        warn!("FLAC decoder error in {}: {}", self.name.display(), status);
    }
}

/// Finish a half-opened session and hand back the error
fn abandon(mut session: Box<dyn FrameDecoder>, err: AudioError) -> AudioError {
    session.finish();
    err
}

impl FlacSource {
    /// Create a closed source for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_factory(path, Arc::new(SymphoniaFactory))
    }

    /// Create a closed source that decodes with sessions from `factory`
    pub fn with_factory(path: impl Into<PathBuf>, factory: Arc<dyn DecoderFactory>) -> Self {
        Self {
            path: path.into(),
            settings: DecoderSettings::default(),
            factory,
            session: None,
            stream_info: None,
            comments: Vec::new(),
            tags: TagSet::default(),
            carry: CarryOver::with_capacity(0),
            scratch: Vec::new(),
            status: ReadStatus::EndOfStream,
            last_error: None,
        }
    }

    /// Replace the decoder settings; applies from the next open
    #[must_use]
    pub fn with_settings(mut self, settings: DecoderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// File extensions this source decodes
    pub fn supported_file_extensions() -> &'static [&'static str] {
        &["flac"]
    }

    /// Open the file at the source path
    ///
    /// # Errors
    /// `FileNotFound` if the file does not exist, otherwise any error of
    /// [`FlacSource::open_stream`]
    pub fn open(&mut self) -> Result<()> {
        let stream = FileStream::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AudioError::FileNotFound(self.path.display().to_string()),
            _ => AudioError::Io(e),
        })?;
        self.open_stream(Box::new(stream))
    }

    /// Open a decoding session over `stream`
    ///
    /// Any current session is closed first. On error the source is left
    /// closed and may be opened again.
    pub fn open_stream(&mut self, stream: Box<dyn ByteStream>) -> Result<()> {
        self.close();
        let name = self.path.display().to_string();

        let mut session = self.factory.new_session().ok_or_else(|| {
            AudioError::SessionAllocation(format!("no decoder session available for {name}"))
        })?;

        if let Err(e) = session.set_metadata_respond(MetadataKind::VorbisComment) {
            return Err(abandon(
                session,
                AudioError::MetadataConfig(format!("{name}: {e}")),
            ));
        }

        if let Err(e) = session.init(stream) {
            return Err(abandon(session, AudioError::SessionInit(format!("{name}: {e}"))));
        }

        let mut stream_info = None;
        let mut comments = Vec::new();
        let scanned = session.process_until_end_of_metadata(&mut SourceSink {
            name: &self.path,
            scratch: &mut self.scratch,
            stream_info: &mut stream_info,
            comments: &mut comments,
        });
        if let Err(e) = scanned {
            warn!(
                "Metadata scan of {} failed in state {:?}: {}",
                name,
                session.state(),
                e
            );
            return Err(abandon(session, AudioError::MetadataScan(format!("{name}: {e}"))));
        }
        let Some(info) = stream_info else {
            warn!("No STREAMINFO block in {} (state {:?})", name, session.state());
            return Err(abandon(
                session,
                AudioError::MetadataScan(format!("{name}: no STREAMINFO block")),
            ));
        };

        if info.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
            return Err(abandon(
                session,
                AudioError::UnsupportedFormat(format!(
                    "{name}: {} bits per sample, only {SUPPORTED_BITS_PER_SAMPLE} is supported",
                    info.bits_per_sample
                )),
            ));
        }

        if info.channels as usize > OUTPUT_CHANNELS {
            if self.settings.reject_multichannel {
                return Err(abandon(
                    session,
                    AudioError::UnsupportedFormat(format!(
                        "{name}: {} channels, at most {OUTPUT_CHANNELS} are supported",
                        info.channels
                    )),
                ));
            }
            warn!(
                "{} has {} channels, only the first {} will be played",
                name, info.channels, OUTPUT_CHANNELS
            );
        }

        let max_block = match usize::from(info.max_block_size) {
            0 => MAX_FLAC_BLOCK,
            n => n,
        };
        let capacity = max_block * OUTPUT_CHANNELS;
        if self.carry.capacity() < capacity {
            self.carry = CarryOver::with_capacity(capacity);
        }
        self.carry.clear();
        self.scratch.clear();
        self.scratch.reserve(capacity);

        self.tags = TagSet::parse(&comments);
        self.comments = comments;

        debug!(
            "Opened {}: {} Hz, {} ch, {} bit, {} samples, block {}..{}, frame {}..{} bytes, {} tags",
            name,
            info.sample_rate,
            info.channels,
            info.bits_per_sample,
            info.total_samples,
            info.min_block_size,
            info.max_block_size,
            info.min_frame_size,
            info.max_frame_size,
            self.tags.len()
        );

        self.stream_info = Some(info);
        self.session = Some(session);
        self.status = ReadStatus::Complete;
        Ok(())
    }

    /// Finish the current session, if any
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.finish();
            debug!("Closed {}", self.path.display());
        }
        self.stream_info = None;
        self.comments.clear();
        self.tags = TagSet::default();
        self.carry.clear();
        self.scratch.clear();
        self.status = ReadStatus::EndOfStream;
        self.last_error = None;
    }

    /// Move to a logical sample position
    ///
    /// Buffered samples are discarded. Returns `position` as requested; a
    /// closed source returns 0.
    ///
    /// # Errors
    /// With `strict_seek` set, a decoder that cannot reach the position
    /// yields `Seek`. Otherwise the failure is only logged.
    pub fn seek(&mut self, position: u64) -> Result<u64> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };

        self.carry.clear();
        self.scratch.clear();
        self.status = ReadStatus::Complete;
        self.last_error = None;

        let sample = position / OUTPUT_CHANNELS as u64;
        if let Err(e) = session.seek_absolute(sample) {
            if self.settings.strict_seek {
                return Err(AudioError::Seek(format!(
                    "{}: cannot reach sample {sample}: {e}",
                    self.path.display()
                )));
            }
            warn!(
                "Seek to sample {} in {} failed: {}",
                sample,
                self.path.display(),
                e
            );
        }
        Ok(position)
    }

    /// Fill `destination` with interleaved stereo samples
    ///
    /// Returns how many were written. Fewer than requested means the stream
    /// ended or a frame failed to decode; [`FlacSource::read_status`] tells
    /// which.
    pub fn read(&mut self, destination: &mut [i16]) -> usize {
        let Some(session) = self.session.as_mut() else {
            self.status = ReadStatus::EndOfStream;
            return 0;
        };

        self.status = ReadStatus::Complete;
        self.last_error = None;
        let wanted = destination.len();
        let mut written = 0;

        while written < wanted {
            written += self.carry.drain_into(&mut destination[written..]);
            if written == wanted {
                break;
            }

            self.scratch.clear();
            let decoded = session.process_single(&mut SourceSink {
                name: &self.path,
                scratch: &mut self.scratch,
                stream_info: &mut self.stream_info,
                comments: &mut self.comments,
            });
            if let Err(e) = decoded {
                warn!("Failed to decode frame of {}: {}", self.path.display(), e);
                self.status = ReadStatus::DecodeFailed;
                self.last_error = Some(AudioError::FrameDecode(format!(
                    "{}: {e}",
                    self.path.display()
                )));
                break;
            }
            if self.scratch.is_empty() {
                self.status = ReadStatus::EndOfStream;
                break;
            }

            let take = (wanted - written).min(self.scratch.len());
            destination[written..written + take].copy_from_slice(&self.scratch[..take]);
            written += take;

            let rest = &self.scratch[take..];
            let kept = self.carry.push(rest);
            if kept < rest.len() {
                warn!(
                    "Frame of {} exceeds the declared block size, {} samples dropped",
                    self.path.display(),
                    rest.len() - kept
                );
            }
        }

        written
    }

    /// Why the last read returned what it did
    pub fn read_status(&self) -> ReadStatus {
        self.status
    }

    /// The frame error behind a [`ReadStatus::DecodeFailed`] read
    pub fn last_error(&self) -> Option<&AudioError> {
        self.last_error.as_ref()
    }

    /// Total length in logical samples, 0 when closed
    pub fn length(&self) -> u64 {
        self.stream_info
            .map_or(0, |info| info.total_samples * OUTPUT_CHANNELS as u64)
    }

    /// Open the source (if needed) and describe it in `info`
    pub fn parse_header(&mut self, info: &mut TrackInfo) -> Result<()> {
        if !self.is_open() {
            self.open()?;
        }
        let stream = self.stream_info.ok_or(AudioError::NoFileOpen)?;

        info.set_type("FLAC");
        info.bitrate_kbps = Some(
            AudioFormat::new(
                deck_core::SampleRate::new(stream.sample_rate),
                stream.channels as u16,
                SUPPORTED_BITS_PER_SAMPLE as u16,
            )
            .bitrate_kbps(),
        );
        info.duration_secs = Some(match stream.sample_rate {
            0 => 0,
            rate => stream.total_samples / u64::from(rate),
        });
        self.tags.apply(info);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Stream parameters of the open stream
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream_info.as_ref()
    }

    /// Comment tags of the open stream
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Output format: always 16-bit stereo at the stream's rate
    pub fn format(&self) -> Option<AudioFormat> {
        self.stream_info
            .map(|info| AudioFormat::stereo_16(info.sample_rate))
    }

    /// Decoded samples waiting for the next read
    pub fn buffered_samples(&self) -> usize {
        self.carry.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FlacSource {
    fn drop(&mut self) {
        self.close();
    }
}

impl SoundSource for FlacSource {
    fn open(&mut self) -> deck_core::Result<()> {
        FlacSource::open(self).map_err(Into::into)
    }

    fn seek(&mut self, position: u64) -> deck_core::Result<u64> {
        FlacSource::seek(self, position).map_err(Into::into)
    }

    fn read(&mut self, destination: &mut [i16]) -> usize {
        FlacSource::read(self, destination)
    }

    fn length(&self) -> u64 {
        FlacSource::length(self)
    }

    fn parse_header(&mut self, info: &mut TrackInfo) -> deck_core::Result<()> {
        FlacSource::parse_header(self, info).map_err(Into::into)
    }

    fn format(&self) -> Option<AudioFormat> {
        FlacSource::format(self)
    }

    fn supports_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                Self::supported_file_extensions()
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }
}
