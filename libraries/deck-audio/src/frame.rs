//! Frame decoder contract
//!
//! A frame decoder pulls compressed bytes from a [`ByteStream`] and pushes
//! what it finds into a [`FrameSink`]: metadata blocks while the stream
//! header is scanned, then one decoded [`Frame`] per
//! [`FrameDecoder::process_single`] call. Corruption is reported through
//! [`FrameSink::error`]; the return value of the call that hit it is what
//! decides success.

use crate::stream::ByteStream;
use std::fmt;
use std::io;
use thiserror::Error;

/// Size of a FLAC STREAMINFO block body in bytes
pub const STREAM_INFO_LEN: usize = 34;

/// Errors raised by a frame decoder session
#[derive(Error, Debug)]
pub enum DecoderError {
    /// I/O failure on the byte stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes are not a decodable stream
    #[error("Invalid stream: {0}")]
    InvalidStream(String),

    /// The operation is not possible on this stream or session
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The session has not been bound to a stream yet
    #[error("Decoder not initialised")]
    Uninitialized,

    /// The sink asked to stop
    #[error("Decoding aborted by the client")]
    Aborted,
}

/// Stream parameters from the STREAMINFO block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Smallest block size in samples per channel
    pub min_block_size: u16,
    /// Largest block size in samples per channel
    pub max_block_size: u16,
    /// Smallest frame in bytes (0 = unknown)
    pub min_frame_size: u32,
    /// Largest frame in bytes (0 = unknown)
    pub max_frame_size: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u32,
    /// Bits per sample
    pub bits_per_sample: u32,
    /// Samples per channel in the whole stream (0 = unknown)
    pub total_samples: u64,
    /// MD5 of the unencoded audio
    pub md5: [u8; 16],
}

impl StreamInfo {
    /// Parse the 34-byte body of a STREAMINFO block
    pub fn parse(block: &[u8]) -> Result<Self, DecoderError> {
        if block.len() < STREAM_INFO_LEN {
            return Err(DecoderError::InvalidStream(format!(
                "STREAMINFO block is {} bytes, expected {}",
                block.len(),
                STREAM_INFO_LEN
            )));
        }

        let u24 = |b: &[u8]| (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);

        let mut packed = [0u8; 8];
        packed.copy_from_slice(&block[10..18]);
        let packed = u64::from_be_bytes(packed);

        let mut md5 = [0u8; 16];
        md5.copy_from_slice(&block[18..34]);

        Ok(Self {
            min_block_size: u16::from_be_bytes([block[0], block[1]]),
            max_block_size: u16::from_be_bytes([block[2], block[3]]),
            min_frame_size: u24(&block[4..7]),
            max_frame_size: u24(&block[7..10]),
            sample_rate: (packed >> 44) as u32,
            channels: ((packed >> 41) & 0x7) as u32 + 1,
            bits_per_sample: ((packed >> 36) & 0x1f) as u32 + 1,
            total_samples: packed & 0xf_ffff_ffff,
            md5,
        })
    }
}

/// Kinds of metadata block a session can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    StreamInfo,
    VorbisComment,
}

/// One metadata block delivered to the sink
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataBlock {
    /// Stream parameters; always delivered
    StreamInfo(StreamInfo),
    /// Raw `KEY=value` comment entries, in file order
    VorbisComment(Vec<String>),
}

impl MetadataBlock {
    pub fn kind(&self) -> MetadataKind {
        match self {
            Self::StreamInfo(_) => MetadataKind::StreamInfo,
            Self::VorbisComment(_) => MetadataKind::VorbisComment,
        }
    }
}

/// Description of one decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Samples per channel
    pub blocksize: usize,
    /// Channel count
    pub channels: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample of the values in the planes
    pub bits_per_sample: u32,
    /// Index of the first sample (per channel) in the stream
    pub first_sample: u64,
}

/// A decoded frame: one non-interleaved plane per channel
///
/// Sample values keep their native bit width, so a 16-bit stream carries
/// values in `i16` range.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    planes: &'a [Vec<i32>],
}

impl<'a> Frame<'a> {
    /// Wrap decoded planes; each plane must hold at least `blocksize` values
    pub fn new(header: FrameHeader, planes: &'a [Vec<i32>]) -> Self {
        debug_assert!(planes.len() >= header.channels);
        debug_assert!(planes
            .iter()
            .take(header.channels)
            .all(|plane| plane.len() >= header.blocksize));
        Self { header, planes }
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> &'a [i32] {
        &self.planes[index][..self.header.blocksize]
    }
}

/// Stream corruption reported by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    LostSync,
    BadHeader,
    FrameCrcMismatch,
    UnparseableStream,
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LostSync => "lost sync",
            Self::BadHeader => "bad header",
            Self::FrameCrcMismatch => "frame CRC mismatch",
            Self::UnparseableStream => "unparseable stream",
        };
        f.write_str(name)
    }
}

/// Answer of the sink to a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Continue,
    Abort,
}

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Uninitialized,
    ReadingMetadata,
    Ready,
    EndOfStream,
    Aborted,
}

/// Receiver of everything a session decodes
pub trait FrameSink {
    /// One decoded frame
    fn write(&mut self, frame: &Frame<'_>) -> WriteStatus;

    /// One metadata block
    fn metadata(&mut self, block: &MetadataBlock);

    /// Stream corruption notice. The session must stay usable afterwards.
    fn error(&mut self, status: ErrorStatus);
}

/// A decoding session over one byte stream
pub trait FrameDecoder: Send {
    /// Ask for blocks of `kind` to be reported during the metadata scan.
    /// Must be called before [`FrameDecoder::init`].
    fn set_metadata_respond(&mut self, kind: MetadataKind) -> Result<(), DecoderError>;

    /// Bind the session to a byte stream
    fn init(&mut self, stream: Box<dyn ByteStream>) -> Result<(), DecoderError>;

    /// Consume every leading metadata block without decoding audio
    fn process_until_end_of_metadata(
        &mut self,
        sink: &mut dyn FrameSink,
    ) -> Result<(), DecoderError>;

    /// Decode exactly one frame. At end of stream this succeeds without
    /// calling [`FrameSink::write`].
    fn process_single(&mut self, sink: &mut dyn FrameSink) -> Result<(), DecoderError>;

    /// Position the session so the next frame starts at `sample`
    /// (per-channel index)
    fn seek_absolute(&mut self, sample: u64) -> Result<(), DecoderError>;

    fn state(&self) -> DecoderState;

    /// Release the byte stream and any decoding state
    fn finish(&mut self);
}

/// Creates decoder sessions
pub trait DecoderFactory: Send + Sync {
    /// A fresh session, or `None` if one cannot be allocated
    fn new_session(&self) -> Option<Box<dyn FrameDecoder>>;
}
