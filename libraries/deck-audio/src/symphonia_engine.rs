//! FLAC frame decoder backed by Symphonia
//!
//! Symphonia's FLAC demuxer yields one packet per FLAC frame, which maps
//! directly onto [`FrameDecoder::process_single`]. Decoded samples come out
//! of Symphonia scaled to the full `i32` range; they are shifted back to
//! the stream's native bit width before reaching the sink.

use crate::frame::{
    DecoderError, DecoderFactory, DecoderState, ErrorStatus, Frame, FrameDecoder, FrameHeader,
    FrameSink, MetadataBlock, MetadataKind, StreamInfo, WriteStatus, STREAM_INFO_LEN,
};
use crate::stream::{ByteStream, MediaSourceAdapter};
use std::io;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo, SeekedTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::default::codecs::FlacDecoder;
use symphonia::default::formats::FlacReader;
use tracing::{debug, warn};

/// Stream marker every FLAC file starts with
const FLAC_MARKER: &[u8; 4] = b"fLaC";

/// Creates [`SymphoniaFlacDecoder`] sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaFactory;

impl DecoderFactory for SymphoniaFactory {
    fn new_session(&self) -> Option<Box<dyn FrameDecoder>> {
        Some(Box::new(SymphoniaFlacDecoder::new()))
    }
}

/// One FLAC decoding session
pub struct SymphoniaFlacDecoder {
    respond: Vec<MetadataKind>,
    source: Option<MediaSourceAdapter>,
    reader: Option<FlacReader>,
    decoder: Option<FlacDecoder>,
    track_id: u32,
    bits_per_sample: u32,
    /// Samples before this index are dropped; set by an accurate seek
    seek_target: u64,
    /// Timestamp the next packet must carry after a seek
    next_ts: Option<u64>,
    /// A packet gap after a seek has already been repaired once
    resynced: bool,
    planes: Vec<Vec<i32>>,
    state: DecoderState,
}

impl SymphoniaFlacDecoder {
    pub fn new() -> Self {
        Self {
            respond: Vec::new(),
            source: None,
            reader: None,
            decoder: None,
            track_id: 0,
            bits_per_sample: 0,
            seek_target: 0,
            next_ts: None,
            resynced: false,
            planes: Vec::new(),
            state: DecoderState::Uninitialized,
        }
    }
}

impl Default for SymphoniaFlacDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for SymphoniaFlacDecoder {
    fn set_metadata_respond(&mut self, kind: MetadataKind) -> Result<(), DecoderError> {
        if self.state != DecoderState::Uninitialized {
            return Err(DecoderError::Unsupported(
                "metadata responses must be set before init".to_string(),
            ));
        }
        if !self.respond.contains(&kind) {
            self.respond.push(kind);
        }
        Ok(())
    }

    fn init(&mut self, stream: Box<dyn ByteStream>) -> Result<(), DecoderError> {
        if self.state != DecoderState::Uninitialized {
            return Err(DecoderError::Unsupported(
                "session is already bound to a stream".to_string(),
            ));
        }

        let mut source = MediaSourceAdapter::new(stream);
        let marker = source.sniff(FLAC_MARKER.len())?;
        if marker != FLAC_MARKER {
            return Err(DecoderError::InvalidStream(
                "missing fLaC stream marker".to_string(),
            ));
        }

        self.source = Some(source);
        self.state = DecoderState::ReadingMetadata;
        Ok(())
    }

    fn process_until_end_of_metadata(
        &mut self,
        sink: &mut dyn FrameSink,
    ) -> Result<(), DecoderError> {
        let source = self.source.take().ok_or(DecoderError::Uninitialized)?;
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut reader = FlacReader::try_new(mss, &FormatOptions::default()).map_err(|e| {
            self.state = DecoderState::Aborted;
            engine_error(e)
        })?;

        let track = reader
            .default_track()
            .ok_or_else(|| DecoderError::InvalidStream("no audio track".to_string()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let info = stream_info(&params)?;
        sink.metadata(&MetadataBlock::StreamInfo(info));

        if self.respond.contains(&MetadataKind::VorbisComment) {
            if let Some(comments) = vorbis_comments(&mut reader) {
                sink.metadata(&MetadataBlock::VorbisComment(comments));
            }
        }

        let decoder =
            FlacDecoder::try_new(&params, &DecoderOptions::default()).map_err(engine_error)?;

        debug!(
            "FLAC metadata read: {} Hz, {} ch, {} bit, {} samples",
            info.sample_rate, info.channels, info.bits_per_sample, info.total_samples
        );

        self.track_id = track_id;
        self.bits_per_sample = info.bits_per_sample;
        self.seek_target = 0;
        self.next_ts = None;
        self.resynced = false;
        self.reader = Some(reader);
        self.decoder = Some(decoder);
        self.state = DecoderState::Ready;
        Ok(())
    }

    fn process_single(&mut self, sink: &mut dyn FrameSink) -> Result<(), DecoderError> {
        let (reader, decoder) = match (self.reader.as_mut(), self.decoder.as_mut()) {
            (Some(reader), Some(decoder)) => (reader, decoder),
            _ => return Err(DecoderError::Uninitialized),
        };
        if self.state == DecoderState::EndOfStream {
            return Ok(());
        }

        let shift = 32 - self.bits_per_sample.clamp(1, 32);

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.state = DecoderState::EndOfStream;
                    return Ok(());
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    sink.error(ErrorStatus::LostSync);
                    return Err(DecoderError::InvalidStream(msg.to_string()));
                }
                Err(e) => return Err(engine_error(e)),
            };

            if packet.track_id() != self.track_id {
                continue;
            }
            let ts = packet.ts();

            // After seeking into the first frame, Symphonia's FLAC reader can
            // skip the frame that follows. Seek again to where the stream
            // should continue; samples already delivered are dropped below.
            if let Some(expected) = self.next_ts {
                if ts > expected {
                    if self.resynced {
                        warn!(
                            "FLAC packets jump from sample {} to {} after a seek",
                            expected, ts
                        );
                    } else {
                        debug!(
                            "Packet at sample {} where {} was expected, seeking again",
                            ts, expected
                        );
                        let seeked = seek_reader(reader, self.track_id, expected)?;
                        decoder.reset();
                        self.seek_target = self.seek_target.max(expected);
                        self.next_ts = Some(seeked.actual_ts);
                        self.resynced = true;
                        continue;
                    }
                }
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    sink.error(classify(msg));
                    return Err(DecoderError::InvalidStream(msg.to_string()));
                }
                Err(e) => return Err(engine_error(e)),
            };

            let owed = self.seek_target.saturating_sub(ts);
            let (dropped, kept) = match decoded {
                AudioBufferRef::S32(buf) => fill_planes(&buf, shift, owed, &mut self.planes),
                other => {
                    let mut converted = other.make_equivalent::<i32>();
                    other.convert(&mut converted);
                    fill_planes(&converted, shift, owed, &mut self.planes)
                }
            };
            if self.next_ts.is_some() {
                self.next_ts = Some(ts + (dropped + kept) as u64);
            }

            // The whole frame precedes a seek target
            if kept == 0 {
                continue;
            }
            self.resynced = false;

            let header = FrameHeader {
                blocksize: kept,
                channels: self.planes.len(),
                sample_rate: decoder.codec_params().sample_rate.unwrap_or(0),
                bits_per_sample: self.bits_per_sample,
                first_sample: ts + dropped as u64,
            };
            return match sink.write(&Frame::new(header, &self.planes)) {
                WriteStatus::Continue => Ok(()),
                WriteStatus::Abort => {
                    self.state = DecoderState::Aborted;
                    Err(DecoderError::Aborted)
                }
            };
        }
    }

    fn seek_absolute(&mut self, sample: u64) -> Result<(), DecoderError> {
        let reader = self.reader.as_mut().ok_or(DecoderError::Uninitialized)?;
        let seeked = seek_reader(reader, self.track_id, sample)?;

        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reset();
        }
        self.seek_target = seeked.required_ts;
        self.next_ts = Some(seeked.actual_ts);
        self.resynced = false;
        self.state = DecoderState::Ready;

        debug!(
            "Seeked to sample {} (landed on {})",
            sample, seeked.actual_ts
        );
        Ok(())
    }

    fn state(&self) -> DecoderState {
        self.state
    }

    fn finish(&mut self) {
        self.decoder = None;
        self.reader = None;
        self.source = None;
        self.planes.clear();
        self.seek_target = 0;
        self.next_ts = None;
        self.resynced = false;
        self.state = DecoderState::Uninitialized;
    }
}

fn seek_reader(reader: &mut FlacReader, track_id: u32, ts: u64) -> Result<SeekedTo, DecoderError> {
    reader
        .seek(SeekMode::Accurate, SeekTo::TimeStamp { ts, track_id })
        .map_err(engine_error)
}

/// Copy one decoded buffer into per-channel planes at native bit width,
/// dropping the first `owed` samples. Returns (dropped, kept).
fn fill_planes(
    buf: &AudioBuffer<i32>,
    shift: u32,
    owed: u64,
    planes: &mut Vec<Vec<i32>>,
) -> (usize, usize) {
    let frames = buf.frames();
    let dropped = owed.min(frames as u64) as usize;

    planes.resize_with(buf.spec().channels.count(), Vec::new);
    for (ch, plane) in planes.iter_mut().enumerate() {
        plane.clear();
        plane.extend(buf.chan(ch)[dropped..frames].iter().map(|&s| s >> shift));
    }
    (dropped, frames - dropped)
}

fn stream_info(params: &CodecParameters) -> Result<StreamInfo, DecoderError> {
    if let Some(block) = params.extra_data.as_deref() {
        if block.len() >= STREAM_INFO_LEN {
            return StreamInfo::parse(block);
        }
    }

    // No raw block: rebuild what the codec parameters carry
    let missing = |what: &str| DecoderError::InvalidStream(format!("stream has no {what}"));
    let max_block = params.max_frames_per_packet.unwrap_or(0).min(u64::from(u16::MAX)) as u16;
    Ok(StreamInfo {
        min_block_size: max_block,
        max_block_size: max_block,
        min_frame_size: 0,
        max_frame_size: 0,
        sample_rate: params.sample_rate.ok_or_else(|| missing("sample rate"))?,
        channels: params
            .channels
            .map(|c| c.count() as u32)
            .ok_or_else(|| missing("channel layout"))?,
        bits_per_sample: params
            .bits_per_sample
            .ok_or_else(|| missing("bit depth"))?,
        total_samples: params.n_frames.unwrap_or(0),
        md5: [0; 16],
    })
}

fn vorbis_comments(reader: &mut FlacReader) -> Option<Vec<String>> {
    reader.metadata().skip_to_latest().map(|rev| {
        rev.tags()
            .iter()
            .map(|tag| format!("{}={}", tag.key, tag.value))
            .collect()
    })
}

fn classify(msg: &str) -> ErrorStatus {
    let msg = msg.to_ascii_lowercase();
    if msg.contains("crc") {
        ErrorStatus::FrameCrcMismatch
    } else if msg.contains("header") {
        ErrorStatus::BadHeader
    } else if msg.contains("sync") {
        ErrorStatus::LostSync
    } else {
        ErrorStatus::UnparseableStream
    }
}

fn engine_error(err: SymphoniaError) -> DecoderError {
    match err {
        SymphoniaError::IoError(e) => DecoderError::Io(e),
        SymphoniaError::Unsupported(what) => DecoderError::Unsupported(what.to_string()),
        other => {
            warn!("FLAC engine error: {}", other);
            DecoderError::InvalidStream(other.to_string())
        }
    }
}
