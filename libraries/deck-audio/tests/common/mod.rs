//! Shared helpers for integration tests
//!
//! Writes small but valid FLAC streams: one STREAMINFO block, an optional
//! VORBIS_COMMENT block and fixed-blocksize frames of VERBATIM subframes.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

/// Send `tracing` output to the test harness; `RUST_LOG` overrides the
/// default filter
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deck_audio=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Parameters of a generated stream
#[derive(Debug, Clone)]
pub struct FlacSpec {
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    pub block_size: usize,
    pub total_samples: u64,
    pub comments: Vec<String>,
}

impl FlacSpec {
    pub fn stereo(total_samples: u64) -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            bits_per_sample: 16,
            block_size: 1152,
            total_samples,
            comments: Vec::new(),
        }
    }

    pub fn mono(total_samples: u64) -> Self {
        Self {
            channels: 1,
            ..Self::stereo(total_samples)
        }
    }

    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_bits(mut self, bits_per_sample: u32) -> Self {
        self.bits_per_sample = bits_per_sample;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_comments(mut self, comments: &[&str]) -> Self {
        self.comments = comments.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// Sample `index` of `channel` in every generated stream
///
/// Values stay positive and never contain a 0xFF byte, so frame payloads
/// cannot imitate a frame sync code.
pub fn sample_at(index: u64, channel: usize) -> i32 {
    let v = ((index * 37 + channel as u64 * 4_001) % 0x7000) as i32;
    v & !0x0101
}

/// The interleaved stereo output a reader should produce for `spec`
pub fn expected_output(spec: &FlacSpec) -> Vec<i16> {
    let mut out = Vec::with_capacity(spec.total_samples as usize * 2);
    for i in 0..spec.total_samples {
        let (left, right) = if spec.channels == 1 { (0, 0) } else { (0, 1) };
        out.push(sample_at(i, left) as i16);
        out.push(sample_at(i, right) as i16);
    }
    out
}

/// Encode `spec` as a complete FLAC stream
pub fn encode(spec: &FlacSpec) -> Vec<u8> {
    let frames = encode_frames(spec);
    let min_frame = frames.iter().map(Vec::len).min().unwrap_or(0) as u32;
    let max_frame = frames.iter().map(Vec::len).max().unwrap_or(0) as u32;

    let mut out = b"fLaC".to_vec();
    let has_comments = !spec.comments.is_empty();

    // STREAMINFO
    out.push(if has_comments { 0x00 } else { 0x80 });
    out.extend_from_slice(&34u32.to_be_bytes()[1..]);
    out.extend_from_slice(&(spec.block_size as u16).to_be_bytes());
    out.extend_from_slice(&(spec.block_size as u16).to_be_bytes());
    out.extend_from_slice(&min_frame.to_be_bytes()[1..]);
    out.extend_from_slice(&max_frame.to_be_bytes()[1..]);
    let packed = (u64::from(spec.sample_rate) << 44)
        | (u64::from(spec.channels - 1) << 41)
        | (u64::from(spec.bits_per_sample - 1) << 36)
        | spec.total_samples;
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0u8; 16]);

    if has_comments {
        let mut body = Vec::new();
        let vendor = b"deck-audio test";
        body.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        body.extend_from_slice(vendor);
        body.extend_from_slice(&(spec.comments.len() as u32).to_le_bytes());
        for comment in &spec.comments {
            body.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            body.extend_from_slice(comment.as_bytes());
        }
        out.push(0x80 | 4);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(&body);
    }

    for frame in frames {
        out.extend_from_slice(&frame);
    }
    out
}

/// Encode `spec` into a temporary `.flac` file
pub fn write_temp(spec: &FlacSpec) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".flac")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(&encode(spec)).unwrap();
    file.flush().unwrap();
    file
}

fn encode_frames(spec: &FlacSpec) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut start = 0u64;
    let mut number = 0u64;
    while start < spec.total_samples {
        let block = (spec.total_samples - start).min(spec.block_size as u64) as usize;
        frames.push(encode_frame(spec, number, start, block));
        start += block as u64;
        number += 1;
    }
    frames
}

fn encode_frame(spec: &FlacSpec, number: u64, start: u64, block: usize) -> Vec<u8> {
    let rate_code = match spec.sample_rate {
        44_100 => 9,
        48_000 => 10,
        _ => 0,
    };
    let size_code = match spec.bits_per_sample {
        8 => 1,
        16 => 4,
        24 => 6,
        _ => 0,
    };

    let mut frame = vec![0xFF, 0xF8];
    frame.push((0b0111 << 4) | rate_code);
    frame.push((((spec.channels - 1) as u8) << 4) | (size_code << 1));
    push_utf8_number(&mut frame, number);
    frame.extend_from_slice(&((block - 1) as u16).to_be_bytes());
    frame.push(crc8(&frame));

    let bytes_per_sample = (spec.bits_per_sample / 8) as usize;
    for ch in 0..spec.channels as usize {
        // VERBATIM, no wasted bits
        frame.push(0x02);
        for i in 0..block as u64 {
            let value = sample_at(start + i, ch).to_be_bytes();
            frame.extend_from_slice(&value[4 - bytes_per_sample..]);
        }
    }

    let crc = crc16(&frame);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame
}

fn push_utf8_number(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0x7F => out.push(n as u8),
        0x80..=0x7FF => {
            out.push(0xC0 | (n >> 6) as u8);
            out.push(0x80 | (n & 0x3F) as u8);
        }
        0x800..=0xFFFF => {
            out.push(0xE0 | (n >> 12) as u8);
            out.push(0x80 | ((n >> 6) & 0x3F) as u8);
            out.push(0x80 | (n & 0x3F) as u8);
        }
        _ => {
            out.push(0xF0 | (n >> 18) as u8);
            out.push(0x80 | ((n >> 12) & 0x3F) as u8);
            out.push(0x80 | ((n >> 6) & 0x3F) as u8);
            out.push(0x80 | (n & 0x3F) as u8);
        }
    }
}

fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
        }
    }
    crc
}

fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x8005 } else { crc << 1 };
        }
    }
    crc
}
