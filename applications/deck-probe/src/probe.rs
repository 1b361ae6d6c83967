/// Header inspection and full-stream decode checks
use crate::error::Result;
use deck_audio::{DecoderSettings, FlacSource, ReadStatus};
use deck_core::TrackInfo;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of decoding a stream end to end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeSummary {
    /// Logical sample the decode started from
    pub start: u64,
    /// Samples actually read
    pub samples_read: u64,
    /// Samples the header promised from `start` on
    pub samples_expected: u64,
    /// Number of read calls
    pub reads: u64,
    /// Largest absolute sample value seen
    pub peak: u16,
    /// Whether the stream ended cleanly
    pub clean: bool,
}

/// Open `path` and describe it
pub fn describe(path: &Path, settings: DecoderSettings) -> Result<TrackInfo> {
    let mut source = FlacSource::new(path).with_settings(settings);
    let mut info = TrackInfo::default();
    source.parse_header(&mut info)?;
    debug!("{} has {} tags", path.display(), source.tags().len());
    Ok(info)
}

/// Decode `path` from `seek` (a logical sample) to the end, `chunk_size`
/// samples per read
pub fn decode(
    path: &Path,
    settings: DecoderSettings,
    chunk_size: usize,
    seek: Option<u64>,
) -> Result<DecodeSummary> {
    let mut source = FlacSource::new(path).with_settings(settings);
    source.open()?;

    let length = source.length();
    let start = match seek {
        Some(position) => source.seek(position)? / 2 * 2,
        None => 0,
    };

    let mut buffer = vec![0i16; chunk_size.max(1)];
    let mut samples_read = 0u64;
    let mut reads = 0u64;
    let mut peak = 0u16;
    loop {
        let n = source.read(&mut buffer);
        reads += 1;
        samples_read += n as u64;
        peak = buffer[..n]
            .iter()
            .map(|s| s.unsigned_abs())
            .fold(peak, u16::max);
        if n < buffer.len() {
            break;
        }
    }

    let samples_expected = length.saturating_sub(start);
    let clean = source.read_status() == ReadStatus::EndOfStream && samples_read == samples_expected;
    if clean {
        info!("Decoded {} samples from {}", samples_read, path.display());
    } else {
        warn!(
            "Decoded {} of {} samples from {} ({:?})",
            samples_read,
            samples_expected,
            path.display(),
            source.read_status()
        );
    }

    Ok(DecodeSummary {
        start,
        samples_read,
        samples_expected,
        reads,
        peak,
        clean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbeError;
    use deck_audio::AudioError;

    #[test]
    fn describe_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = describe(&dir.path().join("none.flac"), DecoderSettings::default()).unwrap_err();
        assert!(matches!(err, ProbeError::Audio(AudioError::FileNotFound(_))));
    }

    #[test]
    fn decode_rejects_non_flac_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"ID3\x04\x00\x00\x00\x00\x00\x00").unwrap();
        let err = decode(file.path(), DecoderSettings::default(), 1024, None).unwrap_err();
        assert!(matches!(err, ProbeError::Audio(AudioError::SessionInit(_))));
    }

    #[test]
    fn summary_serializes() {
        let summary = DecodeSummary {
            start: 0,
            samples_read: 10,
            samples_expected: 10,
            reads: 2,
            peak: 100,
            clean: true,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["samples_read"], 10);
        assert_eq!(json["clean"], true);
    }
}
