/// Track description record
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Description of one audio file as seen by the library
///
/// Sound sources fill this in once when the file header is parsed; the
/// library side owns it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Container/codec name (e.g. "FLAC")
    pub file_type: Option<String>,

    /// Bitrate in kbps
    pub bitrate_kbps: Option<u32>,

    /// Duration in whole seconds
    pub duration_secs: Option<u64>,

    /// Artist name
    pub artist: Option<String>,

    /// Track title
    pub title: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Free-form comment
    pub comment: Option<String>,

    /// Release year or date, as tagged
    pub year: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Track number, as tagged (may be "3/12")
    pub track_number: Option<String>,

    /// Beats per minute
    pub bpm: Option<f32>,
}

impl TrackInfo {
    /// Set the file type
    pub fn set_type(&mut self, file_type: impl Into<String>) {
        self.file_type = Some(file_type.into());
    }

    /// Get the duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }
}
