//! Vorbis comment tags
//!
//! FLAC stores tags as `KEY=value` strings. Keys are case-insensitive and
//! are kept uppercase here; the value is everything after the first `=`.

use deck_core::TrackInfo;
use std::collections::BTreeMap;

/// Parsed comment tags, keyed by uppercase name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    entries: BTreeMap<String, String>,
}

impl TagSet {
    /// Parse raw `KEY=value` comment entries
    ///
    /// Entries without `=` are skipped. When a key repeats, the last
    /// occurrence wins.
    pub fn parse<S: AsRef<str>>(comments: &[S]) -> Self {
        let entries = comments
            .iter()
            .filter_map(|entry| entry.as_ref().split_once('='))
            .map(|(key, value)| (key.to_ascii_uppercase(), value.to_string()))
            .collect();
        Self { entries }
    }

    /// Look up a tag by name, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the recognized tags into a track record
    ///
    /// Fields whose tag is absent are left untouched. A BPM that does not
    /// parse as a number leaves `bpm` unset.
    pub fn apply(&self, info: &mut TrackInfo) {
        let text = |key: &str| self.get(key).map(str::to_string);

        if let Some(artist) = text("ARTIST") {
            info.artist = Some(artist);
        }
        if let Some(title) = text("TITLE") {
            info.title = Some(title);
        }
        if let Some(album) = text("ALBUM") {
            info.album = Some(album);
        }
        if let Some(comment) = text("COMMENT") {
            info.comment = Some(comment);
        }
        if let Some(year) = text("DATE") {
            info.year = Some(year);
        }
        if let Some(genre) = text("GENRE") {
            info.genre = Some(genre);
        }
        if let Some(track) = text("TRACKNUMBER") {
            info.track_number = Some(track);
        }
        if let Some(bpm) = self.get("BPM") {
            info.bpm = bpm.trim().parse::<f32>().ok().filter(|v| v.is_finite());
        }
    }
}
