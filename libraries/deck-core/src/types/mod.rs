mod audio;
mod track;

pub use audio::{AudioFormat, SampleRate};
pub use track::TrackInfo;
