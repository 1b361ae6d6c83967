/// Probe error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Audio(#[from] deck_audio::AudioError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_audio::AudioError;

    #[test]
    fn audio_errors_keep_their_message() {
        let err: ProbeError = AudioError::FileNotFound("a.flac".into()).into();
        assert_eq!(err.to_string(), "File not found: a.flac");
    }
}
