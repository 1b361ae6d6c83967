/// Core error types for Deck
use thiserror::Error;

/// Result type alias using `DeckError`
pub type Result<T> = std::result::Result<T, DeckError>;

/// Core error type for Deck
#[derive(Error, Debug)]
pub enum DeckError {
    /// Audio decoding errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeckError {
    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_error_message() {
        let err = DeckError::audio("bad frame");
        assert_eq!(err.to_string(), "Audio error: bad frame");
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DeckError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
