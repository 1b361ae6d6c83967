/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
///
/// The first five variants are the ways opening a source can fail; each of
/// them leaves the source closed and ready for another `open`.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The decoder session could not be created
    #[error("Decoder allocation failed: {0}")]
    SessionAllocation(String),

    /// The session refused to report comment metadata
    #[error("Metadata configuration failed: {0}")]
    MetadataConfig(String),

    /// The session could not bind to the byte stream
    #[error("Decoder init failed: {0}")]
    SessionInit(String),

    /// Reading the stream metadata failed
    #[error("Metadata scan failed: {0}")]
    MetadataScan(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A single frame could not be decoded
    #[error("Frame decode error: {0}")]
    FrameDecode(String),

    /// Seek error
    #[error("Seek error: {0}")]
    Seek(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// No file is currently open
    #[error("No file open for streaming decode")]
    NoFileOpen,

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Whether this error was raised while opening a source
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Self::SessionAllocation(_)
                | Self::MetadataConfig(_)
                | Self::SessionInit(_)
                | Self::MetadataScan(_)
                | Self::UnsupportedFormat(_)
                | Self::FileNotFound(_)
        )
    }
}

impl From<AudioError> for deck_core::DeckError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Io(io) => deck_core::DeckError::Io(io),
            other => deck_core::DeckError::audio(other.to_string()),
        }
    }
}
