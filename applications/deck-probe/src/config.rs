/// Probe configuration
use crate::error::{ProbeError, Result};
use deck_audio::DecoderSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no path is given
const DEFAULT_CONFIG_FILE: &str = "deck-probe.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub decoder: DecoderSettings,

    #[serde(default = "default_output")]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Samples requested per read while decoding
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl ProbeConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `deck-probe.toml` is read if
    /// present. `DECK_` variables override both, with `__` between nested
    /// keys (`DECK_DECODER__STRICT_SEEK=true`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("DECK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(environment);

        let config = settings
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| ProbeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.chunk_size == 0 {
            return Err(ProbeError::Config(
                "output.chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// Default values
fn default_output() -> OutputSettings {
    OutputSettings {
        chunk_size: default_chunk_size(),
        pretty: false,
    }
}

fn default_chunk_size() -> usize {
    4096
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderSettings::default(),
            output: default_output(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_environment() -> config::Environment {
        ProbeConfig::environment().source(Some(config::Map::new()))
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let config = ProbeConfig::load_with(None, no_environment()).unwrap();
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.output.chunk_size, 4096);
        assert!(!config.decoder.strict_seek);
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            "[decoder]\nstrict_seek = true\n\n[output]\nchunk_size = 1024\npretty = true\n",
        );
        let config = ProbeConfig::load_with(Some(file.path()), no_environment()).unwrap();
        assert!(config.decoder.strict_seek);
        assert!(!config.decoder.reject_multichannel);
        assert_eq!(config.output.chunk_size, 1024);
        assert!(config.output.pretty);
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[decoder]\nreject_multichannel = false\n");
        let env = ProbeConfig::environment().source(Some(config::Map::from([(
            "DECK_DECODER__REJECT_MULTICHANNEL".to_string(),
            "true".to_string(),
        )])));
        let config = ProbeConfig::load_with(Some(file.path()), env).unwrap();
        assert!(config.decoder.reject_multichannel);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = ProbeConfig::load_with(Some(&missing), no_environment()).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let file = write_config("[output]\nchunk_size = 0\n");
        let err = ProbeConfig::load_with(Some(file.path()), no_environment()).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }
}
