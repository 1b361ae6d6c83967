//! Decoder behaviour switches
//!
//! Both switches default to the lenient behaviour: problems are logged and
//! decoding carries on.

use serde::{Deserialize, Serialize};

/// Settings applied to every `FlacSource`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Report failed seeks to the caller instead of logging them
    pub strict_seek: bool,

    /// Refuse sources with more than two channels instead of playing the
    /// first two
    pub reject_multichannel: bool,
}

impl DecoderSettings {
    /// Settings with every strict switch enabled
    pub fn strict() -> Self {
        Self {
            strict_seek: true,
            reject_multichannel: true,
        }
    }
}
