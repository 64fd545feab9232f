use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Upper bounds applied while decoding untrusted input.
///
/// These are protocol-version specific; the defaults match what the vanilla
/// client and server accept for protocol 767.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DecodeLimits {
    /// Largest uncompressed packet body the factory will look at.
    #[serde(default = "default_max_packet_len")]
    pub max_packet_len: usize,
    /// Hard ceiling on any string's UTF-8 byte length, regardless of the
    /// per-field limit a packet asks for.
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,
    #[serde(default = "default_max_byte_array")]
    pub max_byte_array: usize,
    /// Maximum element count of a length-prefixed array.
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
}

fn default_max_packet_len() -> usize {
    2_097_151
}

fn default_max_string_bytes() -> usize {
    32767 * 4
}

fn default_max_byte_array() -> usize {
    1_048_576
}

fn default_max_array_len() -> usize {
    65536
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_packet_len: default_max_packet_len(),
            max_string_bytes: default_max_string_bytes(),
            max_byte_array: default_max_byte_array(),
            max_array_len: default_max_array_len(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LimitsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid limits file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl DecodeLimits {
    pub fn load(path: &Path) -> Result<Self, LimitsError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let limits: DecodeLimits = toml::from_str(&contents)?;
            Ok(limits)
        } else {
            tracing::info!("No limits file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
