use serde::Deserialize;
use std::path::Path;
use trowel_protocol_core::DecodeLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct DumpConfig {
    #[serde(default)]
    pub limits: DecodeLimits,
    /// How many payload bytes of an unrecognized packet to show in hex.
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,
    /// Stop at the first packet that fails to decode instead of skipping it.
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_preview_bytes() -> usize {
    16
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            limits: DecodeLimits::default(),
            preview_bytes: default_preview_bytes(),
            stop_on_error: false,
        }
    }
}

impl DumpConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: DumpConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DumpConfig::load(&dir.path().join("dump.toml")).unwrap();
        assert_eq!(config.preview_bytes, 16);
        assert!(!config.stop_on_error);
        assert_eq!(config.limits, DecodeLimits::default());
    }

    #[test]
    fn test_limits_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "stop_on_error = true\n\n[limits]\nmax_packet_len = 4096\nmax_array_len = 10"
        )
        .unwrap();
        let config = DumpConfig::load(file.path()).unwrap();
        assert!(config.stop_on_error);
        assert_eq!(config.preview_bytes, 16);
        assert_eq!(config.limits.max_packet_len, 4096);
        assert_eq!(config.limits.max_array_len, 10);
        assert_eq!(
            config.limits.max_string_bytes,
            DecodeLimits::default().max_string_bytes
        );
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preview_bytes = \"lots\"").unwrap();
        assert!(DumpConfig::load(file.path()).is_err());
    }
}
