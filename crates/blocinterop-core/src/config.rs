// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Namespace shared with the remote runtime. Both sides must agree on it.
pub const DEFAULT_CHANNEL_PREFIX: &str = "br.com.rtakahashi.playground.bloc_interop";

/// Prefix of the generated callback identifier.
pub const DEFAULT_CALLBACK_PREFIX: &str = "updateState";

/// Settings shared by every adapter created in a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Namespace prepended to every bloc name to form the channel address.
    pub channel_prefix: String,
    /// Prefix of the per-adapter callback identifier.
    pub callback_prefix: String,
    /// Log every outgoing event payload at debug level.
    pub log_outgoing_events: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
            callback_prefix: DEFAULT_CALLBACK_PREFIX.to_string(),
            log_outgoing_events: true,
        }
    }
}

impl BridgeConfig {
    /// Channel address for the given bloc, e.g. `<prefix>/counter`.
    pub fn channel_name(&self, bloc_name: &str) -> String {
        format!("{}/{}", self.channel_prefix, bloc_name)
    }

    /// Read a JSON config file. Missing fields take their default value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the config as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteropError;

    #[test]
    fn channel_name_joins_prefix_and_bloc() {
        let config = BridgeConfig::default();
        assert_eq!(
            config.channel_name("counter"),
            "br.com.rtakahashi.playground.bloc_interop/counter"
        );
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, r#"{"channel_prefix":"com.example.blocs"}"#).expect("write");

        let config = BridgeConfig::load(&path).expect("load");
        assert_eq!(config.channel_prefix, "com.example.blocs");
        assert_eq!(config.callback_prefix, DEFAULT_CALLBACK_PREFIX);
        assert!(config.log_outgoing_events);
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.json");
        let config = BridgeConfig {
            log_outgoing_events: false,
            ..BridgeConfig::default()
        };
        config.persist(&path).expect("persist");

        assert_eq!(BridgeConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = BridgeConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, InteropError::Io(_)));
    }

    #[test]
    fn load_invalid_json_is_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bridge.json");
        std::fs::write(&path, "not json").expect("write");

        let err = BridgeConfig::load(&path).unwrap_err();
        assert!(matches!(err, InteropError::Serialization(_)));
    }
}
