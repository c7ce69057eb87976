// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config file resolution for the demo host.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use blocinterop_core::BridgeConfig;

const CONFIG_FILE: &str = "bridge.json";

/// Environment variable that points at an explicit config file.
const CONFIG_ENV: &str = "BLOCINTEROP_CONFIG";

/// Location of the config file: `$BLOCINTEROP_CONFIG`, else
/// `<config dir>/blocinterop/bridge.json`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    config_base().join("blocinterop").join(CONFIG_FILE)
}

/// Load the config, falling back to defaults if the file is absent or invalid.
pub fn load_or_default() -> BridgeConfig {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> BridgeConfig {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return BridgeConfig::default();
    }
    match BridgeConfig::load(path) {
        Ok(config) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            BridgeConfig::default()
        }
    }
}

fn config_base() -> PathBuf {
    resolve_base(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve_base(xdg_config_home: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(xdg) = xdg_config_home {
        return PathBuf::from(xdg);
    }
    if let Some(home) = home {
        return PathBuf::from(home).join(".config");
    }
    debug!("neither XDG_CONFIG_HOME nor HOME is set, looking for config under /tmp");
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_prefers_xdg_then_home_then_tmp() {
        assert_eq!(
            resolve_base(Some("/xdg".into()), Some("/home/u".into())),
            PathBuf::from("/xdg")
        );
        assert_eq!(
            resolve_base(None, Some("/home/u".into())),
            PathBuf::from("/home/u/.config")
        );
        assert_eq!(resolve_base(None, None), PathBuf::from("/tmp"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_from(&dir.path().join(CONFIG_FILE)), BridgeConfig::default());
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ nope").expect("write");
        assert_eq!(load_from(&path), BridgeConfig::default());
    }

    #[test]
    fn valid_file_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"callback_prefix":"pushState"}"#).expect("write");
        assert_eq!(load_from(&path).callback_prefix, "pushState");
    }
}
