// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered configuration loading.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/arscan/arscan.toml`
//! 3. `~/.config/arscan/arscan.toml`
//! 4. `./arscan.toml`
//! 5. `ARSCAN_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ArscanConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/arscan/arscan.toml";
pub const LOCAL_CONFIG_FILE: &str = "arscan.toml";

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("arscan").join(LOCAL_CONFIG_FILE))
}

/// Build the full figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ArscanConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ArscanConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ArscanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArscanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file plus env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ArscanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArscanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Env provider with explicit section mapping.
///
/// `Env::split("_")` would turn `ARSCAN_FETCH_MAX_RETRIES` into
/// `fetch.max.retries`; only the first underscore after a known section
/// name is a separator.
fn env_provider() -> Env {
    const SECTIONS: [&str; 5] = ["app", "api", "firestore", "storage", "fetch"];

    Env::prefixed("ARSCAN_").map(|key| {
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
