// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./twin.toml` > `~/.config/twin/twin.toml` > `/etc/twin/twin.toml`
//! with environment variable overrides via `TWIN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TwinConfig;

/// Top-level config sections, used to map `TWIN_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &["agent", "openai", "classifier", "fallback", "routing"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/twin/twin.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "twin.toml";

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("twin").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/twin/twin.toml` (system-wide)
/// 3. `~/.config/twin/twin.toml` (user XDG config)
/// 4. `./twin.toml` (local directory)
/// 5. `TWIN_*` environment variables
pub fn load_config() -> Result<TwinConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<TwinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TwinConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TwinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TwinConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TwinConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `TWIN_ROUTING_MIN_CONFIDENCE` to `routing.min_confidence`.
///
/// Only the leading section name is turned into a dot, so keys that contain
/// another section's name (`classifier.fallback_on_parse_error`) stay intact.
fn env_provider() -> Env {
    Env::prefixed("TWIN_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str)
            .into()
    })
}
