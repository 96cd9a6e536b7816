// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./ragchat.toml` > `~/.config/ragchat/ragchat.toml` >
//! `/etc/ragchat/ragchat.toml`, with `RAGCHAT_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RagchatConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "RAGCHAT_";

/// Config sections that environment variables may target.
const SECTIONS: &[&str] = &[
    "agent",
    "topics",
    "memory",
    "ollama",
    "inference",
    "retrieval",
    "timeouts",
];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/ragchat/ragchat.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "ragchat.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ragchat/ragchat.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ragchat/ragchat.toml`
/// 3. `~/.config/ragchat/ragchat.toml`
/// 4. `./ragchat.toml`
/// 5. `RAGCHAT_*` environment variables
pub fn load_config() -> Result<RagchatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RagchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RagchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RagchatConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `RAGCHAT_OLLAMA_BASE_URL` maps to `ollama.base_url`, not `ollama.base.url`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
