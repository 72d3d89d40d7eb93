//! Named profiles: one TOML settings file per backend a user talks to, plus
//! the login kept for it and a marker naming the profile in use.
//!
//! Settings live under the config home and logins under the data home, so a
//! profile's credentials can be wiped without touching its settings.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE: &str = "default";

const APP_DIR: &str = "petsignal";
const ACTIVE_MARKER: &str = "current";

/// Per-profile settings stored as TOML
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<u32>,
    pub country_code: Option<String>,
}

impl Profile {
    /// `None` when no settings were ever written for the profile
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile = toml::from_str(&raw)
            .with_context(|| format!("Profile {} is not valid TOML", path.display()))?;

        Ok(Some(profile))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        write_creating_parent(path, &toml::to_string(self).context("Failed to encode profile")?)
    }
}

fn write_creating_parent(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Names end up in file paths
pub fn validate_profile_name(name: &str) -> anyhow::Result<()> {
    let usable = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !usable {
        anyhow::bail!(
            "Invalid profile name '{}': use letters, digits, '-' or '_'",
            name
        );
    }
    Ok(())
}

/// Where profile settings, logins and the active marker are kept
#[derive(Debug, Clone)]
pub struct ProfileDirs {
    config: PathBuf,
    data: PathBuf,
}

impl ProfileDirs {
    /// Platform locations, overridden by `XDG_CONFIG_HOME` and `XDG_DATA_HOME`
    pub fn locate() -> Self {
        let project = directories::ProjectDirs::from("org", APP_DIR, APP_DIR);
        let fallback = || PathBuf::from(".");

        let config = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(home) => PathBuf::from(home).join(APP_DIR),
            None => project
                .as_ref()
                .map(|p| p.config_dir().to_path_buf())
                .unwrap_or_else(fallback),
        };
        let data = match std::env::var_os("XDG_DATA_HOME") {
            Some(home) => PathBuf::from(home).join(APP_DIR),
            None => project
                .as_ref()
                .map(|p| p.data_dir().to_path_buf())
                .unwrap_or_else(fallback),
        };

        ProfileDirs { config, data }
    }

    #[cfg(test)]
    pub fn at(config: PathBuf, data: PathBuf) -> Self {
        ProfileDirs { config, data }
    }

    fn settings_dir(&self) -> PathBuf {
        self.config.join("profiles")
    }

    pub fn settings_path(&self, name: &str) -> PathBuf {
        self.settings_dir().join(format!("{}.toml", name))
    }

    pub fn credentials_path(&self, name: &str) -> PathBuf {
        self.data
            .join("profiles")
            .join(name)
            .join("credentials.toml")
    }

    /// Profile picked by `profile use`, or the default one
    pub fn active(&self) -> anyhow::Result<String> {
        let marker = self.config.join(ACTIVE_MARKER);
        if !marker.exists() {
            return Ok(DEFAULT_PROFILE.to_string());
        }

        let name = std::fs::read_to_string(&marker).context("Failed to read active profile")?;
        let name = name.trim();
        Ok(if name.is_empty() {
            DEFAULT_PROFILE.to_string()
        } else {
            name.to_string()
        })
    }

    pub fn activate(&self, name: &str) -> anyhow::Result<()> {
        validate_profile_name(name)?;
        write_creating_parent(&self.config.join(ACTIVE_MARKER), name)
    }

    /// Explicit choice first, then the active marker
    pub fn resolve(&self, requested: Option<&str>) -> String {
        match requested {
            Some(name) => name.to_string(),
            None => self
                .active()
                .unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
        }
    }

    /// Every profile with a settings file, sorted. The default profile is
    /// always listed.
    pub fn names(&self) -> anyhow::Result<Vec<String>> {
        let mut names = vec![DEFAULT_PROFILE.to_string()];

        let dir = self.settings_dir();
        if dir.exists() {
            for entry in std::fs::read_dir(&dir).context("Failed to list profiles")? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }
}
