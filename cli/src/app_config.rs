use std::path::Path;
use std::time::Duration;

use petsignal_core::DEFAULT_PAGE_SIZE;
use serde::Serialize;

use crate::{
    args::ConfigArgs,
    profile::{Profile, ProfileDirs},
};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_COUNTRY_CODE: &str = "ES";

/// Settings resolved from arguments, environment and the profile file
#[derive(Debug, Serialize)]
pub struct AppConfig {
    pub profile_name: String,
    pub profile_path: String,
    pub profile_exists: bool,
    pub credentials_path: String,
    pub api_url: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub country_code: String,
}

impl AppConfig {
    pub fn from_args(
        args: &ConfigArgs,
        dirs: &ProfileDirs,
        profile_name: &str,
        profile: Option<&Profile>,
    ) -> Self {
        let api_url = args
            .api_url
            .clone()
            .or_else(|| profile.and_then(|p| p.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        AppConfig {
            profile_name: profile_name.to_string(),
            profile_path: dirs
                .settings_path(profile_name)
                .to_string_lossy()
                .into_owned(),
            profile_exists: profile.is_some(),
            credentials_path: dirs
                .credentials_path(profile_name)
                .to_string_lossy()
                .into_owned(),
            api_url,
            timeout_secs: profile
                .and_then(|p| p.timeout_secs)
                .filter(|t| *t > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            page_size: profile
                .and_then(|p| p.page_size)
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            country_code: profile
                .and_then(|p| p.country_code.clone())
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials_path(&self) -> &Path {
        Path::new(&self.credentials_path)
    }
}
