use std::fs;
use std::path::Path;

use anyhow::Context;
use petsignal_core::User;
use serde::{Deserialize, Serialize};

/// HTTP Basic credentials sent with every authenticated request
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Login state of a profile: credentials plus the locally kept user record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub credentials: Option<Credentials>,
    pub user: Option<User>,
}

impl Session {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Session::default());
        }

        let contents = fs::read_to_string(path).context("Failed to read credentials file")?;
        toml::from_str(&contents).context("Failed to deserialize credentials")
    }

    /// Writes the session readable by the owner only
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }

        let content = toml::to_string(self).context("Failed to serialize credentials")?;
        fs::write(path, content).context("Failed to write credentials")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    pub fn clear(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            fs::remove_file(path).context("Failed to remove credentials")?;
        }
        Ok(())
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }
}
