use anyhow::Context;
use petsignal_core::{Alert, PhotoService};

use crate::{
    app_config::AppConfig,
    credentials::Session,
    formatters::Printer,
    web_client::{ObjectStoreClient, RestClient},
};

pub mod account;
pub mod alert;
pub mod comment;
pub mod config;
pub mod init;
pub mod photo;
pub mod profile;

/// What every network command needs: resolved config, login state and output
pub struct CommandContext {
    pub config: AppConfig,
    pub session: Session,
    pub printer: Printer,
}

impl CommandContext {
    pub fn load(config: AppConfig, printer: Printer) -> anyhow::Result<Self> {
        let session = Session::load(config.credentials_path())?;
        Ok(CommandContext {
            config,
            session,
            printer,
        })
    }

    /// Client carrying the stored credentials, if any
    pub fn client(&self) -> anyhow::Result<RestClient> {
        RestClient::new(
            &self.config.api_url,
            self.config.timeout(),
            self.session.credentials.clone(),
        )
        .context("Failed to set up API client")
    }

    pub fn photo_service(&self) -> anyhow::Result<PhotoService<RestClient, ObjectStoreClient>> {
        let storage =
            ObjectStoreClient::new(self.config.timeout()).context("Failed to set up upload client")?;
        Ok(PhotoService::new(self.client()?, storage))
    }

    pub fn username(&self) -> anyhow::Result<String> {
        self.session
            .username()
            .map(str::to_string)
            .context("Not logged in. Run `petsignal login <username>` first")
    }
}

/// Refuses to touch someone else's alert before any request is made
pub fn ensure_owner(alert: &Alert, username: &str) -> anyhow::Result<()> {
    if !alert.is_owned_by(username) {
        anyhow::bail!(
            "Alert #{} was posted by {}, only its owner can change it",
            alert.id,
            alert.username
        );
    }
    Ok(())
}
