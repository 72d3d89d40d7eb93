use crate::{
    app_config::DEFAULT_API_URL,
    args::ProfileCommand,
    credentials::Session,
    formatters::Printer,
    profile::{Profile, ProfileDirs, DEFAULT_PROFILE},
};

/// One line per profile: API it talks to and who is logged in there
fn describe(dirs: &ProfileDirs, name: &str) -> anyhow::Result<String> {
    let api_url = Profile::load(&dirs.settings_path(name))?
        .and_then(|p| p.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let session = Session::load(&dirs.credentials_path(name))?;

    Ok(match session.username() {
        Some(username) => format!("{} ({}, logged in as {})", name, api_url, username),
        None => format!("{} ({})", name, api_url),
    })
}

pub fn profile_cmd(
    dirs: &ProfileDirs,
    subcommand: Option<ProfileCommand>,
    printer: &mut Printer,
) -> Result<(), anyhow::Error> {
    match subcommand.unwrap_or(ProfileCommand::Current) {
        ProfileCommand::Use { name } => {
            dirs.activate(&name)?;

            let settings = dirs.settings_path(&name);
            if !settings.exists() {
                Profile::default().save(&settings)?;
                printer.message(&format!("Created new profile: {}", name))?;
            }

            printer.message(&format!("Switched to profile: {}", name))?;
        }
        ProfileCommand::List => {
            let active = dirs
                .active()
                .unwrap_or_else(|_| DEFAULT_PROFILE.to_string());

            let mut lines = vec![];
            for name in dirs.names()? {
                let marker = if name == active { "*" } else { " " };
                lines.push(format!("{} {}", marker, describe(dirs, &name)?));
            }
            printer.message(&lines.join("\n"))?;
        }
        ProfileCommand::Current => {
            let active = dirs.active()?;
            printer.message(&format!("Current profile: {}", describe(dirs, &active)?))?;
        }
    }

    Ok(())
}
